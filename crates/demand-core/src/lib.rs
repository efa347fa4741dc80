//! Core data model for the demand forecasting and replenishment engine.
//!
//! Everything here is plain data plus the invariants that hold on it. The
//! algorithms that produce these values live in `demand-analytics`.

pub mod error;
pub mod inventory;
pub mod numeric;
pub mod types;

pub use error::*;
pub use inventory::*;
pub use types::*;
