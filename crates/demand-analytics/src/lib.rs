//! Demand analytics: turns sale events into daily series and summaries,
//! estimates stockout risk, adapts external forecasts and advises on
//! reordering.
//!
//! All computations are pure and synchronous apart from the single
//! outbound forecast call in [`ForecastAdapter`].

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod forecast_adapter;
pub mod portfolio;
pub mod reorder;
pub mod statistics;
pub mod stockout;


pub use aggregator::{build_series, group_by_product, DailySeriesAggregator};
pub use engine::{DemandEngine, ForecastReport, ProductInsight};
pub use error::{EngineError, EngineResult};
pub use forecast_adapter::{
    chart_series, resolve_accuracy, Forecast, ForecastAdapter, ForecastOutcome,
};
pub use portfolio::{classify_portfolio, derive_alert, derive_alerts, summarize_catalog};
pub use reorder::{compute_reorder, reorder_for_forecast};
pub use statistics::{heuristic_accuracy, summarize};
pub use stockout::estimate_stockout_risk;
