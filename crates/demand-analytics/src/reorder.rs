//! Reorder Advisor

use demand_core::numeric::ensure_non_negative;
use demand_core::{ForecastPoint, ReorderSuggestion};

use crate::error::{EngineError, EngineResult};

/// Order quantity needed to cover `predicted_demand` over `horizon_days`.
///
/// All values stay at full precision; only `recommended_quantity` is an
/// integer. Coverage is `None` when nothing is predicted to sell.
pub fn compute_reorder(
    predicted_demand: f64,
    current_stock: f64,
    reorder_point: f64,
    horizon_days: u32,
) -> EngineResult<ReorderSuggestion> {
    if horizon_days == 0 {
        return Err(EngineError::invalid("horizon_days must be at least 1"));
    }
    ensure_non_negative("predicted_demand", predicted_demand)?;
    ensure_non_negative("current_stock", current_stock)?;
    ensure_non_negative("reorder_point", reorder_point)?;

    let avg_daily_predicted = predicted_demand / horizon_days as f64;
    let net_position = current_stock - predicted_demand;
    let recommended_quantity = (-net_position).round().max(0.0) as u64;
    let coverage_days = if avg_daily_predicted > 0.0 {
        Some(current_stock / avg_daily_predicted)
    } else {
        None
    };

    Ok(ReorderSuggestion {
        recommended_quantity,
        predicted_demand,
        current_stock,
        net_position,
        coverage_days,
        avg_daily_predicted,
        reorder_point,
        horizon_days,
    })
}

/// Reorder advice for the forecast of a requested horizon.
///
/// The horizon is the one asked for, not the number of points returned; a
/// provider that answers short leaves the missing days at zero demand.
pub fn reorder_for_forecast(
    points: &[ForecastPoint],
    horizon_days: u32,
    current_stock: f64,
    reorder_point: f64,
) -> EngineResult<ReorderSuggestion> {
    let predicted_demand: f64 = points.iter().map(|p| p.predicted).sum();
    compute_reorder(predicted_demand, current_stock, reorder_point, horizon_days)
}
