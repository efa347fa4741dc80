//! Summary Statistics Calculator

use demand_core::{AccuracySource, DemandSummary, ForecastAccuracy, ProductDemandSeries};
use demand_core::numeric::finite_or_zero;
use statrs::statistics::Statistics;

/// Derive totals, daily average, peak and volatility from a demand series.
///
/// The average is taken over the calendar span (idle days count as zero
/// demand). Volatility is the root-mean-square deviation of the active days
/// from that span average, so a product that sells rarely but in bursts reads
/// as volatile. An empty series yields the all-zero summary.
pub fn summarize(series: &ProductDemandSeries) -> DemandSummary {
    if series.is_empty() {
        return DemandSummary::default();
    }

    let span_days = series.span_days();
    let total_demand: f64 = series.quantities().sum();
    let avg_daily = total_demand / span_days as f64;

    // Strict comparison keeps the earliest day on ties.
    let mut peak_day = None;
    let mut peak_qty = 0.0;
    for point in series.points() {
        if peak_day.is_none() || point.quantity > peak_qty {
            peak_day = Some(point.day);
            peak_qty = point.quantity;
        }
    }

    // Idle days are not part of the deviation, only of the average.
    let volatility = finite_or_zero(
        series
            .quantities()
            .map(|quantity| quantity - avg_daily)
            .quadratic_mean(),
    );

    DemandSummary {
        total_demand,
        avg_daily,
        peak_day,
        peak_qty,
        volatility,
        span_days,
        active_days: series.active_days(),
    }
}

/// Accuracy estimate from the summary alone, for when no provider backtest
/// is available.
pub fn heuristic_accuracy(summary: &DemandSummary) -> ForecastAccuracy {
    ForecastAccuracy {
        mape: summary.error_margin(),
        data_points_used: summary.active_days,
        source: AccuracySource::Heuristic,
    }
}
