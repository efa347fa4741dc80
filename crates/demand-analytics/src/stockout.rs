//! Stockout Risk Estimator
//!
//! Projects current stock against the historical daily rate over a fixed
//! 30-day window.

use demand_core::numeric::ensure_non_negative;
use demand_core::StockoutRisk;

use crate::error::EngineResult;

/// Stockouts further out than this are not flagged.
pub const STOCKOUT_HORIZON_DAYS: f64 = 30.0;

pub const MIN_STOCKOUT_CONFIDENCE: f64 = 0.40;
pub const MAX_STOCKOUT_CONFIDENCE: f64 = 0.95;

/// A "stable" verdict is weak evidence, so it is reported with low confidence.
pub const STABLE_CONFIDENCE: f64 = 0.45;

pub fn estimate_stockout_risk(
    current_stock: f64,
    avg_daily: f64,
    reorder_point: f64,
) -> EngineResult<StockoutRisk> {
    ensure_non_negative("current_stock", current_stock)?;
    ensure_non_negative("avg_daily", avg_daily)?;
    ensure_non_negative("reorder_point", reorder_point)?;

    let days_until_stockout = if avg_daily > 0.0 {
        current_stock / avg_daily
    } else {
        f64::INFINITY
    };

    let will_stockout =
        days_until_stockout.is_finite() && days_until_stockout <= STOCKOUT_HORIZON_DAYS;

    let (confidence, recommendation) = if will_stockout {
        let confidence = (avg_daily / reorder_point.max(1.0))
            .clamp(MIN_STOCKOUT_CONFIDENCE, MAX_STOCKOUT_CONFIDENCE);
        let within = days_until_stockout.round().max(1.0) as i64;
        (
            confidence,
            format!("Reorder stock within {within} days to avoid a stockout."),
        )
    } else {
        (
            STABLE_CONFIDENCE,
            "Stock levels look stable based on recent demand.".to_string(),
        )
    };

    Ok(StockoutRisk {
        will_stockout,
        days_until_stockout,
        confidence,
        recommendation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use demand_core::RiskStatus;

    #[test]
    fn test_zero_demand_never_stocks_out() {
        let risk = estimate_stockout_risk(10.0, 0.0, 50.0).unwrap();
        assert!(risk.days_until_stockout.is_infinite());
        assert!(!risk.will_stockout);
        assert_eq!(risk.confidence, STABLE_CONFIDENCE);
        assert_eq!(risk.display_days(), None);
    }

    #[test]
    fn test_fast_mover_is_flagged() {
        let risk = estimate_stockout_risk(28.0, 9.5, 50.0).unwrap();
        assert!(risk.will_stockout);
        assert_eq!(risk.display_days(), Some(3));
        assert_eq!(risk.confidence, 0.40);
        assert!(risk.recommendation.contains("within 3 days"));
        assert_eq!(risk.status(), RiskStatus::Critical);
    }

    #[test]
    fn test_confidence_capped() {
        let risk = estimate_stockout_risk(100.0, 2000.0, 10.0).unwrap();
        assert_eq!(risk.confidence, MAX_STOCKOUT_CONFIDENCE);
    }

    #[test]
    fn test_out_of_stock_recommends_at_least_one_day() {
        let risk = estimate_stockout_risk(0.0, 4.0, 20.0).unwrap();
        assert!(risk.will_stockout);
        assert_eq!(risk.display_days(), Some(0));
        assert!(risk.recommendation.contains("within 1 days"));
    }

    #[test]
    fn test_horizon_edge() {
        assert!(estimate_stockout_risk(30.0, 1.0, 5.0).unwrap().will_stockout);
        let safe = estimate_stockout_risk(31.0, 1.0, 5.0).unwrap();
        assert!(!safe.will_stockout);
        assert_eq!(safe.confidence, STABLE_CONFIDENCE);
        assert!(safe.recommendation.contains("stable"));
    }

    #[test]
    fn test_rejects_negative_inputs() {
        assert!(estimate_stockout_risk(-1.0, 1.0, 5.0).is_err());
        assert!(estimate_stockout_risk(1.0, f64::NAN, 5.0).is_err());
    }
}
