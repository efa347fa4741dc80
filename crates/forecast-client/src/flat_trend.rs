//! Flat Trend Provider
//!
//! Deterministic in-process forecaster: projects each product's historical
//! daily rate forward unchanged, with a normal-approximation band scaled by
//! the observed volatility. Useful as a fallback backend and in tests.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use demand_core::DemandSummary;
use serde_json::json;
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::HashMap;

use crate::demand_forecaster::{
    ForecastRequest, ForecastResponse, RawForecastMetrics, RawForecastPoint,
};
use crate::error::{ForecastError, ForecastResult};
use crate::provider::ForecastProvider;

/// Band width used when none is configured.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.80;

/// What the provider knows about one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendBaseline {
    pub daily_rate: f64,
    pub volatility: f64,
    pub data_points: usize,
}

impl From<&DemandSummary> for TrendBaseline {
    fn from(summary: &DemandSummary) -> Self {
        Self {
            daily_rate: summary.avg_daily,
            volatility: summary.volatility,
            data_points: summary.active_days,
        }
    }
}

pub struct FlatTrendProvider {
    first_day: NaiveDate,
    z_score: f64,
    baselines: HashMap<String, TrendBaseline>,
}

impl FlatTrendProvider {
    /// Provider whose forecasts start on `first_day`, with an 80% band.
    pub fn new(first_day: NaiveDate) -> ForecastResult<Self> {
        Ok(Self {
            first_day,
            z_score: two_sided_z(DEFAULT_CONFIDENCE_LEVEL)?,
            baselines: HashMap::new(),
        })
    }

    pub fn with_confidence_level(mut self, level: f64) -> ForecastResult<Self> {
        self.z_score = two_sided_z(level)?;
        Ok(self)
    }

    pub fn with_product(mut self, product_id: impl Into<String>, baseline: TrendBaseline) -> Self {
        self.baselines.insert(product_id.into(), baseline);
        self
    }

    pub fn z_score(&self) -> f64 {
        self.z_score
    }
}

/// z such that P(|Z| <= z) == level for a standard normal Z.
fn two_sided_z(level: f64) -> ForecastResult<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidRequest(format!(
            "confidence level must be in (0, 1), got {level}"
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidRequest(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}

#[async_trait]
impl ForecastProvider for FlatTrendProvider {
    async fn forecast(&self, request: &ForecastRequest) -> ForecastResult<ForecastResponse> {
        let Some(baseline) = self.baselines.get(&request.product_id) else {
            // Unknown product: nothing to project, which is a valid empty answer.
            return Ok(ForecastResponse::default());
        };

        let half_band = self.z_score * baseline.volatility;
        let points = (0..request.horizon_days)
            .map(|offset| {
                let day = self.first_day + Duration::days(offset as i64);
                RawForecastPoint {
                    date: day.format("%Y-%m-%d").to_string(),
                    predicted: json!(baseline.daily_rate),
                    lower: json!((baseline.daily_rate - half_band).max(0.0)),
                    upper: json!(baseline.daily_rate + half_band),
                }
            })
            .collect();

        Ok(ForecastResponse {
            points,
            metrics: Some(RawForecastMetrics {
                mape: serde_json::Value::Null,
                data_points: json!(baseline.data_points),
            }),
            reorder: None,
            generated_at: None,
        })
    }

    fn backend_name(&self) -> &'static str {
        "flat_trend"
    }
}
