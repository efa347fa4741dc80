use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{ForecastError, ForecastResult};

/// A forecast request for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub product_id: String,
    pub horizon_days: u32,
}

impl ForecastRequest {
    pub fn new(product_id: impl Into<String>, horizon_days: u32) -> Self {
        Self {
            product_id: product_id.into(),
            horizon_days,
        }
    }
}

/// One predicted day exactly as the provider sent it.
///
/// Numeric fields are left loosely typed; providers have been seen sending
/// strings, nulls and omitting bounds entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPoint {
    #[serde(alias = "day", alias = "ds")]
    pub date: String,
    #[serde(default)]
    pub predicted: Value,
    #[serde(default, alias = "lower_bound")]
    pub lower: Value,
    #[serde(default, alias = "upper_bound")]
    pub upper: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecastMetrics {
    #[serde(default)]
    pub mape: Value,
    #[serde(default)]
    pub data_points: Value,
}

/// Reorder block some providers compute alongside the forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReorderBlock {
    #[serde(default)]
    pub recommended_quantity: Value,
    #[serde(default)]
    pub predicted_demand: Value,
    #[serde(default)]
    pub current_stock: Value,
    #[serde(default)]
    pub net_position: Value,
    #[serde(default)]
    pub coverage_days: Value,
    #[serde(default)]
    pub avg_daily_predicted: Value,
    #[serde(default)]
    pub reorder_point: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default, alias = "forecast")]
    pub points: Vec<RawForecastPoint>,
    #[serde(default)]
    pub metrics: Option<RawForecastMetrics>,
    #[serde(default)]
    pub reorder: Option<RawReorderBlock>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Clone)]
pub struct DemandForecastClient {
    client: reqwest::Client,
    base_url: String,
}

impl DemandForecastClient {
    pub fn new(base_url: String, timeout: Duration) -> ForecastResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/forecast/{product_id}/`, with the id percent-encoded as a
    /// single path segment.
    pub fn forecast_url(&self, product_id: &str) -> ForecastResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ForecastError::InvalidRequest(format!("invalid base url {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ForecastError::InvalidRequest(format!("base url {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(["forecast", product_id, ""]);
        Ok(url)
    }

    /// Fetch the daily forecast for the next `horizon_days` days
    pub async fn forecast(&self, request: &ForecastRequest) -> ForecastResult<ForecastResponse> {
        let url = self.forecast_url(&request.product_id)?;
        let response = self
            .client
            .get(url)
            .query(&[("periods", request.horizon_days)])
            .send()
            .await
            .map_err(ForecastError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::ServiceUnavailable(format!(
                "Status: {} {}",
                status,
                body.trim()
            )));
        }

        let body = response.text().await.map_err(ForecastError::from_transport)?;
        let parsed = serde_json::from_str::<ForecastResponse>(&body)?;
        Ok(parsed)
    }

    /// Check service health
    pub async fn health(&self) -> ForecastResult<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(ForecastError::from_transport)?;

        Ok(response.status().is_success())
    }
}
