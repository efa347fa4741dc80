//! Forecast Adapter
//!
//! Sends one request to the configured `ForecastProvider` and normalizes the
//! loosely-typed answer into `ForecastPoint`s. Normalization is the only
//! place where bad numbers are silently coerced (to 0); everything else
//! malformed in a response is a provider failure.

use chrono::{DateTime, NaiveDate, Utc};
use demand_core::numeric::{coerce_number, coerce_optional_number, round2};
use demand_core::{
    AccuracySource, ChartPoint, DemandSummary, ForecastAccuracy, ForecastMetrics, ForecastPoint,
    ProductDemandSeries, ProductId, ReorderSuggestion,
};
use forecast_client::{
    ForecastError, ForecastProvider, ForecastRequest, ForecastResponse, RawForecastMetrics,
    RawForecastPoint, RawReorderBlock, DEFAULT_HORIZON_DAYS,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};
use crate::statistics::heuristic_accuracy;

/// A normalized, non-empty forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub product_id: ProductId,
    pub horizon_days: u32,
    pub points: Vec<ForecastPoint>,
    pub metrics: Option<ForecastMetrics>,
    /// Reorder block computed by the provider, if it sent one.
    pub reorder: Option<ReorderSuggestion>,
    pub generated_at: Option<DateTime<Utc>>,
    pub backend: &'static str,
}

impl Forecast {
    pub fn total_predicted(&self) -> f64 {
        self.points.iter().map(|p| p.predicted).sum()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.day)
    }
}

/// Result of a successful provider round-trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Ready(Forecast),
    /// The provider answered but had nothing to predict. Callers should show
    /// a "not enough data" state rather than an error.
    Empty {
        product_id: ProductId,
        horizon_days: u32,
        metrics: Option<ForecastMetrics>,
    },
}

impl ForecastOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ForecastOutcome::Empty { .. })
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            ForecastOutcome::Ready(forecast) => Some(forecast),
            ForecastOutcome::Empty { .. } => None,
        }
    }

    pub fn metrics(&self) -> Option<&ForecastMetrics> {
        match self {
            ForecastOutcome::Ready(forecast) => forecast.metrics.as_ref(),
            ForecastOutcome::Empty { metrics, .. } => metrics.as_ref(),
        }
    }
}

pub struct ForecastAdapter {
    provider: Arc<dyn ForecastProvider>,
    timeout: Option<Duration>,
    default_horizon_days: u32,
}

impl ForecastAdapter {
    pub fn new(provider: Arc<dyn ForecastProvider>) -> Self {
        Self {
            provider,
            timeout: None,
            default_horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }

    /// Bound every provider call; expiry is reported as `ForecastError::Timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_default_horizon(mut self, horizon_days: u32) -> Self {
        self.default_horizon_days = horizon_days;
        self
    }

    pub fn default_horizon_days(&self) -> u32 {
        self.default_horizon_days
    }

    pub fn backend_name(&self) -> &'static str {
        self.provider.backend_name()
    }

    pub async fn request_default_forecast(&self, product_id: &str) -> EngineResult<ForecastOutcome> {
        self.request_forecast(product_id, self.default_horizon_days).await
    }

    pub async fn request_forecast(
        &self,
        product_id: &str,
        horizon_days: u32,
    ) -> EngineResult<ForecastOutcome> {
        if horizon_days == 0 {
            return Err(EngineError::invalid("horizon_days must be at least 1"));
        }
        if product_id.trim().is_empty() {
            return Err(EngineError::invalid("product_id must not be empty"));
        }

        let request = ForecastRequest::new(product_id, horizon_days);
        tracing::info!(
            "Requesting {}-day forecast for {} via {}",
            horizon_days,
            product_id,
            self.provider.backend_name()
        );

        let response = self.call_provider(&request).await.map_err(|e| {
            tracing::warn!("Forecast provider failed for {}: {}", product_id, e);
            EngineError::ProviderFailure(e)
        })?;

        let outcome = normalize_response(&request, response, self.provider.backend_name())?;
        match &outcome {
            ForecastOutcome::Ready(forecast) => tracing::info!(
                "Received {} forecast points for {}",
                forecast.points.len(),
                product_id
            ),
            ForecastOutcome::Empty { .. } => {
                tracing::warn!("Forecast provider returned no points for {}", product_id)
            }
        }
        Ok(outcome)
    }

    async fn call_provider(&self, request: &ForecastRequest) -> Result<ForecastResponse, ForecastError> {
        let call = self.provider.forecast(request);
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ForecastError::Timeout),
            },
            None => call.await,
        }
    }
}

/// Turn a raw provider response into a `ForecastOutcome`.
///
/// Points beyond the requested horizon are dropped. Days must parse and be
/// strictly ascending; otherwise the response is rejected as invalid.
pub fn normalize_response(
    request: &ForecastRequest,
    response: ForecastResponse,
    backend: &'static str,
) -> EngineResult<ForecastOutcome> {
    let metrics = response.metrics.as_ref().map(normalize_metrics);

    if response.points.is_empty() {
        return Ok(ForecastOutcome::Empty {
            product_id: request.product_id.clone(),
            horizon_days: request.horizon_days,
            metrics,
        });
    }

    let horizon = request.horizon_days as usize;
    if response.points.len() > horizon {
        tracing::debug!(
            "Provider sent {} points for a {}-day horizon; keeping the first {}",
            response.points.len(),
            horizon,
            horizon
        );
    }

    let mut points: Vec<ForecastPoint> = Vec::with_capacity(horizon.min(response.points.len()));
    for raw in response.points.iter().take(horizon) {
        let point = normalize_point(raw)?;
        if let Some(prev) = points.last() {
            if point.day <= prev.day {
                return Err(invalid_response(format!(
                    "forecast days out of order: {} after {}",
                    point.day, prev.day
                )));
            }
        }
        points.push(point);
    }

    let reorder = response
        .reorder
        .as_ref()
        .map(|block| normalize_reorder_block(block, request.horizon_days));

    let generated_at = response.generated_at.as_deref().and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| tracing::debug!("Ignoring unparseable generated_at {:?}: {}", raw, e))
            .ok()
    });

    Ok(ForecastOutcome::Ready(Forecast {
        product_id: request.product_id.clone(),
        horizon_days: request.horizon_days,
        points,
        metrics,
        reorder,
        generated_at,
        backend,
    }))
}

fn invalid_response(msg: String) -> EngineError {
    EngineError::ProviderFailure(ForecastError::InvalidResponse(msg))
}

fn parse_day(raw: &str) -> EngineResult<NaiveDate> {
    // Accept full timestamps by looking at the date prefix only.
    let prefix = raw.trim().get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .map_err(|_| invalid_response(format!("unparseable forecast day {raw:?}")))
}

/// Coerce, floor at zero, round to 2 dp, then make the band contain the
/// prediction.
pub fn normalize_point(raw: &RawForecastPoint) -> EngineResult<ForecastPoint> {
    let day = parse_day(&raw.date)?;
    let predicted = round2(coerce_number(&raw.predicted).max(0.0));
    let lower = round2(coerce_number(&raw.lower).max(0.0));
    let upper = round2(coerce_number(&raw.upper).max(0.0));

    let lower_bound = lower.min(predicted);
    let upper_bound = upper.max(predicted);
    if lower_bound != lower || upper_bound != upper {
        tracing::debug!(
            "Repaired forecast band on {}: [{}, {}] around {}",
            day,
            lower,
            upper,
            predicted
        );
    }

    Ok(ForecastPoint {
        day,
        predicted,
        lower_bound,
        upper_bound,
    })
}

pub fn normalize_metrics(raw: &RawForecastMetrics) -> ForecastMetrics {
    ForecastMetrics {
        mape: coerce_optional_number(&raw.mape).map(|m| round2(m.max(0.0))),
        data_points: coerce_optional_number(&raw.data_points).map(|n| n.max(0.0).round() as usize),
    }
}

/// Provider-computed reorder advice, cleaned the same way as forecast points.
/// A missing or non-finite coverage stays undefined rather than becoming 0.
pub fn normalize_reorder_block(raw: &RawReorderBlock, horizon_days: u32) -> ReorderSuggestion {
    ReorderSuggestion {
        recommended_quantity: coerce_number(&raw.recommended_quantity).round().max(0.0) as u64,
        predicted_demand: coerce_number(&raw.predicted_demand),
        current_stock: coerce_number(&raw.current_stock),
        net_position: coerce_number(&raw.net_position),
        coverage_days: coerce_optional_number(&raw.coverage_days),
        avg_daily_predicted: coerce_number(&raw.avg_daily_predicted),
        reorder_point: coerce_number(&raw.reorder_point),
        horizon_days,
    }
}

/// History followed by forecast, for charting. The forecast must start
/// strictly after the last historical day.
pub fn chart_series(
    history: &ProductDemandSeries,
    forecast: &[ForecastPoint],
) -> EngineResult<Vec<ChartPoint>> {
    if let (Some(last), Some(first)) = (history.last_day(), forecast.first()) {
        if first.day <= last {
            return Err(EngineError::invalid(format!(
                "forecast day {} overlaps history ending {}",
                first.day, last
            )));
        }
    }

    Ok(history
        .points()
        .iter()
        .map(ChartPoint::from_history)
        .chain(forecast.iter().map(ChartPoint::from_forecast))
        .collect())
}

/// Accuracy to report for a product. Provider figures win over the local
/// volatility heuristic whenever the provider supplied them, zero included.
pub fn resolve_accuracy(summary: &DemandSummary, metrics: Option<&ForecastMetrics>) -> ForecastAccuracy {
    let heuristic = heuristic_accuracy(summary);
    let Some(metrics) = metrics else {
        return heuristic;
    };

    let data_points_used = metrics.data_points.unwrap_or(heuristic.data_points_used);

    match metrics.mape {
        Some(mape) => ForecastAccuracy {
            mape,
            data_points_used,
            source: AccuracySource::Provider,
        },
        None => ForecastAccuracy {
            data_points_used,
            ..heuristic
        },
    }
}
