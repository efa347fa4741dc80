use async_trait::async_trait;

use crate::demand_forecaster::{DemandForecastClient, ForecastRequest, ForecastResponse};
use crate::error::ForecastResult;
use crate::ForecastConfig;

/// Backend-agnostic interface for demand forecasting.
///
/// Implemented by the HTTP client (forecast microservice) and by the local
/// flat-trend provider. The engine only ever sees the raw response; all
/// normalization happens downstream.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn forecast(&self, request: &ForecastRequest) -> ForecastResult<ForecastResponse>;

    fn backend_name(&self) -> &'static str;
}

/// HTTP-backed implementation that delegates to `DemandForecastClient`.
pub struct HttpForecastProvider {
    client: DemandForecastClient,
}

impl HttpForecastProvider {
    pub fn new(client: DemandForecastClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ForecastConfig) -> ForecastResult<Self> {
        let client = DemandForecastClient::new(config.base_url.clone(), config.timeout)?;
        Ok(Self::new(client))
    }
}

impl From<DemandForecastClient> for HttpForecastProvider {
    fn from(client: DemandForecastClient) -> Self {
        Self::new(client)
    }
}

#[async_trait]
impl ForecastProvider for HttpForecastProvider {
    async fn forecast(&self, request: &ForecastRequest) -> ForecastResult<ForecastResponse> {
        tracing::debug!(
            "Requesting {}-day forecast for {} from {}",
            request.horizon_days,
            request.product_id,
            self.client.base_url()
        );
        self.client.forecast(request).await
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
