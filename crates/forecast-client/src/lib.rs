pub mod demand_forecaster;
pub mod error;
pub mod flat_trend;
pub mod provider;

pub use demand_forecaster::{
    DemandForecastClient, ForecastRequest, ForecastResponse, RawForecastMetrics,
    RawForecastPoint, RawReorderBlock,
};
pub use error::{ForecastError, ForecastResult};
pub use flat_trend::{FlatTrendProvider, TrendBaseline};
pub use provider::{ForecastProvider, HttpForecastProvider};

use anyhow::{bail, Context};
use std::env;
use std::time::Duration;

pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Configuration for the forecasting service
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("FORECAST_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8005".to_string()),
            timeout: Duration::from_secs(
                env::var("FORECAST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            default_horizon_days: env::var("FORECAST_HORIZON_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HORIZON_DAYS),
        }
    }
}

impl ForecastConfig {
    /// Load from the environment (and `.env`), rejecting unparseable or
    /// degenerate values instead of falling back.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = env::var("FORECAST_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8005".to_string());
        let timeout_secs: u64 = env::var("FORECAST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("FORECAST_TIMEOUT_SECS must be a whole number of seconds")?;
        let default_horizon_days: u32 = env::var("FORECAST_HORIZON_DAYS")
            .unwrap_or_else(|_| DEFAULT_HORIZON_DAYS.to_string())
            .parse()
            .context("FORECAST_HORIZON_DAYS must be a whole number of days")?;

        let config = Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            default_horizon_days,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("FORECAST_SERVICE_URL must not be empty");
        }
        if self.timeout.is_zero() {
            bail!("forecast timeout must be greater than zero");
        }
        if self.default_horizon_days == 0 {
            bail!("default forecast horizon must be at least one day");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_horizon() {
        let config = ForecastConfig {
            base_url: "http://localhost:8005".into(),
            timeout: Duration::from_secs(5),
            default_horizon_days: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_sane_config() {
        let config = ForecastConfig {
            base_url: "http://localhost:8005".into(),
            timeout: Duration::from_secs(5),
            default_horizon_days: 30,
        };
        assert!(config.validate().is_ok());
    }
}
