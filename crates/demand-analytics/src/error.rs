use demand_core::DemandError;
use forecast_client::ForecastError;
use thiserror::Error;

/// Failures surfaced by the engine.
///
/// "No data" is never an error: empty series, all-zero summaries and
/// `ForecastOutcome::Empty` are ordinary values.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Forecast provider failure: {0}")]
    ProviderFailure(#[from] ForecastError),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EngineError::InvalidInput(_))
    }

    pub fn is_provider_failure(&self) -> bool {
        matches!(self, EngineError::ProviderFailure(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::ProviderFailure(ForecastError::Timeout))
    }
}

impl From<DemandError> for EngineError {
    fn from(err: DemandError) -> Self {
        match err {
            DemandError::InvalidInput(msg) => EngineError::InvalidInput(msg),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
