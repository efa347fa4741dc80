use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DemandError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DemandError::InvalidInput(msg.into())
    }
}

pub type DemandResult<T> = Result<T, DemandError>;
