use thiserror::Error;

/// Errors raised while wiring the service together, before any request runs.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
