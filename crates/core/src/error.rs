//! Error type for the domain layer.

/// Errors produced by domain-level validation and parsing.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A configured value failed validation (named field in the message).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A string did not name a known metric.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
}
