//! Error types for the simulation engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Caller passed a value outside the accepted domain (e.g. an unknown time range)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Injected tables or bands cannot produce a well-formed series
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
