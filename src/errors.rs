use std::io;

use thiserror::Error;

use crate::types::{Address, Amount};

/// Errors returned by every marketplace operation.
///
/// A failed mutating operation leaves stored state untouched, so callers can
/// retry or surface the error without compensating actions.
#[derive(Debug, Error)]
pub enum SuretyError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Contract is currently not operational")]
    NotOperational,

    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index {index} does not match oracle request for {oracle}")]
    InvalidIndex { index: u8, oracle: Address },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Purchase cap exceeded: cap {cap}, attempted {attempted}")]
    PurchaseCapExceeded { cap: Amount, attempted: Amount },

    #[error("Flight {0} is closed for sale")]
    FlightClosed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl SuretyError {
    /// `InvalidIndex` is the routine outcome for oracles that were not
    /// targeted by a request; responders skip it without reporting.
    pub fn is_routine_skip(&self) -> bool {
        matches!(self, SuretyError::InvalidIndex { .. })
    }

    /// Short, stable name of the error kind, used in receipts and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SuretyError::Unauthorized(_) => "Unauthorized",
            SuretyError::NotOperational => "NotOperational",
            SuretyError::AlreadyRegistered(_) => "AlreadyRegistered",
            SuretyError::NotFound(_) => "NotFound",
            SuretyError::InvalidIndex { .. } => "InvalidIndex",
            SuretyError::InsufficientFunds { .. } => "InsufficientFunds",
            SuretyError::PurchaseCapExceeded { .. } => "PurchaseCapExceeded",
            SuretyError::FlightClosed(_) => "FlightClosed",
            SuretyError::InvalidArgument(_) => "InvalidArgument",
            SuretyError::Overflow(_) => "Overflow",
            SuretyError::ConfigError(_) => "ConfigError",
            SuretyError::SerializationError(_) => "SerializationError",
            SuretyError::IoError(_) => "IoError",
        }
    }
}

impl From<::config::ConfigError> for SuretyError {
    fn from(err: ::config::ConfigError) -> Self {
        SuretyError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for SuretyError {
    fn from(err: toml::ser::Error) -> Self {
        SuretyError::ConfigError(err.to_string())
    }
}

pub type SuretyResult<T> = Result<T, SuretyError>;
