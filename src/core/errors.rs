//! Shared error types for the intelligence engine
//!
//! Error codes are assigned by category:
//! - E001-E009: lookup and data availability
//! - E010-E019: serialization
//! - E020-E029: configuration
//! - E090-E099: internal invariants

use serde::Serialize;
use thiserror::Error;

/// Structured error code for documentation and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// Customer id could not be resolved
    pub const CUSTOMER_NOT_FOUND: ErrorCode = ErrorCode("E001");
    /// Customer exists but no feature is eligible for analysis
    pub const INSUFFICIENT_DATA: ErrorCode = ErrorCode("E002");
    /// I/O error - generic
    pub const IO_GENERIC: ErrorCode = ErrorCode("E009");
    /// JSON encode/decode failure
    pub const JSON: ErrorCode = ErrorCode("E010");
    /// TOML decode failure
    pub const TOML: ErrorCode = ErrorCode("E011");
    /// Config error - invalid value
    pub const CONFIG_INVALID: ErrorCode = ErrorCode("E020");
    /// Programmer error: data violated a documented invariant
    pub const INVARIANT_VIOLATION: ErrorCode = ErrorCode("E090");

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Main error type for adoptmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// The data source has no customer with this id
    #[error("Customer not found: {customer_id}")]
    CustomerNotFound { customer_id: String },

    /// The customer exists but nothing on its plan can be analyzed
    #[error("Insufficient data for customer {customer_id}: {reason}")]
    InsufficientData { customer_id: String, reason: String },

    /// Input broke a documented invariant; never coerced
    #[error("Invariant violation: {message}")]
    InvariantViolation { message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn customer_not_found(customer_id: impl Into<String>) -> Self {
        Self::CustomerNotFound {
            customer_id: customer_id.into(),
        }
    }

    pub fn insufficient_data(customer_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            customer_id: customer_id.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CustomerNotFound { .. } => ErrorCode::CUSTOMER_NOT_FOUND,
            Self::InsufficientData { .. } => ErrorCode::INSUFFICIENT_DATA,
            Self::InvariantViolation { .. } => ErrorCode::INVARIANT_VIOLATION,
            Self::Configuration(_) => ErrorCode::CONFIG_INVALID,
            Self::Io(_) => ErrorCode::IO_GENERIC,
            Self::Json(_) => ErrorCode::JSON,
            Self::Toml(_) => ErrorCode::TOML,
        }
    }

    /// Callers can show a "no data" message instead of failing.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CustomerNotFound { .. } | Self::InsufficientData { .. }
        )
    }

    /// The customer the error refers to, if any.
    #[must_use]
    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Self::CustomerNotFound { customer_id } | Self::InsufficientData { customer_id, .. } => {
                Some(customer_id)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
