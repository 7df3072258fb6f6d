//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the search backend, providing one error type
//! shared by every component together with the HTTP mapping used at the API
//! boundary.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from store, scanner, ingestion, explanation
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Store, Search, Ingestion, Explanation, Configuration
//!
//! ## Design
//! Degenerate-but-valid inputs (a query with no usable keywords, a scan with
//! zero matches) are NOT errors: they are modeled as successful empty
//! responses so the success/failure boundary stays aligned with genuine
//! faults. Only conditions that abort a call appear in this enum.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the search backend
#[derive(Debug, Error)]
pub enum SearchError {
    /// The document store connection was never established at startup.
    /// Every search call fails fast with this until the process is restarted
    /// with a working store configuration.
    #[error("document store is not initialized")]
    StoreUninitialized,

    /// The document store cannot be reached or a read failed mid-scan.
    /// Fatal for the current call; partial results are discarded.
    #[error("document store unavailable: {details}")]
    StoreUnavailable { details: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Ingestion errors
    #[error("failed to ingest {file}: {details}")]
    Ingestion { file: String, details: String },

    /// The explanation model could not be reached or returned an error
    #[error("explanation service failed: {details}")]
    ExplanationFailed { details: String },

    /// The explanation model answered but produced no usable text
    #[error("explanation service returned empty text")]
    ExplanationEmpty,

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Database errors
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal system errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SearchError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::StoreUninitialized
            | SearchError::StoreUnavailable { .. }
            | SearchError::Database(_)
            | SearchError::Serialization(_) => "store",
            SearchError::Config { .. } | SearchError::Toml(_) => "configuration",
            SearchError::ValidationFailed { .. } => "validation",
            SearchError::Ingestion { .. } | SearchError::Io(_) => "ingestion",
            SearchError::ExplanationFailed { .. }
            | SearchError::ExplanationEmpty
            | SearchError::Http(_) => "explanation",
            SearchError::Json(_) | SearchError::Internal { .. } => "generic",
        }
    }

    /// HTTP status code surfaced for this error at the API boundary.
    ///
    /// `StoreUnavailable` maps to 503 so load balancers treat the instance as
    /// temporarily degraded; an uninitialized store is a deployment fault and
    /// stays a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::StoreUnavailable { .. } => 503,
            SearchError::ExplanationFailed { .. } | SearchError::Http(_) => 503,
            SearchError::ExplanationEmpty => 502,
            SearchError::ValidationFailed { .. } => 400,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_service_unavailable() {
        let err = SearchError::StoreUnavailable {
            details: "stream aborted".to_string(),
        };
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.category(), "store");
    }

    #[test]
    fn uninitialized_store_is_an_internal_fault() {
        assert_eq!(SearchError::StoreUninitialized.status_code(), 500);
    }
}
