//! # Rates Error Types
//!
//! Error types for carrier rate quoting and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rates Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Carrier             │ │
//! │  │                 │  │   (retryable)   │  │     (terminal)          │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  HttpStatus 4xx         │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  Rejected               │ │
//! │  │  ConfigLoad/Save│  │  HttpStatus 5xx │  │  Decode                 │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Core (wraps roastery_core::CoreError)                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use roastery_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for rate operations.
pub type RatesResult<T> = Result<T, RatesError>;

/// Everything that can go wrong while fetching a carrier rate.
#[derive(Debug, Error)]
pub enum RatesError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid rates configuration.
    #[error("Invalid rates configuration: {0}")]
    InvalidConfig(String),

    /// Invalid carrier endpoint.
    #[error("Invalid carrier URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced an HTTP response.
    #[error("Carrier request failed: {0}")]
    Transport(String),

    /// The carrier did not answer in time.
    #[error("Carrier request timed out after {0} ms")]
    Timeout(u64),

    /// The carrier answered with a non-2xx status.
    #[error("Carrier returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // =========================================================================
    // Carrier Errors
    // =========================================================================
    /// The carrier answered `success: false`.
    #[error("Carrier rejected the request: {0}")]
    Rejected(String),

    /// The response body could not be understood.
    #[error("Invalid carrier response: {0}")]
    Decode(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Checkout computation failed (wraps CoreError).
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for RatesError {
    fn from(err: ValidationError) -> Self {
        RatesError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for RatesError {
    fn from(err: serde_json::Error) -> Self {
        RatesError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for RatesError {
    fn from(err: url::ParseError) -> Self {
        RatesError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for RatesError {
    fn from(err: std::io::Error) -> Self {
        RatesError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for RatesError {
    fn from(err: toml::de::Error) -> Self {
        RatesError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for RatesError {
    fn from(err: toml::ser::Error) -> Self {
        RatesError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl RatesError {
    /// Returns true if the request may succeed when sent again.
    ///
    /// ## Retryable Errors
    /// - Transport failures (connection refused, reset, DNS)
    /// - Timeouts
    /// - HTTP 5xx
    ///
    /// ## Non-Retryable Errors
    /// - HTTP 4xx: the request itself is wrong
    /// - `success: false`: the carrier made a decision
    /// - Undecodable responses and configuration errors
    pub fn is_retryable(&self) -> bool {
        match self {
            RatesError::Transport(_) | RatesError::Timeout(_) => true,
            RatesError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RatesError::InvalidConfig(_)
                | RatesError::InvalidUrl(_)
                | RatesError::ConfigLoadFailed(_)
                | RatesError::ConfigSaveFailed(_)
        )
    }
}
