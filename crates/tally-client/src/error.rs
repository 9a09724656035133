//! # Client Error Types
//!
//! Error types for backend operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  (a) Local      │  │  (b) Transport  │  │  (c) Backend rejected   │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Validation     │  │  Network        │  │  Rejected {status, msg} │ │
//! │  │  (empty cart,   │  │  (connect,      │  │  (insufficient stock,   │ │
//! │  │   blank field)  │  │   timeout)      │  │   duplicate invoice)    │ │
//! │  │                 │  │                 │  │  SaleNotCreated         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │  Configuration  │  │    Protocol     │                              │
//! │  │                 │  │                 │                              │
//! │  │  InvalidConfig  │  │  Unexpected     │                              │
//! │  │  InvalidUrl     │  │  Response       │                              │
//! │  │  ConfigLoad/Save│  │  Serialization  │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is retried automatically. [`ClientError::user_message`] turns any
//! error into the text shown to the operator.

use tally_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown when the backend gives no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Shown for transport failures.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please try again.";

/// Client error type covering all backend interaction failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Rejected locally, before any request was made.
    #[error("{0}")]
    Validation(#[from] CoreError),

    /// A submission is already outstanding.
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection, DNS, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the backend's `error.message`, when it sent one.
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Rejected { status: u16, message: Option<String> },

    /// The sale endpoint answered 2xx without a created record id.
    #[error("Failed to create sale.")]
    SaleNotCreated,

    /// A debounced product search failed. Carries the operator-facing text.
    #[error("{0}")]
    SearchFailed(String),

    /// The response body could not be decoded.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Failed to serialize a request body.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::UnexpectedResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Text to show the operator.
    ///
    /// ## Mapping
    /// ```text
    /// Validation          ──► the validation message itself
    /// Network             ──► "Network error. Please try again."
    /// Rejected {msg}      ──► msg verbatim
    /// Rejected {no msg}   ──► "Something went wrong"
    /// SaleNotCreated      ──► "Failed to create sale."
    /// anything else       ──► "Something went wrong"
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(err) => err.to_string(),
            ClientError::SubmissionInProgress
            | ClientError::SaleNotCreated
            | ClientError::SearchFailed(_) => self.to_string(),
            ClientError::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            ClientError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// The backend's own message, if the backend rejected the request with one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the error was raised locally, before any request.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Returns true for transport failures.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// Returns true if the backend refused the request.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected { .. } | ClientError::SaleNotCreated
        )
    }

    /// Returns true for unauthenticated or forbidden responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Rejected { status: 401 | 403, .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}
