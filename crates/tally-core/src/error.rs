//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Cart and business rule failures                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-client errors (separate crate)                                  │
//! │  └── ClientError      - Network, backend rejection, config             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → user message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant renders to a message that can be shown to the operator
//! as-is. Local validation errors never reach the network.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The search picker refuses to add a product that is already a line.
    ///
    /// ## User Workflow
    /// ```text
    /// Invoice form: type "cola" ──► pick "Cola 330ml"
    ///      │
    ///      ▼
    /// Cart already has Cola 330ml?
    ///      │
    ///      ├── yes ──► AlreadyInCart ──► toast "Product already added"
    ///      │
    ///      └── no  ──► append line with quantity 1
    /// ```
    #[error("Product already added")]
    AlreadyInCart { product_id: String },

    /// Requested quantity exceeds the stock the backend reported.
    ///
    /// Advisory only: the backend is the authority on stock.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Submission attempted with no lines.
    #[error("At least one product is required.")]
    EmptyCart,
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Cola 330ml".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Cola 330ml: available 3, requested 5"
        );

        let err = CoreError::AlreadyInCart {
            product_id: "7".to_string(),
        };
        assert_eq!(err.to_string(), "Product already added");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("Customer name").to_string(),
            "Customer name is required"
        );
        assert_eq!(
            ValidationError::EmptyCart.to_string(),
            "At least one product is required."
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyCart.into();
        assert!(matches!(core_err, CoreError::Validation(ValidationError::EmptyCart)));
        // Wrapping is transparent for display
        assert_eq!(core_err.to_string(), "At least one product is required.");
    }
}
