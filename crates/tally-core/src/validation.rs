//! # Validation Module
//!
//! Input validation for forms and cart operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end form                                                │
//! │  ├── Required markers, input types                                      │
//! │  └── Immediate operator feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: tally-core (THIS MODULE)                                      │
//! │  └── Business rules, checked before any request is built                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Content backend                                               │
//! │  ├── Schema constraints                                                 │
//! │  └── Live stock check at sale creation                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_quantity, validate_search_query};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert_eq!(validate_search_query("  cola ").unwrap(), "cola");
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CategoryDraft, ProductDraft};
use crate::MAX_SEARCH_QUERY_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for a single line quantity.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Longest accepted name for products and categories.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects blank (empty or whitespace-only) values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;
    if value.trim().chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Validates a product search query.
///
/// ## Rules
/// - Leading/trailing whitespace is dropped
/// - May be empty (the caller clears results instead of searching)
/// - At most 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity typed by the operator.
///
/// Note that the cart itself treats `< 1` as "remove"; this check is for
/// inputs that must produce a line, like `--item 7:3` on the command line.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a product price: strictly positive.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.cents() <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level entered on the product form: strictly positive.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Stock".to_string(),
        });
    }
    Ok(())
}

/// Validates a rate in basis points (0% to 100%).
pub fn validate_rate_bps(field: &str, bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates the product create/edit form.
///
/// ## Rules
/// - Name and barcode are required
/// - Price and stock must be greater than zero
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_name("Name", &draft.name)?;
    validate_price(draft.price)?;
    validate_stock(draft.stock)?;
    validate_required("Barcode", &draft.barcode)?;
    Ok(())
}

/// Validates the category create/edit form.
pub fn validate_category_draft(draft: &CategoryDraft) -> ValidationResult<()> {
    validate_name("Name", &draft.name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Cola 330ml".to_string(),
            description: None,
            price: Money::from_cents(150),
            stock: 24,
            barcode: "5449000000996".to_string(),
            category: None,
        }
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Customer name", "Ada").is_ok());
        assert!(validate_required("Customer name", "").is_err());
        assert!(validate_required("Customer name", "   ").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  cola  ").unwrap(), "cola");
        assert_eq!(validate_search_query("   ").unwrap(), "");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_rate_bps() {
        assert!(validate_rate_bps("tax_rate", 0).is_ok());
        assert!(validate_rate_bps("tax_rate", 825).is_ok());
        assert!(validate_rate_bps("tax_rate", 10_000).is_ok());
        assert!(validate_rate_bps("tax_rate", 10_001).is_err());
    }

    #[test]
    fn test_validate_product_draft() {
        assert!(validate_product_draft(&draft()).is_ok());

        let mut no_barcode = draft();
        no_barcode.barcode = " ".to_string();
        assert_eq!(
            validate_product_draft(&no_barcode).unwrap_err(),
            ValidationError::required("Barcode")
        );

        let mut free = draft();
        free.price = Money::zero();
        assert!(validate_product_draft(&free).is_err());

        let mut out_of_stock = draft();
        out_of_stock.stock = 0;
        assert!(validate_product_draft(&out_of_stock).is_err());
    }

    #[test]
    fn test_validate_category_draft() {
        let ok = CategoryDraft {
            name: "Beverages".to_string(),
            description: None,
        };
        assert!(validate_category_draft(&ok).is_ok());

        let too_long = CategoryDraft {
            name: "x".repeat(MAX_NAME_LEN + 1),
            description: None,
        };
        assert!(validate_category_draft(&too_long).is_err());
    }
}
