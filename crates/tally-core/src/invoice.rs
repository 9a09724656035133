//! # Invoice Module
//!
//! Invoice header details and the immutable request snapshot that is sent
//! to the sale-transaction endpoint.
//!
//! ## Snapshot Flow
//! ```text
//! ┌───────────────┐   ┌──────────┐   ┌───────────────┐
//! │ InvoiceDetails│ + │   Cart   │ + │ PricingPolicy │
//! └───────┬───────┘   └────┬─────┘   └───────┬───────┘
//!         │                │                 │
//!         └────────────────┼─────────────────┘
//!                          ▼
//!              InvoiceRequest::build()
//!                          │
//!   1. cart empty?  ──────────► Err(EmptyCart)     (nothing else checked)
//!   2. details valid? ────────► Err(Required ...)
//!   3. copy lines + compute Totals
//!                          │
//!                          ▼
//!                  InvoiceRequest (owned, never mutated)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::ValidationError;
use crate::money::Money;
use crate::totals::Totals;
use crate::types::{PricingPolicy, ProductId};
use crate::validation::{validate_required, ValidationResult};

// =============================================================================
// Invoice Number
// =============================================================================

/// Human-readable invoice number such as `INV-261018-142305-3FA9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Generates an invoice number from a timestamp and a random suffix.
    ///
    /// The suffix keeps two invoices created in the same second apart.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        InvoiceNumber(format!(
            "INV-{}-{}",
            now.format("%y%m%d-%H%M%S"),
            suffix[..4].to_uppercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> Self {
        number.0
    }
}

// =============================================================================
// Invoice Details
// =============================================================================

/// Header fields of the invoice form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub customer_name: String,
    pub invoice_number: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl InvoiceDetails {
    /// Checks the required header fields.
    ///
    /// The first missing field is reported.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("Customer name", &self.customer_name)?;
        validate_required("Invoice number", &self.invoice_number)?;
        validate_required("Customer email", &self.customer_email)?;
        validate_required("Customer phone", &self.customer_phone)?;
        Ok(())
    }
}

// =============================================================================
// Invoice Request
// =============================================================================

/// One line of the submitted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Unit price at the time of submission.
    pub price: Money,
}

/// Snapshot of an invoice, built once and sent once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub customer_name: String,
    pub invoice_number: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub totals: Totals,
}

impl InvoiceRequest {
    /// Builds the request from the current cart.
    ///
    /// ## Errors
    /// - [`ValidationError::EmptyCart`] if the cart has no lines (checked first)
    /// - [`ValidationError::Required`] for a blank header field
    pub fn build(
        details: &InvoiceDetails,
        cart: &Cart,
        policy: &PricingPolicy,
    ) -> Result<Self, ValidationError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        details.validate()?;

        let lines = cart
            .lines()
            .iter()
            .map(|line| InvoiceLine {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect();

        Ok(InvoiceRequest {
            customer_name: details.customer_name.trim().to_string(),
            invoice_number: details.invoice_number.trim().to_string(),
            customer_email: details.customer_email.trim().to_string(),
            customer_phone: details.customer_phone.trim().to_string(),
            date: details.date,
            notes: details
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
            lines,
            totals: cart.totals(policy),
        })
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
