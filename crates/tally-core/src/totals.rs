//! # Totals Module
//!
//! Derives the monetary figures of a cart: subtotal, discount, tax, total.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  lines ──► Σ quantity × unit_price ──► subtotal                         │
//! │                                            │                            │
//! │                 Discount::Flat(amount) ────┤                            │
//! │                 Discount::Rate(bps)    ────┤  capped at subtotal        │
//! │                                            ▼                            │
//! │                        taxable_base = subtotal - discount (>= 0)        │
//! │                                            │                            │
//! │                        tax = taxable_base × rate (half-up, once)        │
//! │                                            ▼                            │
//! │                        total = taxable_base + tax                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Clamping
//! A flat discount larger than the subtotal would produce a negative
//! taxable base. The discount is capped at the subtotal instead, and the
//! capped value is what gets reported, so `total == subtotal - discount + tax`
//! holds exactly for every cart and both discount modes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::money::Money;
use crate::types::{Discount, PricingPolicy};

/// Derived monetary figures of a cart.
///
/// Never stored on its own; recompute after every cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    /// Applied discount (after capping at the subtotal).
    pub discount: Money,
    pub taxable_base: Money,
    pub tax: Money,
    pub total: Money,
}

/// `quantity × unit_price`.
#[inline]
pub fn line_amount(quantity: i64, unit_price: Money) -> Money {
    unit_price.multiply_quantity(quantity)
}

/// Sum of all line amounts. Order of lines does not matter.
pub fn subtotal(lines: &[CartLine]) -> Money {
    lines
        .iter()
        .map(|line| line_amount(line.quantity, line.unit_price))
        .sum()
}

/// Discount applied to `subtotal` under the given mode.
///
/// The result is in `0..=subtotal` for a non-negative subtotal.
pub fn discount_amount(subtotal: Money, discount: &Discount) -> Money {
    let raw = match discount {
        Discount::Flat(amount) => *amount,
        Discount::Rate(rate) => subtotal.calculate_discount(*rate),
    };

    if raw.is_negative() {
        return Money::zero();
    }
    if subtotal.is_negative() {
        return Money::zero();
    }
    raw.min(subtotal)
}

/// Computes all totals for a set of lines.
///
/// ## Example
/// ```rust
/// use tally_core::cart::Cart;
/// use tally_core::money::Money;
/// use tally_core::totals;
/// use tally_core::types::{DiscountRate, PricingPolicy, Product, ProductId, TaxRate};
///
/// let mut cart = Cart::new();
/// cart.add(&Product::new(ProductId::from("1"), "Notebook", Money::from_cents(10000), 3));
///
/// let policy = PricingPolicy::invoice(DiscountRate::from_bps(1000), TaxRate::from_bps(800));
/// let totals = totals::compute(cart.lines(), &policy);
///
/// assert_eq!(totals.discount.cents(), 1000); // 10% of $100.00
/// assert_eq!(totals.tax.cents(), 720);       // 8% of $90.00
/// assert_eq!(totals.total.cents(), 9720);
/// ```
pub fn compute(lines: &[CartLine], policy: &PricingPolicy) -> Totals {
    let subtotal = subtotal(lines);
    let discount = discount_amount(subtotal, &policy.discount);
    let taxable_base = subtotal - discount;
    let tax = taxable_base.calculate_tax(policy.tax_rate);

    Totals {
        subtotal,
        discount,
        taxable_base,
        tax,
        total: taxable_base + tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
