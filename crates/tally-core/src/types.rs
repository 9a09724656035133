//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Category     │   │  PricingPolicy  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (opaque)    │   │  id (opaque)    │   │  discount       │       │
//! │  │  document_id    │   │  document_id    │   │  tax_rate       │       │
//! │  │  name, price    │   │  name           │   └─────────────────┘       │
//! │  │  stock          │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  DiscountRate   │   │    Discount     │       │
//! │  │  bps (u32)      │   │  bps (u32)      │   │  Flat(Money)    │       │
//! │  │  800 = 8%       │   │  1000 = 10%     │   │  Rate(rate)     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! Records coming from the content backend carry two identifiers:
//! - `id`: numeric on the wire, treated as an opaque string here; used in
//!   relations (invoice lines reference products by `id`)
//! - `document_id`: used in REST paths for update and delete

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

/// Wire representation of a backend identifier: a number or a string.
///
/// Every id the backend sends goes through this before becoming a typed id
/// or an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    /// `7` and `"7"` both become `"7"`.
    pub fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// Opaque product identifier.
///
/// Deserializes from `7` or `"7"`; both compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct ProductId(String);

impl ProductId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId(id)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id.to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| ProductId(raw.into_string()))
    }
}

/// Opaque category identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub struct CategoryId(String);

impl CategoryId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        CategoryId(id.to_string())
    }
}

impl From<u64> for CategoryId {
    fn from(id: u64) -> Self {
        CategoryId(id.to_string())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CategoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawId::deserialize(deserializer).map(|raw| CategoryId(raw.into_string()))
    }
}

// =============================================================================
// Rates
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (invoice-builder default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage such as `8.25`.
    ///
    /// Returns `None` for negative or absurdly large values.
    pub fn from_percentage(pct: Decimal) -> Option<Self> {
        percentage_to_bps(pct).map(TaxRate)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

/// Discount rate represented in basis points (1000 = 10%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a discount rate from a percentage such as `10`.
    pub fn from_percentage(pct: Decimal) -> Option<Self> {
        percentage_to_bps(pct).map(DiscountRate)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

fn percentage_to_bps(pct: Decimal) -> Option<u32> {
    if pct.is_sign_negative() {
        return None;
    }
    pct.checked_mul(Decimal::ONE_HUNDRED)?.round().to_u32()
}

// =============================================================================
// Discount Modes
// =============================================================================

/// How the discount amount of a cart is derived.
///
/// ## Two Flows, Two Modes
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Point-of-sale screen          │  Invoice builder                       │
/// │  ─────────────────────         │  ─────────────────                     │
/// │  Cashier types "5" into the    │  Fixed 10% of the subtotal             │
/// │  discount box                  │                                        │
/// │                                │                                        │
/// │  Discount::Flat($5.00)         │  Discount::Rate(1000 bps)              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
/// The modes are deliberately distinct; neither is expressed via the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Discount {
    /// Fixed amount off the subtotal.
    Flat(Money),
    /// Fraction of the subtotal.
    Rate(DiscountRate),
}

impl Default for Discount {
    fn default() -> Self {
        Discount::Flat(Money::zero())
    }
}

/// Discount and tax settings applied to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingPolicy {
    pub discount: Discount,
    pub tax_rate: TaxRate,
}

impl PricingPolicy {
    /// Point-of-sale flow: flat discount amount.
    pub const fn point_of_sale(flat_discount: Money, tax_rate: TaxRate) -> Self {
        PricingPolicy {
            discount: Discount::Flat(flat_discount),
            tax_rate,
        }
    }

    /// Invoice-builder flow: discount as a rate of the subtotal.
    pub const fn invoice(discount_rate: DiscountRate, tax_rate: TaxRate) -> Self {
        PricingPolicy {
            discount: Discount::Rate(discount_rate),
            tax_rate,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A product as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    /// Identifier used in REST paths for update/delete.
    pub document_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub barcode: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Stock level at the time of listing (advisory).
    pub stock: i64,
    pub category: Option<CategoryRef>,
    /// Image URL, if one was uploaded.
    pub image: Option<String>,
}

impl Product {
    /// Creates a product with only the fields the cart cares about.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Product {
            id,
            document_id: None,
            name: name.into(),
            description: None,
            barcode: None,
            price,
            stock,
            category: None,
            image: None,
        }
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: CategoryId,
    pub document_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

/// Fields of the product create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub barcode: String,
    pub category: Option<CategoryId>,
}

/// Fields of the category create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Paging
// =============================================================================

/// Requested page of a listing screen (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: 10,
        }
    }
}

/// Pagination metadata returned with a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

/// One page of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Returns true if a later page exists.
    pub fn has_next(&self) -> bool {
        self.meta.page < self.meta.page_count
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
