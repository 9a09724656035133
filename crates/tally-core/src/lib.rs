//! # tally-core: Pure Business Logic for Tally
//!
//! This crate is the arithmetic and cart heart of Tally. It contains the
//! point-of-sale and invoice-builder logic as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front-end (POS screen / Invoice form)           │   │
//! │  │    Search box ──► Cart ──► Totals panel ──► Submit button       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │   cart    │  │  totals   │  │  invoice  │  │   │
//! │  │   │   Money   │  │   Cart    │  │  Totals   │  │  Request  │  │   │
//! │  │   │  TaxRate  │  │ CartLine  │  │ Discount  │  │  Details  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tally-client (Backend Layer)                    │   │
//! │  │        HTTP, debounced search, invoice submission              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, rates, discount modes)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart store with the two duplicate-product policies
//! - [`totals`] - Subtotal, discount, tax and total computation
//! - [`invoice`] - Invoice details and the immutable request snapshot
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::cart::Cart;
//! use tally_core::money::Money;
//! use tally_core::types::{PricingPolicy, Product, ProductId, TaxRate};
//!
//! let mut cart = Cart::new();
//! cart.add(&Product::new(ProductId::from("1"), "Cola", Money::from_cents(1000), 12));
//! cart.add(&Product::new(ProductId::from("1"), "Cola", Money::from_cents(1000), 12));
//!
//! let policy = PricingPolicy::point_of_sale(Money::from_cents(500), TaxRate::from_bps(800));
//! let totals = cart.totals(&policy);
//!
//! // $20.00 - $5.00 = $15.00, tax 8% = $1.20
//! assert_eq!(totals.total.cents(), 1620);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod invoice;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceDetails, InvoiceLine, InvoiceNumber, InvoiceRequest};
pub use money::Money;
pub use totals::Totals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default quiescence window for the product search box, in milliseconds.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;

/// Default number of candidates returned by a product search.
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 25;

/// Maximum length of a search query.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
