//! # Cart Store
//!
//! The in-memory cart of one point-of-sale or invoice session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action            Operation              Cart Change          │
//! │  ───────────────            ─────────              ───────────          │
//! │                                                                         │
//! │  Click product (POS) ─────► add() ───────────────► qty += 1 or push    │
//! │                                                                         │
//! │  Pick from search ────────► add_unique() ────────► push, or reject     │
//! │                             (invoice form)         "Product already     │
//! │                                                     added"              │
//! │                                                                         │
//! │  Change quantity ─────────► set_quantity() ──────► qty = n, or remove   │
//! │                                                    when n < 1           │
//! │                                                                         │
//! │  Click remove ────────────► remove() ────────────► retain others        │
//! │                                                                         │
//! │  Sale created ────────────► clear() ─────────────► empty               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two add paths have different duplicate policies and both exist on
//! purpose. Neither is implemented in terms of the other.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::totals::{self, Totals};
use crate::types::{PricingPolicy, Product, ProductId};
use crate::validation::MAX_LINE_QUANTITY;

/// One product entry in the cart.
///
/// ## Design Notes
/// - `name` and `unit_price` are frozen when the line is created, so the
///   cart displays consistent data even if the catalog changes meanwhile
/// - `available_stock` is what the listing reported; it is advisory and
///   never enforced here (the backend decides at submission)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    /// Always >= 1 while stored in a cart.
    pub quantity: i64,
    pub available_stock: i64,
}

impl CartLine {
    /// Creates a line with quantity 1 from a listed product.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
            available_stock: product.stock,
        }
    }

    /// `quantity × unit_price`.
    pub fn line_amount(&self) -> Money {
        totals::line_amount(self.quantity, self.unit_price)
    }

    /// True if the quantity is more than the listing said was in stock.
    pub fn exceeds_stock(&self) -> bool {
        self.quantity > self.available_stock
    }
}

/// Ordered list of cart lines, unique by product id.
///
/// ## Invariants
/// - At most one line per `product_id`
/// - Every stored line has `1 <= quantity <= MAX_LINE_QUANTITY`
/// - Insertion order is preserved across updates and removals
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Point-of-sale add: increments the quantity if the product is already
    /// in the cart, otherwise appends a new line with quantity 1.
    /// Stops at [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product: &Product) {
        match self.line_mut(&product.id) {
            Some(line) => line.quantity = (line.quantity + 1).min(MAX_LINE_QUANTITY),
            None => self.lines.push(CartLine::from_product(product)),
        }
    }

    /// Search-picker add: appends a new line, refusing products already present.
    ///
    /// ## Returns
    /// - `Ok(())` when a line was appended
    /// - `Err(CoreError::AlreadyInCart)` and an unchanged cart otherwise
    pub fn add_unique(&mut self, product: &Product) -> CoreResult<()> {
        if self.contains(&product.id) {
            return Err(CoreError::AlreadyInCart {
                product_id: product.id.to_string(),
            });
        }
        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Removes the line for `product_id`. No-op if absent.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity < 1`: same as [`Cart::remove`] (not an error)
    /// - `quantity > MAX_LINE_QUANTITY`: clamped to [`MAX_LINE_QUANTITY`]
    /// - product not in cart: no-op
    /// - otherwise: updated in place, order unchanged
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity.min(MAX_LINE_QUANTITY);
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.line(product_id).is_some()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Lines whose quantity is above the stock the listing reported.
    pub fn over_stock_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.exceeds_stock())
    }

    /// Derived totals under the given pricing policy.
    pub fn totals(&self, policy: &PricingPolicy) -> Totals {
        totals::compute(&self.lines, policy)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;

    fn product(id: &str, price_cents: i64) -> Product {
        Product::new(ProductId::from(id), format!("Product {}", id), Money::from_cents(price_cents), 10)
    }

    fn ids(cart: &Cart) -> Vec<&str> {
        cart.lines().iter().map(|l| l.product_id.as_str()).collect()
    }

    #[test]
    fn test_add_same_product_twice_increments() {
        let mut cart = Cart::new();
        let cola = product("1", 1000);

        cart.add(&cola);
        cart.add(&cola);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_unique_rejects_duplicate_and_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        let cola = product("1", 1000);
        cart.add_unique(&cola).unwrap();
        let before = cart.clone();

        let err = cart.add_unique(&cola).unwrap_err();

        assert_eq!(err.to_string(), "Product already added");
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        let mut cart = Cart::new();
        cart.add(&product("1", 1000));
        cart.add(&product("2", 500));
        cart.add(&product("3", 250));

        cart.set_quantity(&ProductId::from("2"), 0);
        assert_eq!(ids(&cart), vec!["1", "3"]);

        cart.set_quantity(&ProductId::from("3"), -1);
        assert_eq!(ids(&cart), vec!["1"]);
    }

    #[test]
    fn test_set_quantity_clamps_huge_values() {
        let mut cart = Cart::new();
        cart.add(&product("1", 1000));

        cart.set_quantity(&ProductId::from("1"), i64::MAX / 100);
        assert_eq!(cart.lines()[0].quantity, MAX_LINE_QUANTITY);

        let totals = cart.totals(&PricingPolicy::point_of_sale(
            Money::zero(),
            TaxRate::from_bps(800),
        ));
        assert_eq!(totals.subtotal.cents(), 9_999_000);
        assert_eq!(totals.total.cents(), 10_798_920);
    }

    #[test]
    fn test_add_stops_at_max_quantity() {
        let mut cart = Cart::new();
        let cola = product("1", 1000);
        cart.add(&cola);
        cart.set_quantity(&cola.id, MAX_LINE_QUANTITY);

        cart.add(&cola);
        assert_eq!(cart.lines()[0].quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_set_quantity_preserves_order() {
        let mut cart = Cart::new();
        cart.add(&product("1", 1000));
        cart.add(&product("2", 500));
        cart.add(&product("3", 250));

        cart.set_quantity(&ProductId::from("2"), 7);

        assert_eq!(ids(&cart), vec!["1", "2", "3"]);
        assert_eq!(cart.line(&ProductId::from("2")).unwrap().quantity, 7);
        assert_eq!(cart.total_quantity(), 9);
    }

    #[test]
    fn test_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("1", 1000));
        let before = cart.clone();

        cart.set_quantity(&ProductId::from("99"), 4);
        cart.remove(&ProductId::from("99"));

        assert_eq!(cart, before);
    }

    #[test]
    fn test_stock_is_advisory() {
        let mut cart = Cart::new();
        let scarce = Product::new(ProductId::from("1"), "Scarce", Money::from_cents(100), 1);
        cart.add(&scarce);
        cart.add(&scarce);

        assert_eq!(cart.lines()[0].quantity, 2);
        assert!(cart.lines()[0].exceeds_stock());
        assert_eq!(cart.over_stock_lines().count(), 1);
    }

    #[test]
    fn test_totals_follow_mutations() {
        let mut cart = Cart::new();
        let policy = PricingPolicy::point_of_sale(Money::from_cents(500), TaxRate::from_bps(800));
        cart.add(&product("1", 1000));
        cart.add(&product("1", 1000));
        cart.add(&product("2", 500));
        assert_eq!(cart.totals(&policy).total.cents(), 2160);

        cart.remove(&ProductId::from("2"));
        assert_eq!(cart.totals(&policy).total.cents(), 1620);

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.totals(&policy).total.is_zero());
    }
}
