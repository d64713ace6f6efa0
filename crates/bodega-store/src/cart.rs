//! # Cart Engine
//!
//! The single active, mutable order-in-progress, plus the suspended-cart
//! side list.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Scan product ───► add_to_cart() ─────► line qty +1 / insert │
//! │  Change qty ─────► update_cart_quantity() ► clamp [1, stock] │
//! │  Edit price ─────► update_cart_price() ──► decouple line     │
//! │  Park order ─────► suspend_cart() ───────► snapshot + reset  │
//! │  Pick order up ──► restore_cart() ───────► overwrite active  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line prices freeze at add time: a later catalog or exchange-rate
//! edit never silently reprices an order being rung up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use bodega_core::validation::validate_price;
use bodega_core::{CoreError, CoreResult, Discount, ExchangeRate, Money};

use crate::store::Store;

// =============================================================================
// Cart Types
// =============================================================================

/// A line in the active cart.
///
/// `unit_price_usd` starts as the product's catalog price (or an
/// explicit override) and is decoupled from the catalog from then on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    /// Name at time of adding (frozen).
    pub name: String,
    /// USD price at time of adding or last line edit (frozen).
    pub unit_price_usd: Money,
    /// Bs price computed at the exchange rate in force when the line
    /// was added or last repriced.
    pub unit_price_bs: Money,
    pub quantity: i64,
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Line total in USD.
    #[inline]
    pub fn line_total_usd(&self) -> Money {
        self.unit_price_usd.multiply_quantity(self.quantity)
    }
}

/// The active order: line items plus the order-level discount and the
/// selected customer. Exactly one exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub customer_id: Option<String>,
    pub discount: Option<Discount>,
    /// Canonical code of the applied coupon, consumed at sale commit
    /// for usage accounting.
    pub coupon_code: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            customer_id: None,
            discount: None,
            coupon_code: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal_usd(&self) -> Money {
        self.items.iter().map(CartItem::line_total_usd).sum()
    }

    /// Computes order totals at the given exchange rate. The discount
    /// amount is capped at the subtotal, so the total never goes
    /// negative.
    pub fn totals(&self, rate: ExchangeRate) -> CartTotals {
        let subtotal_usd = self.subtotal_usd();
        let discount_usd = self
            .discount
            .map(|d| d.amount_on(subtotal_usd))
            .unwrap_or_else(Money::zero);
        let total_usd = subtotal_usd - discount_usd;

        CartTotals {
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal_usd,
            discount_usd,
            total_usd,
            total_bs: total_usd.to_bs(rate),
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

/// Cart totals summary for display and sale commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_usd: Money,
    pub discount_usd: Money,
    pub total_usd: Money,
    pub total_bs: Money,
}

/// A parked order: a full snapshot of a previously active cart,
/// re-activatable later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendedCart {
    pub id: String,
    pub name: String,
    pub cart: Cart,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
}

// =============================================================================
// Cart Operations
// =============================================================================

impl Store {
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn suspended_carts(&self) -> &[SuspendedCart] {
        &self.suspended_carts
    }

    /// Totals of the active cart at the current exchange rate.
    pub fn cart_totals(&self) -> CartTotals {
        self.cart.totals(self.settings.exchange_rate)
    }

    /// Adds one unit of a product to the cart.
    ///
    /// ## Behavior
    /// - Out-of-stock products are rejected
    /// - An existing line is incremented by 1, rejected past the
    ///   product's stock
    /// - A new line freezes the catalog price (or `custom_price`) and
    ///   its Bs equivalent at the current exchange rate
    pub fn add_to_cart(&mut self, product_id: &str, custom_price: Option<Money>) -> CoreResult<()> {
        if let Some(price) = custom_price {
            validate_price(price)?;
        }

        let (name, stock, catalog_price) = {
            let product = self
                .products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
            (product.name.clone(), product.stock, product.price_usd)
        };

        if stock <= 0 {
            return Err(CoreError::InsufficientStock {
                name,
                available: 0,
                requested: 1,
            });
        }

        let rate = self.settings.exchange_rate;
        if let Some(line) = self.cart.items.iter_mut().find(|i| i.product_id == product_id) {
            if line.quantity + 1 > stock {
                return Err(CoreError::InsufficientStock {
                    name,
                    available: stock,
                    requested: line.quantity + 1,
                });
            }
            line.quantity += 1;
        } else {
            let unit_price = custom_price.unwrap_or(catalog_price);
            self.cart.items.push(CartItem {
                product_id: product_id.to_string(),
                name,
                unit_price_usd: unit_price,
                unit_price_bs: unit_price.to_bs(rate),
                quantity: 1,
                notes: None,
                added_at: Utc::now(),
            });
        }

        debug!(product_id, "cart line added/incremented");
        self.persist();
        Ok(())
    }

    /// Sets a line's quantity, clamped to `[1, stock]`.
    pub fn update_cart_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        let stock = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let line = self
            .cart
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        line.quantity = quantity.clamp(1, stock.max(1));
        self.persist();
        Ok(())
    }

    /// Overrides a line's USD price, decoupling it from the catalog.
    /// The Bs price is recomputed at the current exchange rate.
    pub fn update_cart_price(&mut self, product_id: &str, price: Money) -> CoreResult<()> {
        validate_price(price)?;
        let rate = self.settings.exchange_rate;

        let line = self
            .cart
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        line.unit_price_usd = price;
        line.unit_price_bs = price.to_bs(rate);
        self.persist();
        Ok(())
    }

    pub fn update_cart_notes(
        &mut self,
        product_id: &str,
        notes: Option<String>,
    ) -> CoreResult<()> {
        let line = self
            .cart
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        line.notes = notes.filter(|n| !n.trim().is_empty());
        self.persist();
        Ok(())
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.cart.items.len();
        self.cart.items.retain(|i| i.product_id != product_id);

        if self.cart.items.len() == before {
            return Err(CoreError::NotInCart(product_id.to_string()));
        }

        self.persist();
        Ok(())
    }

    /// Resets the whole order: lines, customer, discount and coupon.
    pub fn clear_cart(&mut self) {
        self.cart = Cart::new();
        self.persist();
    }

    /// Attaches a customer to the order (or detaches with `None`).
    pub fn set_cart_customer(&mut self, customer_id: Option<&str>) -> CoreResult<()> {
        if let Some(id) = customer_id {
            if self.customer(id).is_none() {
                return Err(CoreError::CustomerNotFound(id.to_string()));
            }
        }

        self.cart.customer_id = customer_id.map(str::to_string);
        self.persist();
        Ok(())
    }

    /// Sets a manual order discount. Replacing the discount drops any
    /// applied coupon: the coupon is no longer the discount's source.
    pub fn set_cart_discount(&mut self, discount: Option<Discount>) {
        self.cart.discount = discount;
        self.cart.coupon_code = None;
        self.persist();
    }

    /// Parks the active order under a name and resets the cart.
    pub fn suspend_cart(&mut self, name: Option<String>) -> CoreResult<String> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let id = Uuid::new_v4().to_string();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Ticket {}", self.suspended_carts.len() + 1));

        debug!(%id, %name, lines = self.cart.items.len(), "cart suspended");
        self.suspended_carts.push(SuspendedCart {
            id: id.clone(),
            name,
            cart: std::mem::take(&mut self.cart),
            date: Utc::now(),
        });

        self.persist();
        Ok(id)
    }

    /// Overwrites the active cart from a suspended snapshot.
    ///
    /// The snapshot stays in the suspended list until deleted
    /// explicitly, so it can be restored again (template reuse).
    pub fn restore_cart(&mut self, suspended_id: &str) -> CoreResult<()> {
        let snapshot = self
            .suspended_carts
            .iter()
            .find(|s| s.id == suspended_id)
            .ok_or_else(|| CoreError::SuspendedCartNotFound(suspended_id.to_string()))?;

        self.cart = snapshot.cart.clone();
        debug!(id = suspended_id, "cart restored");
        self.persist();
        Ok(())
    }

    pub fn delete_suspended_cart(&mut self, suspended_id: &str) -> CoreResult<SuspendedCart> {
        let idx = self
            .suspended_carts
            .iter()
            .position(|s| s.id == suspended_id)
            .ok_or_else(|| CoreError::SuspendedCartNotFound(suspended_id.to_string()))?;

        let removed = self.suspended_carts.remove(idx);
        self.persist();
        Ok(removed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductDraft;

    fn store_with(name: &str, price_cents: i64, stock: i64) -> (Store, String) {
        let mut store = Store::in_memory();
        store
            .set_exchange_rate(ExchangeRate::from_millis(36_500))
            .unwrap();
        let product = store
            .add_product(ProductDraft {
                name: name.to_string(),
                price_usd: Money::from_cents(price_cents),
                stock,
                ..Default::default()
            })
            .unwrap();
        (store, product.id)
    }

    #[test]
    fn test_add_to_cart_freezes_prices() {
        let (mut store, id) = store_with("Malta", 150, 10);

        store.add_to_cart(&id, None).unwrap();

        let line = &store.cart().items[0];
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price_usd.cents(), 150);
        assert_eq!(line.unit_price_bs.cents(), Money::from_cents(150).to_bs(ExchangeRate::from_millis(36_500)).cents());
    }

    #[test]
    fn test_add_to_cart_increments_existing_line() {
        let (mut store, id) = store_with("Malta", 150, 10);

        store.add_to_cart(&id, None).unwrap();
        store.add_to_cart(&id, None).unwrap();

        assert_eq!(store.cart().item_count(), 1);
        assert_eq!(store.cart().items[0].quantity, 2);
    }

    #[test]
    fn test_add_to_cart_rejects_out_of_stock() {
        let (mut store, id) = store_with("Agotado", 150, 0);
        assert!(matches!(
            store.add_to_cart(&id, None),
            Err(CoreError::InsufficientStock { .. })
        ));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_cart_line_never_exceeds_stock() {
        let (mut store, id) = store_with("Escaso", 100, 3);

        for _ in 0..3 {
            store.add_to_cart(&id, None).unwrap();
        }
        // Fourth unit rejected; the line stays at the cap.
        assert!(store.add_to_cart(&id, None).is_err());
        assert_eq!(store.cart().items[0].quantity, 3);
    }

    #[test]
    fn test_custom_price_overrides_catalog() {
        let (mut store, id) = store_with("Regalo", 500, 5);

        store.add_to_cart(&id, Some(Money::from_cents(100))).unwrap();
        assert_eq!(store.cart().items[0].unit_price_usd.cents(), 100);
    }

    #[test]
    fn test_update_quantity_clamps_to_stock() {
        let (mut store, id) = store_with("Malta", 150, 4);
        store.add_to_cart(&id, None).unwrap();

        store.update_cart_quantity(&id, 99).unwrap();
        assert_eq!(store.cart().items[0].quantity, 4);

        store.update_cart_quantity(&id, 0).unwrap();
        assert_eq!(store.cart().items[0].quantity, 1);

        store.update_cart_quantity(&id, -5).unwrap();
        assert_eq!(store.cart().items[0].quantity, 1);
    }

    #[test]
    fn test_update_price_decouples_line_from_catalog() {
        let (mut store, id) = store_with("Malta", 150, 4);
        store.add_to_cart(&id, None).unwrap();

        store.update_cart_price(&id, Money::from_cents(125)).unwrap();
        assert_eq!(store.cart().items[0].unit_price_usd.cents(), 125);
        // Catalog price untouched.
        assert_eq!(store.product(&id).unwrap().price_usd.cents(), 150);
    }

    #[test]
    fn test_notes_and_remove() {
        let (mut store, id) = store_with("Malta", 150, 4);
        store.add_to_cart(&id, None).unwrap();

        store
            .update_cart_notes(&id, Some("bien fría".to_string()))
            .unwrap();
        assert_eq!(store.cart().items[0].notes.as_deref(), Some("bien fría"));

        store.update_cart_notes(&id, Some("   ".to_string())).unwrap();
        assert!(store.cart().items[0].notes.is_none());

        store.remove_from_cart(&id).unwrap();
        assert!(store.cart().is_empty());
        assert!(matches!(
            store.remove_from_cart(&id),
            Err(CoreError::NotInCart(_))
        ));
    }

    #[test]
    fn test_totals_with_percentage_discount() {
        let (mut store, id) = store_with("Malta", 200, 10);
        for _ in 0..3 {
            store.add_to_cart(&id, None).unwrap();
        }
        store.set_cart_discount(Some(Discount::Percentage(1000)));

        let totals = store.cart_totals();
        assert_eq!(totals.subtotal_usd.cents(), 600);
        assert_eq!(totals.discount_usd.cents(), 60);
        assert_eq!(totals.total_usd.cents(), 540);
        assert_eq!(totals.total_bs.cents(), 19_710);
    }

    #[test]
    fn test_excessive_discount_clamps_total_at_zero() {
        let (mut store, id) = store_with("Malta", 200, 10);
        store.add_to_cart(&id, None).unwrap();
        store.set_cart_discount(Some(Discount::Fixed(Money::from_cents(10_000))));

        let totals = store.cart_totals();
        assert_eq!(totals.discount_usd.cents(), 200);
        assert_eq!(totals.total_usd.cents(), 0);
    }

    #[test]
    fn test_suspend_and_restore_round_trip() {
        let (mut store, id) = store_with("Malta", 150, 10);
        store.add_to_cart(&id, None).unwrap();
        store.set_cart_discount(Some(Discount::Percentage(500)));

        let before = store.cart().clone();
        let suspended_id = store.suspend_cart(Some("encargo".to_string())).unwrap();

        // Suspension empties the active cart.
        assert!(store.cart().is_empty());
        assert!(store.cart().discount.is_none());
        assert_eq!(store.suspended_carts().len(), 1);
        assert_eq!(store.suspended_carts()[0].name, "encargo");

        store.restore_cart(&suspended_id).unwrap();
        assert_eq!(store.cart().items, before.items);
        assert_eq!(store.cart().discount, before.discount);

        // The snapshot survives the restore until deleted explicitly.
        assert_eq!(store.suspended_carts().len(), 1);
        store.delete_suspended_cart(&suspended_id).unwrap();
        assert!(store.suspended_carts().is_empty());
    }

    #[test]
    fn test_suspend_empty_cart_is_rejected() {
        let mut store = Store::in_memory();
        assert!(matches!(store.suspend_cart(None), Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_restore_unknown_id_is_rejected() {
        let mut store = Store::in_memory();
        assert!(matches!(
            store.restore_cart("nope"),
            Err(CoreError::SuspendedCartNotFound(_))
        ));
    }

    #[test]
    fn test_manual_discount_drops_applied_coupon() {
        let (mut store, id) = store_with("Malta", 150, 10);
        store.add_to_cart(&id, None).unwrap();
        store.cart.coupon_code = Some("PROMO10".to_string());

        store.set_cart_discount(Some(Discount::Fixed(Money::from_cents(50))));
        assert!(store.cart().coupon_code.is_none());
    }
}
