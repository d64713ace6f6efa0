//! # Full-State Snapshot (export/import surface)
//!
//! The snapshot is both the persisted document and the contract with the
//! cloud-sync collaborator: `export()` hands out the whole state,
//! `import()` applies a replacement in one operation, so a sync
//! round-trip can never interleave with a half-applied cart edit.
//!
//! Every list key is optional: an importing snapshot replaces exactly
//! the keys it carries and leaves the rest untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bodega_core::{
    CashRegister, Combo, Coupon, Customer, Product, Return, Sale, Settings, StockTransfer,
    Supplier,
};

use crate::cart::{Cart, SuspendedCart};
use crate::store::Store;

// =============================================================================
// Snapshot Document
// =============================================================================

/// The full persisted state of the store.
///
/// ## Layout
/// A single keyed JSON document. Derived data (totals, low-stock sets)
/// is never persisted; it is recomputed from these slices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub products: Option<Vec<Product>>,
    pub customers: Option<Vec<Customer>>,
    pub suppliers: Option<Vec<Supplier>>,
    pub coupons: Option<Vec<Coupon>>,
    pub combos: Option<Vec<Combo>>,
    pub sales: Option<Vec<Sale>>,
    pub returns: Option<Vec<Return>>,
    pub stock_transfers: Option<Vec<StockTransfer>>,
    pub cash_registers: Option<Vec<CashRegister>>,
    /// The in-progress cart is persisted too: a restart must not drop an
    /// order that was being rung up.
    pub cart: Option<Cart>,
    pub suspended_carts: Option<Vec<SuspendedCart>>,
    pub settings: Option<Settings>,
    /// Monotonic sale counter; persisted so numbering survives restarts.
    pub sale_counter: Option<u64>,
    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            products: None,
            customers: None,
            suppliers: None,
            coupons: None,
            combos: None,
            sales: None,
            returns: None,
            stock_transfers: None,
            cash_registers: None,
            cart: None,
            suspended_carts: None,
            settings: None,
            sale_counter: None,
            exported_at: Utc::now(),
        }
    }
}

// =============================================================================
// Store Export / Import
// =============================================================================

impl Store {
    /// Exports the complete state. Every key is present.
    pub fn export(&self) -> Snapshot {
        Snapshot {
            products: Some(self.products.clone()),
            customers: Some(self.customers.clone()),
            suppliers: Some(self.suppliers.clone()),
            coupons: Some(self.coupons.clone()),
            combos: Some(self.combos.clone()),
            sales: Some(self.sales.clone()),
            returns: Some(self.returns.clone()),
            stock_transfers: Some(self.stock_transfers.clone()),
            cash_registers: Some(self.cash_registers.clone()),
            cart: Some(self.cart.clone()),
            suspended_carts: Some(self.suspended_carts.clone()),
            settings: Some(self.settings.clone()),
            sale_counter: Some(self.sale_counter),
            exported_at: Utc::now(),
        }
    }

    /// Imports a snapshot in one operation.
    ///
    /// Each list key present in the snapshot replaces the corresponding
    /// slice wholesale; absent keys leave current state untouched.
    /// `import(export())` leaves the observable state unchanged.
    pub fn import(&mut self, snapshot: Snapshot) {
        debug!(exported_at = %snapshot.exported_at, "importing snapshot");

        if let Some(products) = snapshot.products {
            self.products = products;
        }
        if let Some(customers) = snapshot.customers {
            self.customers = customers;
        }
        if let Some(suppliers) = snapshot.suppliers {
            self.suppliers = suppliers;
        }
        if let Some(coupons) = snapshot.coupons {
            self.coupons = coupons;
        }
        if let Some(combos) = snapshot.combos {
            self.combos = combos;
        }
        if let Some(sales) = snapshot.sales {
            self.sales = sales;
        }
        if let Some(returns) = snapshot.returns {
            self.returns = returns;
        }
        if let Some(stock_transfers) = snapshot.stock_transfers {
            self.stock_transfers = stock_transfers;
        }
        if let Some(cash_registers) = snapshot.cash_registers {
            self.cash_registers = cash_registers;
        }
        if let Some(cart) = snapshot.cart {
            self.cart = cart;
        }
        if let Some(suspended_carts) = snapshot.suspended_carts {
            self.suspended_carts = suspended_carts;
        }
        if let Some(settings) = snapshot.settings {
            self.settings = settings;
        }
        if let Some(sale_counter) = snapshot.sale_counter {
            self.sale_counter = sale_counter;
        }

        self.persist();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = Snapshot::default();
        assert!(snapshot.products.is_none());
        assert!(snapshot.sale_counter.is_none());
    }

    #[test]
    fn test_snapshot_json_keys_are_camel_case() {
        let mut snapshot = Snapshot::default();
        snapshot.sale_counter = Some(7);
        snapshot.stock_transfers = Some(Vec::new());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""saleCounter":7"#));
        assert!(json.contains(r#""stockTransfers":[]"#));
        assert!(json.contains(r#""exportedAt""#));
    }

    #[test]
    fn test_snapshot_tolerates_missing_keys() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"saleCounter": 3}"#).unwrap();
        assert_eq!(snapshot.sale_counter, Some(3));
        assert!(snapshot.products.is_none());
    }
}
