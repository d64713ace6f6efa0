//! # The Store Container
//!
//! One explicit state container owns every persisted slice and the
//! active cart. All mutations are ordinary methods on it; there is no
//! global state and no raw setter for any slice.
//!
//! ## Mutation Discipline
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  caller ──► Store::operation(..)                             │
//! │               │  validate (no-op on rejection)               │
//! │               │  apply to in-memory state                    │
//! │               │  route stock changes through the ledger      │
//! │               ▼                                              │
//! │             persist()  ──► SnapshotSink (fire-and-forget)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations run synchronously to completion; each one fully applies
//! before the next is processed, so a snapshot is always consistent.

use tracing::{debug, warn};

use bodega_core::validation::{validate_exchange_rate, validate_name};
use bodega_core::{
    CashRegister, Combo, CoreError, CoreResult, Coupon, Customer, ExchangeRate, Product, Return,
    Sale, Settings, StockTransfer, Supplier, ValidationError,
};

use crate::cart::{Cart, SuspendedCart};
use crate::persist::{NullSink, SnapshotSink};

// =============================================================================
// Store
// =============================================================================

/// The transactional state engine: products, sales, cart, promotions,
/// cash registers and settings, behind one mutation surface.
pub struct Store {
    pub(crate) products: Vec<Product>,
    pub(crate) customers: Vec<Customer>,
    pub(crate) suppliers: Vec<Supplier>,
    pub(crate) coupons: Vec<Coupon>,
    pub(crate) combos: Vec<Combo>,
    pub(crate) sales: Vec<Sale>,
    pub(crate) returns: Vec<Return>,
    pub(crate) stock_transfers: Vec<StockTransfer>,
    pub(crate) cash_registers: Vec<CashRegister>,
    pub(crate) cart: Cart,
    pub(crate) suspended_carts: Vec<SuspendedCart>,
    pub(crate) settings: Settings,
    /// Monotonic sale counter; never rewound by sale deletion.
    pub(crate) sale_counter: u64,
    /// Cashier stamped into ledger entries, when known.
    pub(crate) operator: Option<String>,
    sink: Box<dyn SnapshotSink>,
}

impl Store {
    /// Creates an empty store persisting through `sink`.
    pub fn new(sink: Box<dyn SnapshotSink>) -> Self {
        Store {
            products: Vec::new(),
            customers: Vec::new(),
            suppliers: Vec::new(),
            coupons: Vec::new(),
            combos: Vec::new(),
            sales: Vec::new(),
            returns: Vec::new(),
            stock_transfers: Vec::new(),
            cash_registers: Vec::new(),
            cart: Cart::new(),
            suspended_carts: Vec::new(),
            settings: Settings::default(),
            sale_counter: 0,
            operator: None,
            sink,
        }
    }

    /// Opens a store from the sink's last snapshot (empty when none).
    ///
    /// Restart never silently drops an in-progress cart: whatever the
    /// snapshot carried, including the active cart, comes back.
    pub fn open(sink: Box<dyn SnapshotSink>) -> Result<Self, crate::persist::PersistError> {
        let snapshot = sink.load()?;
        let mut store = Store::new(sink);
        if let Some(snapshot) = snapshot {
            store.import(snapshot);
        }
        Ok(store)
    }

    /// An unpersisted store, for tests and dry runs.
    pub fn in_memory() -> Self {
        Store::new(Box::new(NullSink))
    }

    /// Rewrites the persisted snapshot. Failures are logged, never
    /// propagated: the in-memory state is already authoritative.
    pub(crate) fn persist(&self) {
        if let Err(err) = self.sink.save(&self.export()) {
            warn!(%err, "snapshot persistence failed");
        }
    }

    // =========================================================================
    // Settings surface
    // =========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Updates the USD→Bs rate and recomputes every product's derived
    /// Bs prices. Committed sales keep the rate they were frozen with;
    /// cart lines keep the rate they were added under.
    pub fn set_exchange_rate(&mut self, rate: ExchangeRate) -> CoreResult<()> {
        validate_exchange_rate(rate)?;

        self.settings.exchange_rate = rate;
        for product in &mut self.products {
            product.price_bs = product.price_usd.to_bs(rate);
            product.purchase_price_bs = product.purchase_price_usd.to_bs(rate);
        }

        debug!(rate = rate.as_float(), "exchange rate updated");
        self.persist();
        Ok(())
    }

    pub fn set_low_stock_threshold(&mut self, threshold: i64) -> CoreResult<()> {
        if threshold < 0 {
            return Err(ValidationError::OutOfRange {
                field: "low stock threshold".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        self.settings.low_stock_threshold = threshold;
        self.persist();
        Ok(())
    }

    pub fn set_store_name(&mut self, name: &str) -> CoreResult<()> {
        validate_name(name)?;
        self.settings.store_name = name.trim().to_string();
        self.persist();
        Ok(())
    }

    /// Sets the cashier stamped into subsequent ledger entries.
    pub fn set_operator(&mut self, operator: Option<String>) {
        self.operator = operator;
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn add_customer(&mut self, draft: CustomerDraft) -> CoreResult<Customer> {
        validate_name(&draft.name)?;

        let customer = Customer {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            document: draft.document,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            created_at: chrono::Utc::now(),
        };

        debug!(id = %customer.id, name = %customer.name, "customer added");
        self.customers.push(customer.clone());
        self.persist();
        Ok(customer)
    }

    pub fn update_customer(&mut self, id: &str, draft: CustomerDraft) -> CoreResult<Customer> {
        validate_name(&draft.name)?;

        let customer = self
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?;

        customer.name = draft.name.trim().to_string();
        customer.document = draft.document;
        customer.phone = draft.phone;
        customer.email = draft.email;
        customer.address = draft.address;

        let updated = customer.clone();
        self.persist();
        Ok(updated)
    }

    pub fn delete_customer(&mut self, id: &str) -> CoreResult<Customer> {
        let idx = self
            .customers
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?;

        let removed = self.customers.remove(idx);
        if self.cart.customer_id.as_deref() == Some(id) {
            self.cart.customer_id = None;
        }
        self.persist();
        Ok(removed)
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    pub fn add_supplier(&mut self, draft: SupplierDraft) -> CoreResult<Supplier> {
        validate_name(&draft.name)?;

        let supplier = Supplier {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            contact: draft.contact,
            phone: draft.phone,
            email: draft.email,
            created_at: chrono::Utc::now(),
        };

        debug!(id = %supplier.id, name = %supplier.name, "supplier added");
        self.suppliers.push(supplier.clone());
        self.persist();
        Ok(supplier)
    }

    pub fn update_supplier(&mut self, id: &str, draft: SupplierDraft) -> CoreResult<Supplier> {
        validate_name(&draft.name)?;

        let supplier = self
            .suppliers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()))?;

        supplier.name = draft.name.trim().to_string();
        supplier.contact = draft.contact;
        supplier.phone = draft.phone;
        supplier.email = draft.email;

        let updated = supplier.clone();
        self.persist();
        Ok(updated)
    }

    /// Removes a supplier. Products keep their (now dangling) supplier
    /// reference; it is not an enforced foreign key.
    pub fn delete_supplier(&mut self, id: &str) -> CoreResult<Supplier> {
        let idx = self
            .suppliers
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()))?;

        let removed = self.suppliers.remove(idx);
        self.persist();
        Ok(removed)
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// Input for creating or updating a customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Input for creating or updating a supplier.
#[derive(Debug, Clone, Default)]
pub struct SupplierDraft {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
