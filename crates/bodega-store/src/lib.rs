//! # bodega-store: Transactional State Engine for Bodega POS
//!
//! One explicit [`Store`] container models products, stock levels, the
//! active cart, suspended carts, sales, returns, promotions and cash
//! registers, and enforces the stock-accounting invariants:
//!
//! - stock never goes negative;
//! - every stock change is paired with exactly one immutable ledger
//!   entry, so `stock == Σ ledger quantities` always holds;
//! - sale reversal restores stock through the same ledger;
//! - sale numbering is monotonic and never reused.
//!
//! ## Control Flow
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  UI reads selectors (totals, stock, low-stock sets)          │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  dispatches mutation calls on Store                          │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  ledger/catalog updated synchronously                        │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  snapshot rewritten through the SnapshotSink                 │
//! │                                                              │
//! │  Cloud sync (external) calls export()/import() on the side.  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use bodega_core::{ExchangeRate, Money, Tender};
//! use bodega_store::{ProductDraft, Store};
//!
//! let mut store = Store::in_memory();
//! store.set_exchange_rate(ExchangeRate::from_float(36.5)).unwrap();
//!
//! let product = store
//!     .add_product(ProductDraft {
//!         name: "Harina PAN 1kg".to_string(),
//!         price_usd: Money::from_cents(200),
//!         stock: 10,
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! store.add_to_cart(&product.id, None).unwrap();
//! let sale = store
//!     .commit_sale(Tender::CashUsd {
//!         amount_paid: Money::from_cents(200),
//!         change: Money::zero(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(sale.total_usd.cents(), 200);
//! assert_eq!(store.product(&product.id).unwrap().stock, 9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod ledger;
pub mod persist;
pub mod promotions;
pub mod register;
pub mod sales;
pub mod snapshot;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals, SuspendedCart};
pub use catalog::{ProductDraft, ProductPatch};
pub use persist::{JsonFileSink, MemorySink, NullSink, PersistError, SnapshotSink};
pub use promotions::{ComboDraft, CouponDraft};
pub use register::TenderTotals;
pub use sales::{ReturnDraft, TransferDraft};
pub use snapshot::Snapshot;
pub use store::{CustomerDraft, Store, SupplierDraft};
