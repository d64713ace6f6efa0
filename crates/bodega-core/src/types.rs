//! # Domain Types
//!
//! Core domain types for Bodega POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐     │
//! │  │   Product     │   │     Sale      │   │    Tender     │     │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │     │
//! │  │ id (UUID)     │   │ id (UUID)     │   │ Mobile        │     │
//! │  │ sku           │   │ sale_number   │   │ CashUsd       │     │
//! │  │ price_usd/bs  │   │ total_usd/bs  │   │ CashBs        │     │
//! │  │ stock+ledger  │   │ frozen rate   │   │ Multiple      │     │
//! │  └───────────────┘   └───────────────┘   └───────────────┘     │
//! │                                                                 │
//! │  Coupon · Combo · Return · StockTransfer · CashRegister         │
//! │  Customer · Supplier · Settings                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sales freeze the product name, prices and exchange rate at commit
//! time; later catalog edits or rate changes never rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Discount, ExchangeRate, Money};

// =============================================================================
// Stock Movement (ledger entry)
// =============================================================================

/// The reason a stock level changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock sold at checkout.
    Sale,
    /// Stock received from a supplier.
    Purchase,
    /// Stock restored by a return or sale deletion.
    Return,
    /// Manual correction.
    Adjustment,
    /// Moved between products/locations.
    Transfer,
    /// Opening stock when a product is created.
    Initial,
    /// Written off as damaged.
    Damage,
}

/// One immutable entry in a product's stock ledger.
///
/// ## Invariant
/// `quantity` is the delta that was actually applied; a product's stock
/// always equals the sum of its ledger quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Signed delta: positive = increase, negative = decrease.
    pub quantity: i64,
    pub kind: MovementKind,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// Who performed the operation, when known.
    pub actor: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// One entry in a product's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub price_usd: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on the ticket.
    pub name: String,

    /// Stock Keeping Unit - generated when not supplied.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Sale price in USD cents.
    pub price_usd: Money,

    /// Sale price in Bs céntimos. Derived from the exchange rate unless
    /// explicitly overridden.
    pub price_bs: Money,

    /// Purchase (cost) price in USD cents.
    pub purchase_price_usd: Money,

    /// Purchase (cost) price in Bs céntimos.
    pub purchase_price_bs: Money,

    /// Current stock level. Never negative; changed only through the
    /// stock ledger.
    pub stock: i64,

    pub category: Option<String>,

    /// Supplier reference (not an enforced foreign key).
    pub supplier_id: Option<String>,

    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,

    /// Image URL or data URI.
    pub image: Option<String>,

    /// Prior USD prices, appended on every price change.
    pub price_history: Vec<PricePoint>,

    /// Append-only stock ledger for this product.
    pub movements: Vec<StockMovement>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether stock is at or below the threshold but not empty.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock > 0 && self.stock <= threshold
    }

    /// Checks whether the product is sold out.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Checks whether the product expired before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.map(|d| d < today).unwrap_or(false)
    }

    /// Checks whether the product expires within `days` from `today`
    /// (and has not expired yet).
    pub fn expires_within(&self, today: NaiveDate, days: i64) -> bool {
        match self.expiration_date {
            Some(d) => d >= today && (d - today).num_days() <= days,
            None => false,
        }
    }
}

// =============================================================================
// Customer & Supplier
// =============================================================================

/// A customer record; sales embed a frozen copy of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Cédula / RIF.
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A supplier record, referenced by products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Tender (payment info)
// =============================================================================

/// A single method inside a split payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TenderMethod {
    Mobile,
    CashUsd,
    CashBs,
}

/// One part of a split payment. `amount` is in the currency of the
/// method: USD cents for `Mobile`/`CashUsd`, Bs céntimos for `CashBs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderPart {
    pub method: TenderMethod,
    pub amount: Money,
    /// Mobile payment reference, when applicable.
    pub reference: Option<String>,
}

/// How a sale was paid.
///
/// Modeled as a tagged union instead of an optional-field grab-bag so a
/// cash sale cannot carry a mobile reference and a mobile sale cannot
/// carry change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Tender {
    /// Pago móvil with its confirmation reference.
    Mobile { reference: String },
    /// Cash in USD; `amount_paid` is what the customer handed over.
    CashUsd { amount_paid: Money, change: Money },
    /// Cash in bolívars.
    CashBs { amount_paid: Money, change: Money },
    /// Split across several methods.
    Multiple { payments: Vec<TenderPart> },
}

// =============================================================================
// Sale
// =============================================================================

/// A line item inside a sale, frozen at commit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub product_id: String,
    /// Name at time of sale (frozen).
    pub name: String,
    /// Unit price in USD cents at time of sale (frozen).
    pub unit_price_usd: Money,
    /// Unit price in Bs céntimos at time of sale (frozen).
    pub unit_price_bs: Money,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl SaleItem {
    /// Line total in USD.
    #[inline]
    pub fn line_total_usd(&self) -> Money {
        self.unit_price_usd.multiply_quantity(self.quantity)
    }
}

/// An immutable record of a committed, priced, paid transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Monotonic counter; never reused, even after deletions.
    pub sale_number: u64,
    /// Formatted ticket string derived from the sale number.
    pub ticket_number: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub items: Vec<SaleItem>,
    pub subtotal_usd: Money,
    pub discount_usd: Money,
    pub total_usd: Money,
    pub total_bs: Money,
    /// Exchange rate frozen at commit time.
    pub exchange_rate: ExchangeRate,
    pub tender: Tender,
    /// Customer snapshot; survives customer deletion.
    pub customer: Option<Customer>,
}

// =============================================================================
// Return
// =============================================================================

/// A returned line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_usd: Money,
}

/// A recorded return. Restores stock through the ledger; the
/// originating sale's totals are not rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Return {
    pub id: String,
    /// Reference to the originating sale (not an enforced foreign key).
    pub sale_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub items: Vec<ReturnItem>,
    pub total_usd: Money,
    pub reason: Option<String>,
}

// =============================================================================
// Coupon & Combo
// =============================================================================

/// A discount coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: String,
    /// Unique code, stored uppercase, matched case-insensitively.
    pub code: String,
    pub discount: Discount,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Maximum redemptions; `None` = unlimited.
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    /// Hard kill-switch, set once the usage limit is exhausted.
    pub used: bool,
}

impl Coupon {
    /// Checks redeemability at `now`: not killed, not expired, under its
    /// usage limit.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        if self.used {
            return false;
        }
        if let Some(expiry) = self.expiry_date {
            if expiry <= now {
                return false;
            }
        }
        match self.usage_limit {
            Some(limit) => self.usage_count < limit,
            None => true,
        }
    }
}

/// One product line inside a combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComboLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A named bundle of catalog products sold at a bundle price, usually
/// below the sum of its lines. Expands into individual cart lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Combo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub products: Vec<ComboLine>,
    pub price_usd: Money,
    pub active: bool,
}

// =============================================================================
// Cash Register (shift)
// =============================================================================

/// A cash-register shift: a bounded window over which collected cash is
/// reconciled against a physically counted amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashRegister {
    pub id: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub initial_cash_usd: Money,
    pub initial_cash_bs: Money,
    pub closed: bool,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Physically counted at close.
    pub final_cash_usd: Option<Money>,
    pub final_cash_bs: Option<Money>,
    /// Counted − expected; informational, never blocks closing.
    pub difference_usd: Option<Money>,
    pub difference_bs: Option<Money>,
    pub sales_count: u32,
    pub total_usd: Money,
    pub total_bs: Money,
}

// =============================================================================
// Stock Transfer
// =============================================================================

/// A stock movement between products/locations.
///
/// When the destination product is missing or equals the source, the
/// transfer degenerates into a pure decrement at the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockTransfer {
    pub id: String,
    pub from_product_id: String,
    pub to_product_id: Option<String>,
    pub quantity: i64,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
}

// =============================================================================
// Settings
// =============================================================================

/// Settings consumed by the store core. Printer, sound and layout
/// settings belong to the excluded UI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub store_name: String,
    /// Stock at or below this (and above zero) counts as low.
    pub low_stock_threshold: i64,
    /// USD → Bs multiplier applied at price-computation time; sales
    /// freeze the rate they were committed under.
    pub exchange_rate: ExchangeRate,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store_name: "La Bodeguita".to_string(),
            low_stock_threshold: crate::DEFAULT_LOW_STOCK_THRESHOLD,
            exchange_rate: ExchangeRate::default(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
