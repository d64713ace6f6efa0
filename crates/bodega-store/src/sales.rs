//! # Sale / Return Transaction Engine
//!
//! Converts the committed cart into an immutable sale record and applies
//! the matching stock debits in the same logical operation; deletion and
//! returns restore stock through the same ledger.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  1. COMMIT                                                   │
//! │     commit_sale(tender) → Sale frozen, stock debited,        │
//! │     coupon usage counted, discount cleared                   │
//! │     (cart clearing is the caller's step: ticket preview      │
//! │      happens between commit and clear)                       │
//! │                                                              │
//! │  2. (OPTIONAL) DELETE                                        │
//! │     delete_sale(id) → stock restored, sale removed,          │
//! │     sale counter NEVER rewound                               │
//! │                                                              │
//! │  3. (OPTIONAL) RETURN                                        │
//! │     add_return(..) → stock restored, Return recorded,        │
//! │     originating sale untouched                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use bodega_core::validation::{validate_quantity, validate_tender};
use bodega_core::{
    CoreError, CoreResult, Money, MovementKind, Return, ReturnItem, Sale, SaleItem, StockTransfer,
    Tender, ValidationError,
};

use crate::store::Store;

/// Formats the printable ticket string for a sale number.
fn ticket_number(sale_number: u64) -> String {
    format!("T-{:06}", sale_number)
}

// =============================================================================
// Drafts
// =============================================================================

/// Input for recording a return.
#[derive(Debug, Clone)]
pub struct ReturnDraft {
    /// The originating sale. Kept as a plain reference: the sale may
    /// have been deleted since.
    pub sale_id: String,
    pub items: Vec<ReturnItem>,
    pub reason: Option<String>,
}

/// Input for a stock transfer. Without a distinct destination product
/// the transfer is a pure decrement at the source.
#[derive(Debug, Clone, Default)]
pub struct TransferDraft {
    pub from_product_id: String,
    pub to_product_id: Option<String>,
    pub quantity: i64,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Transaction Operations
// =============================================================================

impl Store {
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    /// Sales whose date falls inside `[from, to]`.
    pub fn sales_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| s.date >= from && s.date <= to)
            .collect()
    }

    pub fn returns(&self) -> &[Return] {
        &self.returns
    }

    pub fn stock_transfers(&self) -> &[StockTransfer] {
        &self.stock_transfers
    }

    /// Commits the active cart as an immutable sale.
    ///
    /// Totals, prices and the exchange rate are frozen into the record;
    /// each line's stock is debited through the ledger with kind `sale`.
    /// Every line's product is verified up front, so the debit pass
    /// cannot fail half-way. Insufficient stock clamps rather than
    /// failing the sale.
    ///
    /// Clears the discount and coupon, NOT the cart: the caller clears
    /// the cart after its ticket preview/confirm step.
    pub fn commit_sale(&mut self, tender: Tender) -> CoreResult<Sale> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_tender(&tender)?;

        for line in &self.cart.items {
            if self.product(&line.product_id).is_none() {
                return Err(CoreError::ProductNotFound(line.product_id.clone()));
            }
        }

        let rate = self.settings.exchange_rate;
        let totals = self.cart.totals(rate);

        self.sale_counter += 1;
        let sale_number = self.sale_counter;
        let ticket = ticket_number(sale_number);

        let items: Vec<SaleItem> = self
            .cart
            .items
            .iter()
            .map(|line| SaleItem {
                product_id: line.product_id.clone(),
                name: line.name.clone(),
                unit_price_usd: line.unit_price_usd,
                unit_price_bs: line.unit_price_bs,
                quantity: line.quantity,
                notes: line.notes.clone(),
            })
            .collect();

        let customer = self
            .cart
            .customer_id
            .as_ref()
            .and_then(|id| self.customers.iter().find(|c| &c.id == id))
            .cloned();

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number,
            ticket_number: ticket.clone(),
            date: Utc::now(),
            items,
            subtotal_usd: totals.subtotal_usd,
            discount_usd: totals.discount_usd,
            total_usd: totals.total_usd,
            total_bs: totals.total_bs,
            exchange_rate: rate,
            tender,
            customer,
        };

        let debits: Vec<(String, i64)> = sale
            .items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();
        for (product_id, quantity) in debits {
            if let Err(err) = self.apply_movement(
                &product_id,
                -quantity,
                MovementKind::Sale,
                Some(format!("venta {}", ticket)),
            ) {
                // Unreachable after the existence check above; never
                // abandon a half-committed sale over a ledger entry.
                warn!(%err, %product_id, "sale debit skipped");
            }
        }

        // Coupon usage is counted at commit, nowhere else.
        if let Some(code) = self.cart.coupon_code.take() {
            if let Some(coupon) = self.coupons.iter_mut().find(|c| c.code == code) {
                coupon.usage_count += 1;
                if let Some(limit) = coupon.usage_limit {
                    if coupon.usage_count >= limit {
                        coupon.used = true;
                    }
                }
                debug!(code = %coupon.code, usage = coupon.usage_count, "coupon redeemed");
            }
        }
        self.cart.discount = None;

        debug!(
            ticket = %sale.ticket_number,
            total_usd = %sale.total_usd,
            lines = sale.items.len(),
            "sale committed"
        );
        self.sales.push(sale.clone());
        self.persist();
        Ok(sale)
    }

    /// Deletes a sale and restores each item's stock with a `return`
    /// ledger entry. The sale counter is never rewound, so sale numbers
    /// are never reused.
    pub fn delete_sale(&mut self, sale_id: &str) -> CoreResult<Sale> {
        let idx = self
            .sales
            .iter()
            .position(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        let sale = self.sales.remove(idx);
        for item in &sale.items {
            if let Err(err) = self.apply_movement(
                &item.product_id,
                item.quantity,
                MovementKind::Return,
                Some(format!("venta {} anulada", sale.ticket_number)),
            ) {
                // The product may have been hard-deleted since the sale.
                warn!(%err, product_id = %item.product_id, "stock restoration skipped");
            }
        }

        debug!(ticket = %sale.ticket_number, "sale deleted");
        self.persist();
        Ok(sale)
    }

    /// Records a return and restores stock per item through the ledger.
    ///
    /// When the referenced sale still exists, each returned quantity is
    /// checked against the quantity actually sold; the sale's totals
    /// are NOT adjusted — returns are side-ledger entries, not partial
    /// sale reversals.
    pub fn add_return(&mut self, draft: ReturnDraft) -> CoreResult<Return> {
        if draft.items.is_empty() {
            return Err(ValidationError::Required {
                field: "items".to_string(),
            }
            .into());
        }
        for item in &draft.items {
            validate_quantity(item.quantity)?;
        }

        if let Some(sale) = self.sale(&draft.sale_id) {
            for item in &draft.items {
                let sold: i64 = sale
                    .items
                    .iter()
                    .filter(|s| s.product_id == item.product_id)
                    .map(|s| s.quantity)
                    .sum();
                if item.quantity > sold {
                    return Err(ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 1,
                        max: sold,
                    }
                    .into());
                }
            }
        }

        for item in &draft.items {
            if let Err(err) = self.apply_movement(
                &item.product_id,
                item.quantity,
                MovementKind::Return,
                draft.reason.clone(),
            ) {
                warn!(%err, product_id = %item.product_id, "return restock skipped");
            }
        }

        let total_usd: Money = draft
            .items
            .iter()
            .map(|i| i.unit_price_usd.multiply_quantity(i.quantity))
            .sum();

        let record = Return {
            id: Uuid::new_v4().to_string(),
            sale_id: draft.sale_id,
            date: Utc::now(),
            items: draft.items,
            total_usd,
            reason: draft.reason,
        };

        debug!(id = %record.id, sale_id = %record.sale_id, "return recorded");
        self.returns.push(record.clone());
        self.persist();
        Ok(record)
    }

    /// Applies a stock transfer: a `transfer` decrement at the source
    /// and, only when a distinct destination product exists, a matching
    /// increment there. A same-product or destination-less transfer is
    /// recorded as a one-sided decrement.
    pub fn add_stock_transfer(&mut self, draft: TransferDraft) -> CoreResult<StockTransfer> {
        validate_quantity(draft.quantity)?;

        if self.product(&draft.from_product_id).is_none() {
            return Err(CoreError::ProductNotFound(draft.from_product_id));
        }

        let notes = draft.notes.clone().or_else(|| {
            match (&draft.from_location, &draft.to_location) {
                (Some(from), Some(to)) => Some(format!("{} → {}", from, to)),
                _ => None,
            }
        });

        let applied = self.apply_movement(
            &draft.from_product_id,
            -draft.quantity,
            MovementKind::Transfer,
            notes.clone(),
        )?;

        match &draft.to_product_id {
            Some(to) if *to != draft.from_product_id => {
                if self.product(to).is_some() {
                    // Credit exactly what the source gave up (the
                    // decrement may have been clamped).
                    self.apply_movement(to, -applied, MovementKind::Transfer, notes)?;
                } else {
                    warn!(to_product_id = %to, "transfer destination missing, decrement only");
                }
            }
            _ => {}
        }

        let record = StockTransfer {
            id: Uuid::new_v4().to_string(),
            from_product_id: draft.from_product_id,
            to_product_id: draft.to_product_id,
            quantity: draft.quantity,
            from_location: draft.from_location,
            to_location: draft.to_location,
            notes: draft.notes,
            date: Utc::now(),
        };

        debug!(id = %record.id, qty = record.quantity, "stock transfer recorded");
        self.stock_transfers.push(record.clone());
        self.persist();
        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
