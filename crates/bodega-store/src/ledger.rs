//! # Stock Ledger
//!
//! The single path by which stock levels change. Every stock-affecting
//! operation (sale, return, transfer, manual adjustment, opening stock)
//! routes through [`Store::record_movement`]; the stock field and its
//! ledger entry are written in the same call, so they cannot drift.
//!
//! ## Invariant
//! For every product, `stock == Σ movement.quantity` at all times, and
//! stock never goes negative: a decrease larger than the current stock
//! is clamped, and the ledger records the delta actually applied.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use bodega_core::{CoreError, CoreResult, MovementKind, StockMovement};

use crate::store::Store;

impl Store {
    /// Applies a signed stock change and appends the matching ledger
    /// entry. Returns the delta actually applied (clamped so stock
    /// never drops below zero).
    pub fn record_movement(
        &mut self,
        product_id: &str,
        quantity: i64,
        kind: MovementKind,
        notes: Option<String>,
    ) -> CoreResult<i64> {
        let applied = self.apply_movement(product_id, quantity, kind, notes)?;
        self.persist();
        Ok(applied)
    }

    /// Manual stock correction, recorded with kind `adjustment`.
    pub fn adjust_stock(
        &mut self,
        product_id: &str,
        quantity: i64,
        notes: Option<String>,
    ) -> CoreResult<i64> {
        self.record_movement(product_id, quantity, MovementKind::Adjustment, notes)
    }

    /// Ledger core, shared by every stock-changing operation. Does NOT
    /// persist; multi-step operations (sale commit, transfer) persist
    /// once at the end.
    pub(crate) fn apply_movement(
        &mut self,
        product_id: &str,
        quantity: i64,
        kind: MovementKind,
        notes: Option<String>,
    ) -> CoreResult<i64> {
        let actor = self.operator.clone();
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        // Clamp: stock never goes negative.
        let applied = if quantity < 0 {
            quantity.max(-product.stock)
        } else {
            quantity
        };

        if applied != quantity {
            warn!(
                product = %product.name,
                requested = quantity,
                applied,
                "stock decrease clamped at zero"
            );
        }

        let now = Utc::now();
        product.stock += applied;
        product.movements.push(StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            quantity: applied,
            kind,
            notes,
            date: now,
            actor,
        });
        product.updated_at = now;

        debug!(
            product = %product.name,
            delta = applied,
            stock = product.stock,
            ?kind,
            "stock movement recorded"
        );

        Ok(applied)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
