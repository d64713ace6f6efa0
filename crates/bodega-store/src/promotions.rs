//! # Promotions Subsystem
//!
//! Coupon validation/redemption and combo expansion.
//!
//! Validation never mutates: usage accounting happens exactly once, at
//! sale commit. A combo is sugar over repeated `add_to_cart` calls with
//! proportionally scaled unit prices, so the bundle discount lives in
//! the line prices rather than as a separate discount line.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use bodega_core::validation::{validate_coupon_code, validate_name, validate_price, validate_quantity};
use bodega_core::{
    Combo, ComboLine, CoreError, CoreResult, Coupon, Discount, Money, ValidationError,
};

use crate::store::Store;

// =============================================================================
// Drafts
// =============================================================================

/// Input for creating a coupon.
#[derive(Debug, Clone)]
pub struct CouponDraft {
    pub code: String,
    pub discount: Discount,
    pub expiry_date: Option<DateTime<Utc>>,
    pub usage_limit: Option<u32>,
}

/// Input for creating a combo.
#[derive(Debug, Clone)]
pub struct ComboDraft {
    pub name: String,
    pub description: Option<String>,
    pub products: Vec<ComboLine>,
    pub price_usd: Money,
}

// =============================================================================
// Coupons
// =============================================================================

impl Store {
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn add_coupon(&mut self, draft: CouponDraft) -> CoreResult<Coupon> {
        let code = validate_coupon_code(&draft.code)?;
        if self.coupons.iter().any(|c| c.code == code) {
            return Err(ValidationError::Duplicate {
                field: "code".to_string(),
                value: code,
            }
            .into());
        }

        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code,
            discount: draft.discount,
            expiry_date: draft.expiry_date,
            usage_limit: draft.usage_limit,
            usage_count: 0,
            used: false,
        };

        debug!(code = %coupon.code, "coupon added");
        self.coupons.push(coupon.clone());
        self.persist();
        Ok(coupon)
    }

    pub fn delete_coupon(&mut self, id: &str) -> CoreResult<Coupon> {
        let idx = self
            .coupons
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::CouponNotFound(id.to_string()))?;

        let removed = self.coupons.remove(idx);
        self.persist();
        Ok(removed)
    }

    /// Looks up a redeemable coupon by code: case-insensitive, not yet
    /// consumed, not expired, under its usage limit. Read-only — usage
    /// is counted at sale commit.
    pub fn validate_coupon(&self, code: &str) -> Option<&Coupon> {
        let code = code.trim();
        let now = Utc::now();
        self.coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code) && c.is_redeemable(now))
    }

    /// Applies a coupon's discount to the cart and remembers the code,
    /// so the commit step can count the redemption.
    pub fn apply_coupon(&mut self, code: &str) -> CoreResult<Discount> {
        let (canonical, discount) = self
            .validate_coupon(code)
            .map(|c| (c.code.clone(), c.discount))
            .ok_or_else(|| CoreError::CouponRejected {
                code: code.to_string(),
            })?;

        self.cart.discount = Some(discount);
        self.cart.coupon_code = Some(canonical);
        self.persist();
        Ok(discount)
    }
}

// =============================================================================
// Combos
// =============================================================================

impl Store {
    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    pub fn add_combo(&mut self, draft: ComboDraft) -> CoreResult<Combo> {
        validate_name(&draft.name)?;
        validate_price(draft.price_usd)?;
        if draft.products.is_empty() {
            return Err(ValidationError::Required {
                field: "products".to_string(),
            }
            .into());
        }
        for line in &draft.products {
            validate_quantity(line.quantity)?;
            if self.product(&line.product_id).is_none() {
                return Err(CoreError::ProductNotFound(line.product_id.clone()));
            }
        }

        let combo = Combo {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            products: draft.products,
            price_usd: draft.price_usd,
            active: true,
        };

        debug!(id = %combo.id, name = %combo.name, "combo added");
        self.combos.push(combo.clone());
        self.persist();
        Ok(combo)
    }

    pub fn set_combo_active(&mut self, id: &str, active: bool) -> CoreResult<()> {
        let combo = self
            .combos
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::ComboNotFound(id.to_string()))?;

        combo.active = active;
        self.persist();
        Ok(())
    }

    pub fn delete_combo(&mut self, id: &str) -> CoreResult<Combo> {
        let idx = self
            .combos
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::ComboNotFound(id.to_string()))?;

        let removed = self.combos.remove(idx);
        self.persist();
        Ok(removed)
    }

    /// Expands a combo into the cart: one `add_to_cart` per unit per
    /// product, at unit prices scaled so the lines sum to (about) the
    /// bundle price. Integer rounding may leave the sum a cent or two
    /// off the bundle price on uneven splits.
    ///
    /// Stock checks are the cart's own: if a line runs out of stock
    /// mid-expansion, the units added so far stay in the cart and the
    /// error is returned.
    pub fn add_combo_to_cart(&mut self, combo_id: &str) -> CoreResult<()> {
        let combo = self
            .combos
            .iter()
            .find(|c| c.id == combo_id)
            .ok_or_else(|| CoreError::ComboNotFound(combo_id.to_string()))?;
        if !combo.active {
            return Err(CoreError::ComboInactive(combo_id.to_string()));
        }
        let lines = combo.products.clone();
        let bundle_price = combo.price_usd;

        // Catalog value of the bundle, for proportional scaling.
        let mut catalog_total = Money::zero();
        for line in &lines {
            let product = self
                .product(&line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;
            catalog_total += product.price_usd.multiply_quantity(line.quantity);
        }

        for line in &lines {
            let catalog_price = self
                .product(&line.product_id)
                .map(|p| p.price_usd)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            let unit_price = if catalog_total.is_positive() {
                let total = catalog_total.cents() as i128;
                let scaled =
                    (catalog_price.cents() as i128 * bundle_price.cents() as i128 + total / 2)
                        / total;
                Money::from_cents(scaled as i64)
            } else {
                Money::zero()
            };

            for _ in 0..line.quantity {
                self.add_to_cart(&line.product_id, Some(unit_price))?;
            }
        }

        debug!(combo_id, "combo expanded into cart");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
