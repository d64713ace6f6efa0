//! # Product Catalog
//!
//! CRUD over product records plus the derived stock/expiry reads the
//! dashboard consumes. Stock itself is owned by the ledger: catalog
//! operations never write `stock` directly — starting stock enters
//! through an `initial` ledger entry.

use chrono::{NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use bodega_core::validation::{validate_name, validate_price, validate_sku};
use bodega_core::{
    CoreError, CoreResult, Money, MovementKind, PricePoint, Product, ValidationError,
    EXPIRY_WINDOW_DAYS,
};

use crate::store::Store;

// =============================================================================
// Drafts
// =============================================================================

/// Input for creating a product. Omitted prices derive from the USD
/// price at the current exchange rate; an omitted SKU is generated.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price_usd: Money,
    /// Explicit Bs price override; derived when absent.
    pub price_bs: Option<Money>,
    pub purchase_price_usd: Money,
    pub purchase_price_bs: Option<Money>,
    /// Opening stock, seeded through an `initial` ledger entry.
    pub stock: i64,
    pub category: Option<String>,
    pub supplier_id: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub image: Option<String>,
}

/// Partial update; `None` fields are left unchanged. Stock is absent on
/// purpose — stock only moves through the ledger.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub price_usd: Option<Money>,
    /// Explicit Bs override; when `price_usd` changes without one, the
    /// Bs price is recomputed from the exchange rate.
    pub price_bs: Option<Money>,
    pub purchase_price_usd: Option<Money>,
    pub purchase_price_bs: Option<Money>,
    pub category: Option<String>,
    pub supplier_id: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub image: Option<String>,
}

// =============================================================================
// Catalog Operations
// =============================================================================

impl Store {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Adds a product. Opening stock > 0 is recorded as an `initial`
    /// ledger entry, so the ledger fully accounts for the stock level
    /// from day one.
    pub fn add_product(&mut self, draft: ProductDraft) -> CoreResult<Product> {
        validate_name(&draft.name)?;
        validate_price(draft.price_usd)?;
        validate_price(draft.purchase_price_usd)?;
        if draft.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let sku = match draft.sku {
            Some(sku) => {
                validate_sku(&sku)?;
                let sku = sku.trim().to_string();
                if self
                    .products
                    .iter()
                    .any(|p| p.sku.eq_ignore_ascii_case(&sku))
                {
                    return Err(ValidationError::Duplicate {
                        field: "sku".to_string(),
                        value: sku,
                    }
                    .into());
                }
                sku
            }
            None => self.generate_sku(),
        };

        let rate = self.settings.exchange_rate;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            sku,
            barcode: draft.barcode,
            price_usd: draft.price_usd,
            price_bs: draft.price_bs.unwrap_or_else(|| draft.price_usd.to_bs(rate)),
            purchase_price_usd: draft.purchase_price_usd,
            purchase_price_bs: draft
                .purchase_price_bs
                .unwrap_or_else(|| draft.purchase_price_usd.to_bs(rate)),
            stock: 0,
            category: draft.category,
            supplier_id: draft.supplier_id,
            expiration_date: draft.expiration_date,
            image: draft.image,
            price_history: Vec::new(),
            movements: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, sku = %product.sku, name = %product.name, "product added");
        let id = product.id.clone();
        self.products.push(product);

        if draft.stock > 0 {
            self.apply_movement(&id, draft.stock, MovementKind::Initial, None)?;
        }

        let created = self
            .product(&id)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(id))?;
        self.persist();
        Ok(created)
    }

    /// Updates a product. A USD price change appends the prior price to
    /// the history and re-derives the Bs price unless the patch carries
    /// an explicit override.
    pub fn update_product(&mut self, id: &str, patch: ProductPatch) -> CoreResult<Product> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(price) = patch.price_usd {
            validate_price(price)?;
        }
        if let Some(price) = patch.purchase_price_usd {
            validate_price(price)?;
        }

        let rate = self.settings.exchange_rate;
        let now = Utc::now();
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            product.name = name.trim().to_string();
        }
        if let Some(barcode) = patch.barcode {
            product.barcode = Some(barcode);
        }
        if let Some(price_usd) = patch.price_usd {
            if price_usd != product.price_usd {
                product.price_history.push(PricePoint {
                    price_usd: product.price_usd,
                    date: now,
                });
                product.price_usd = price_usd;
                product.price_bs = patch.price_bs.unwrap_or_else(|| price_usd.to_bs(rate));
            } else if let Some(price_bs) = patch.price_bs {
                product.price_bs = price_bs;
            }
        } else if let Some(price_bs) = patch.price_bs {
            product.price_bs = price_bs;
        }
        if let Some(purchase_usd) = patch.purchase_price_usd {
            product.purchase_price_usd = purchase_usd;
            product.purchase_price_bs = patch
                .purchase_price_bs
                .unwrap_or_else(|| purchase_usd.to_bs(rate));
        } else if let Some(purchase_bs) = patch.purchase_price_bs {
            product.purchase_price_bs = purchase_bs;
        }
        if let Some(category) = patch.category {
            product.category = Some(category);
        }
        if let Some(supplier_id) = patch.supplier_id {
            product.supplier_id = Some(supplier_id);
        }
        if let Some(expiration) = patch.expiration_date {
            product.expiration_date = Some(expiration);
        }
        if let Some(image) = patch.image {
            product.image = Some(image);
        }
        product.updated_at = now;

        let updated = product.clone();
        debug!(id = %updated.id, "product updated");
        self.persist();
        Ok(updated)
    }

    /// Hard removal. Committed sales keep their frozen item snapshots;
    /// any active-cart line for the product is dropped with it.
    pub fn delete_product(&mut self, id: &str) -> CoreResult<Product> {
        let idx = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        let removed = self.products.remove(idx);
        self.cart.items.retain(|item| item.product_id != id);

        debug!(id = %removed.id, sku = %removed.sku, "product deleted");
        self.persist();
        Ok(removed)
    }

    /// Clones a product under a fresh id and generated SKU. The barcode
    /// is blanked to avoid scan collisions; history and ledger start
    /// over, with current stock re-seeded as an `initial` entry.
    pub fn duplicate_product(&mut self, id: &str) -> CoreResult<Product> {
        let source = self
            .products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?
            .clone();

        let now = Utc::now();
        let copy = Product {
            id: Uuid::new_v4().to_string(),
            sku: self.generate_sku(),
            barcode: None,
            stock: 0,
            price_history: Vec::new(),
            movements: Vec::new(),
            created_at: now,
            updated_at: now,
            ..source.clone()
        };

        debug!(source = %source.sku, copy = %copy.sku, "product duplicated");
        let copy_id = copy.id.clone();
        self.products.push(copy);

        if source.stock > 0 {
            self.apply_movement(
                &copy_id,
                source.stock,
                MovementKind::Initial,
                Some(format!("duplicate of {}", source.sku)),
            )?;
        }

        let created = self
            .product(&copy_id)
            .cloned()
            .ok_or_else(|| CoreError::ProductNotFound(copy_id))?;
        self.persist();
        Ok(created)
    }

    // =========================================================================
    // Derived reads
    // =========================================================================

    /// Products with stock above zero but at or below the threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        let threshold = self.settings.low_stock_threshold;
        self.products
            .iter()
            .filter(|p| p.is_low_stock(threshold))
            .collect()
    }

    pub fn out_of_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_out_of_stock()).collect()
    }

    /// Products expiring within the next week (not yet expired).
    pub fn expiring_soon(&self) -> Vec<&Product> {
        let today = Utc::now().date_naive();
        self.products
            .iter()
            .filter(|p| p.expires_within(today, EXPIRY_WINDOW_DAYS))
            .collect()
    }

    pub fn expired(&self) -> Vec<&Product> {
        let today = Utc::now().date_naive();
        self.products.iter().filter(|p| p.is_expired(today)).collect()
    }

    /// Case-insensitive substring search over name, SKU and barcode.
    pub fn search_products(&self, query: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.products.iter().collect();
        }

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.sku.to_lowercase().contains(&query)
                    || p.barcode
                        .as_deref()
                        .map(|b| b.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    fn generate_sku(&self) -> String {
        loop {
            let candidate = format!(
                "SKU-{}",
                &Uuid::new_v4().simple().to_string()[..8].to_uppercase()
            );
            if !self.products.iter().any(|p| p.sku == candidate) {
                return candidate;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::ExchangeRate;
    use chrono::Duration;

    fn store() -> Store {
        let mut store = Store::in_memory();
        store
            .set_exchange_rate(ExchangeRate::from_millis(36_500))
            .unwrap();
        store
    }

    #[test]
    fn test_add_product_derives_bs_price_and_seeds_initial_entry() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Azúcar 1kg".to_string(),
                price_usd: Money::from_cents(200),
                stock: 10,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.price_bs.cents(), 7_300);
        assert_eq!(product.stock, 10);
        assert_eq!(product.movements.len(), 1);
        assert_eq!(product.movements[0].kind, MovementKind::Initial);
        assert_eq!(product.movements[0].quantity, 10);
        assert!(product.sku.starts_with("SKU-"));
    }

    #[test]
    fn test_add_product_zero_stock_has_empty_ledger() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Aceite".to_string(),
                price_usd: Money::from_cents(450),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.stock, 0);
        assert!(product.movements.is_empty());
    }

    #[test]
    fn test_add_product_rejects_duplicate_sku() {
        let mut store = store();
        store
            .add_product(ProductDraft {
                name: "Uno".to_string(),
                sku: Some("REP-1".to_string()),
                price_usd: Money::from_cents(100),
                ..Default::default()
            })
            .unwrap();

        let err = store
            .add_product(ProductDraft {
                name: "Dos".to_string(),
                sku: Some("rep-1".to_string()),
                price_usd: Money::from_cents(100),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Duplicate { .. })));
    }

    #[test]
    fn test_update_price_tracks_history_and_recomputes_bs() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Café 250g".to_string(),
                price_usd: Money::from_cents(300),
                stock: 1,
                ..Default::default()
            })
            .unwrap();

        let updated = store
            .update_product(
                &product.id,
                ProductPatch {
                    price_usd: Some(Money::from_cents(350)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.price_usd.cents(), 350);
        assert_eq!(updated.price_bs.cents(), Money::from_cents(350).to_bs(store.settings().exchange_rate).cents());
        assert_eq!(updated.price_history.len(), 1);
        assert_eq!(updated.price_history[0].price_usd.cents(), 300);
    }

    #[test]
    fn test_update_same_price_does_not_touch_history() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Café".to_string(),
                price_usd: Money::from_cents(300),
                ..Default::default()
            })
            .unwrap();

        let updated = store
            .update_product(
                &product.id,
                ProductPatch {
                    price_usd: Some(Money::from_cents(300)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.price_history.is_empty());
    }

    #[test]
    fn test_explicit_bs_override_survives_update() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Pan".to_string(),
                price_usd: Money::from_cents(100),
                price_bs: Some(Money::from_cents(4_000)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(product.price_bs.cents(), 4_000);

        let updated = store
            .update_product(
                &product.id,
                ProductPatch {
                    price_usd: Some(Money::from_cents(120)),
                    price_bs: Some(Money::from_cents(4_500)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price_bs.cents(), 4_500);
    }

    #[test]
    fn test_duplicate_blanks_barcode_and_resets_history() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Galletas".to_string(),
                sku: Some("GAL-1".to_string()),
                barcode: Some("7591234567890".to_string()),
                price_usd: Money::from_cents(175),
                stock: 6,
                ..Default::default()
            })
            .unwrap();

        let copy = store.duplicate_product(&product.id).unwrap();

        assert_ne!(copy.id, product.id);
        assert_ne!(copy.sku, product.sku);
        assert!(copy.barcode.is_none());
        assert_eq!(copy.name, product.name);
        assert_eq!(copy.stock, 6);
        assert!(copy.price_history.is_empty());
        // Fresh ledger: just the re-seeded initial entry.
        assert_eq!(copy.movements.len(), 1);
        assert_eq!(copy.movements[0].kind, MovementKind::Initial);
    }

    #[test]
    fn test_delete_product_drops_cart_line() {
        let mut store = store();
        let product = store
            .add_product(ProductDraft {
                name: "Jugo".to_string(),
                price_usd: Money::from_cents(250),
                stock: 4,
                ..Default::default()
            })
            .unwrap();
        store.add_to_cart(&product.id, None).unwrap();

        store.delete_product(&product.id).unwrap();

        assert!(store.product(&product.id).is_none());
        assert!(store.cart().items.is_empty());
    }

    #[test]
    fn test_stock_classification_sets() {
        let mut store = store();
        store.set_low_stock_threshold(5).unwrap();

        let low = store
            .add_product(ProductDraft {
                name: "Bajo".to_string(),
                price_usd: Money::from_cents(100),
                stock: 3,
                ..Default::default()
            })
            .unwrap();
        let out = store
            .add_product(ProductDraft {
                name: "Agotado".to_string(),
                price_usd: Money::from_cents(100),
                ..Default::default()
            })
            .unwrap();
        store
            .add_product(ProductDraft {
                name: "Sano".to_string(),
                price_usd: Money::from_cents(100),
                stock: 50,
                ..Default::default()
            })
            .unwrap();

        let low_ids: Vec<_> = store.low_stock().iter().map(|p| p.id.clone()).collect();
        assert_eq!(low_ids, vec![low.id]);

        let out_ids: Vec<_> = store.out_of_stock().iter().map(|p| p.id.clone()).collect();
        assert_eq!(out_ids, vec![out.id]);
    }

    #[test]
    fn test_expiry_sets() {
        let mut store = store();
        let today = Utc::now().date_naive();

        store
            .add_product(ProductDraft {
                name: "Yogur".to_string(),
                price_usd: Money::from_cents(100),
                stock: 1,
                expiration_date: Some(today + Duration::days(3)),
                ..Default::default()
            })
            .unwrap();
        store
            .add_product(ProductDraft {
                name: "Queso".to_string(),
                price_usd: Money::from_cents(100),
                stock: 1,
                expiration_date: Some(today - Duration::days(1)),
                ..Default::default()
            })
            .unwrap();
        store
            .add_product(ProductDraft {
                name: "Lejía".to_string(),
                price_usd: Money::from_cents(100),
                stock: 1,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(store.expiring_soon().len(), 1);
        assert_eq!(store.expiring_soon()[0].name, "Yogur");
        assert_eq!(store.expired().len(), 1);
        assert_eq!(store.expired()[0].name, "Queso");
    }

    #[test]
    fn test_search_products() {
        let mut store = store();
        store
            .add_product(ProductDraft {
                name: "Harina PAN".to_string(),
                sku: Some("HAR-1".to_string()),
                barcode: Some("759000111".to_string()),
                price_usd: Money::from_cents(150),
                ..Default::default()
            })
            .unwrap();
        store
            .add_product(ProductDraft {
                name: "Margarina".to_string(),
                sku: Some("MAR-1".to_string()),
                price_usd: Money::from_cents(220),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(store.search_products("harina").len(), 1);
        assert_eq!(store.search_products("HAR-1").len(), 1);
        assert_eq!(store.search_products("759000").len(), 1);
        // "ar" hits Harina, HAR-1 and Margarina
        assert_eq!(store.search_products("ar").len(), 2);
        assert_eq!(store.search_products("").len(), 2);
        assert!(store.search_products("zzz").is_empty());
    }
}
