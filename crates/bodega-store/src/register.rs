//! # Cash Register Reconciliation
//!
//! A register is a shift window: opened with counted starting cash,
//! closed against physically counted cash. On close, sales inside the
//! window are aggregated by tender into cash-USD, cash-Bs and mobile
//! buckets; variance = counted − expected, informational only.
//!
//! At most one unclosed register exists at a time; the store enforces
//! it, not the UI.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use bodega_core::validation::validate_cash_amount;
use bodega_core::{CashRegister, CoreError, CoreResult, Money, Sale, Tender, TenderMethod};

use crate::store::Store;

// =============================================================================
// Tender Aggregation
// =============================================================================

/// Amounts collected inside a register window, bucketed by tender.
/// `cash_usd` and `mobile_usd` are USD cents; `cash_bs` is Bs céntimos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderTotals {
    pub cash_usd: Money,
    pub cash_bs: Money,
    pub mobile_usd: Money,
}

impl TenderTotals {
    /// Buckets one sale's collected amounts. Single-method sales
    /// contribute their full total in that method's currency; split
    /// tenders contribute each part as recorded.
    fn absorb(&mut self, sale: &Sale) {
        match &sale.tender {
            Tender::Mobile { .. } => self.mobile_usd += sale.total_usd,
            Tender::CashUsd { .. } => self.cash_usd += sale.total_usd,
            Tender::CashBs { .. } => self.cash_bs += sale.total_bs,
            Tender::Multiple { payments } => {
                for part in payments {
                    match part.method {
                        TenderMethod::Mobile => self.mobile_usd += part.amount,
                        TenderMethod::CashUsd => self.cash_usd += part.amount,
                        TenderMethod::CashBs => self.cash_bs += part.amount,
                    }
                }
            }
        }
    }
}

// =============================================================================
// Register Operations
// =============================================================================

impl Store {
    pub fn cash_registers(&self) -> &[CashRegister] {
        &self.cash_registers
    }

    /// The unclosed register, if a shift is running.
    pub fn current_register(&self) -> Option<&CashRegister> {
        self.cash_registers.iter().find(|r| !r.closed)
    }

    /// Opens a shift. Rejected while another register is unclosed.
    pub fn open_register(
        &mut self,
        initial_cash_usd: Money,
        initial_cash_bs: Money,
    ) -> CoreResult<CashRegister> {
        validate_cash_amount(initial_cash_usd)?;
        validate_cash_amount(initial_cash_bs)?;

        if let Some(open) = self.current_register() {
            return Err(CoreError::RegisterAlreadyOpen(open.id.clone()));
        }

        let register = CashRegister {
            id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            initial_cash_usd,
            initial_cash_bs,
            closed: false,
            closed_at: None,
            final_cash_usd: None,
            final_cash_bs: None,
            difference_usd: None,
            difference_bs: None,
            sales_count: 0,
            total_usd: Money::zero(),
            total_bs: Money::zero(),
        };

        debug!(id = %register.id, "cash register opened");
        self.cash_registers.push(register.clone());
        self.persist();
        Ok(register)
    }

    /// Closes the open shift against physically counted cash.
    ///
    /// Expected cash per currency = initial + collected cash of that
    /// currency within `[opened_at, closed_at]`. The variance never
    /// blocks closing.
    pub fn close_register(
        &mut self,
        counted_cash_usd: Money,
        counted_cash_bs: Money,
    ) -> CoreResult<CashRegister> {
        validate_cash_amount(counted_cash_usd)?;
        validate_cash_amount(counted_cash_bs)?;

        let idx = self
            .cash_registers
            .iter()
            .position(|r| !r.closed)
            .ok_or(CoreError::NoOpenRegister)?;

        let closed_at = Utc::now();
        let opened_at = self.cash_registers[idx].opened_at;

        let window: Vec<&Sale> = self
            .sales
            .iter()
            .filter(|s| s.date >= opened_at && s.date <= closed_at)
            .collect();

        let mut collected = TenderTotals::default();
        let mut total_usd = Money::zero();
        let mut total_bs = Money::zero();
        for sale in &window {
            collected.absorb(sale);
            total_usd += sale.total_usd;
            total_bs += sale.total_bs;
        }
        let sales_count = window.len() as u32;

        let register = &mut self.cash_registers[idx];
        let expected_usd = register.initial_cash_usd + collected.cash_usd;
        let expected_bs = register.initial_cash_bs + collected.cash_bs;

        register.closed = true;
        register.closed_at = Some(closed_at);
        register.final_cash_usd = Some(counted_cash_usd);
        register.final_cash_bs = Some(counted_cash_bs);
        register.difference_usd = Some(counted_cash_usd - expected_usd);
        register.difference_bs = Some(counted_cash_bs - expected_bs);
        register.sales_count = sales_count;
        register.total_usd = total_usd;
        register.total_bs = total_bs;

        let closed = register.clone();
        debug!(
            id = %closed.id,
            sales = closed.sales_count,
            diff_usd = %closed.difference_usd.unwrap_or_else(Money::zero),
            "cash register closed"
        );
        self.persist();
        Ok(closed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductDraft;
    use bodega_core::{ExchangeRate, TenderPart};

    fn store_with_product(price_cents: i64, stock: i64) -> (Store, String) {
        let mut store = Store::in_memory();
        store
            .set_exchange_rate(ExchangeRate::from_millis(36_500))
            .unwrap();
        let id = store
            .add_product(ProductDraft {
                name: "Harina".to_string(),
                price_usd: Money::from_cents(price_cents),
                stock,
                ..Default::default()
            })
            .unwrap()
            .id;
        (store, id)
    }

    fn sell(store: &mut Store, product_id: &str, units: usize, tender: Tender) -> Sale {
        for _ in 0..units {
            store.add_to_cart(product_id, None).unwrap();
        }
        let sale = store.commit_sale(tender).unwrap();
        store.clear_cart();
        sale
    }

    #[test]
    fn test_only_one_open_register() {
        let mut store = Store::in_memory();
        store
            .open_register(Money::from_cents(5_000), Money::zero())
            .unwrap();

        assert!(matches!(
            store.open_register(Money::zero(), Money::zero()),
            Err(CoreError::RegisterAlreadyOpen(_))
        ));

        store.close_register(Money::from_cents(5_000), Money::zero()).unwrap();
        // A new shift can start once the previous one closed.
        assert!(store.open_register(Money::zero(), Money::zero()).is_ok());
    }

    #[test]
    fn test_close_without_open_register_is_rejected() {
        let mut store = Store::in_memory();
        assert!(matches!(
            store.close_register(Money::zero(), Money::zero()),
            Err(CoreError::NoOpenRegister)
        ));
    }

    #[test]
    fn test_close_aggregates_window_sales_by_tender() {
        let (mut store, id) = store_with_product(200, 50);
        store
            .open_register(Money::from_cents(1_000), Money::from_cents(50_000))
            .unwrap();

        // $4.00 cash USD
        sell(
            &mut store,
            &id,
            2,
            Tender::CashUsd {
                amount_paid: Money::from_cents(500),
                change: Money::from_cents(100),
            },
        );
        // $2.00 → Bs 73.00 cash Bs
        sell(
            &mut store,
            &id,
            1,
            Tender::CashBs {
                amount_paid: Money::from_cents(7_300),
                change: Money::zero(),
            },
        );
        // $2.00 mobile
        sell(
            &mut store,
            &id,
            1,
            Tender::Mobile {
                reference: "0412-777".to_string(),
            },
        );

        let register = store
            .close_register(Money::from_cents(1_400), Money::from_cents(57_300))
            .unwrap();

        assert_eq!(register.sales_count, 3);
        assert_eq!(register.total_usd.cents(), 800);
        // Expected USD cash: 1000 initial + 400 collected = 1400 → no variance.
        assert_eq!(register.difference_usd.unwrap().cents(), 0);
        // Expected Bs cash: 50000 + 7300 = 57300 → no variance.
        assert_eq!(register.difference_bs.unwrap().cents(), 0);
    }

    #[test]
    fn test_close_reports_shortage_as_negative_variance() {
        let (mut store, id) = store_with_product(200, 10);
        store.open_register(Money::zero(), Money::zero()).unwrap();

        sell(
            &mut store,
            &id,
            1,
            Tender::CashUsd {
                amount_paid: Money::from_cents(200),
                change: Money::zero(),
            },
        );

        // Drawer should hold $2.00; only $1.50 counted.
        let register = store
            .close_register(Money::from_cents(150), Money::zero())
            .unwrap();
        assert_eq!(register.difference_usd.unwrap().cents(), -50);
    }

    #[test]
    fn test_split_tender_contributes_per_part() {
        let (mut store, id) = store_with_product(1_000, 10);
        store.open_register(Money::zero(), Money::zero()).unwrap();

        // $10.00 split: $6.00 cash USD + Bs 146.00 (= $4.00) cash Bs
        sell(
            &mut store,
            &id,
            1,
            Tender::Multiple {
                payments: vec![
                    TenderPart {
                        method: TenderMethod::CashUsd,
                        amount: Money::from_cents(600),
                        reference: None,
                    },
                    TenderPart {
                        method: TenderMethod::CashBs,
                        amount: Money::from_cents(14_600),
                        reference: None,
                    },
                ],
            },
        );

        let register = store
            .close_register(Money::from_cents(600), Money::from_cents(14_600))
            .unwrap();
        assert_eq!(register.difference_usd.unwrap().cents(), 0);
        assert_eq!(register.difference_bs.unwrap().cents(), 0);
    }

    #[test]
    fn test_sales_before_opening_are_excluded() {
        let (mut store, id) = store_with_product(200, 10);

        // Sold before the shift started.
        sell(
            &mut store,
            &id,
            1,
            Tender::CashUsd {
                amount_paid: Money::from_cents(200),
                change: Money::zero(),
            },
        );

        store.open_register(Money::zero(), Money::zero()).unwrap();
        let register = store.close_register(Money::zero(), Money::zero()).unwrap();

        assert_eq!(register.sales_count, 0);
        assert_eq!(register.difference_usd.unwrap().cents(), 0);
    }
}
