//! # Validation Module
//!
//! Input validation for store operations. Callers pre-validate with
//! these before any state is touched, so a failed operation is always a
//! clean no-op.

use crate::error::ValidationError;
use crate::money::{ExchangeRate, Money};
use crate::types::{Tender, TenderMethod};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
///
/// ## Example
/// ```rust
/// use bodega_core::validation::validate_name;
///
/// assert!(validate_name("Harina PAN 1kg").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens and underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a coupon code and returns its canonical (uppercase) form.
///
/// ## Example
/// ```rust
/// use bodega_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code("promo10").unwrap(), "PROMO10");
/// assert!(validate_coupon_code("").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 30,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_uppercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price (>= 0; zero is allowed for giveaway items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a cash amount (>= 0).
pub fn validate_cash_amount(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "cash amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an exchange rate (> 0).
pub fn validate_exchange_rate(rate: ExchangeRate) -> ValidationResult<()> {
    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "exchange rate".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Tender Validators
// =============================================================================

/// Validates payment info before a sale commit.
///
/// ## Rules
/// - Mobile payments need a non-empty reference
/// - Cash tenders cannot carry negative amounts
/// - Split tenders need at least one part, each with a positive amount;
///   mobile parts need a reference
pub fn validate_tender(tender: &Tender) -> ValidationResult<()> {
    match tender {
        Tender::Mobile { reference } => {
            if reference.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "reference".to_string(),
                });
            }
        }
        Tender::CashUsd { amount_paid, change } | Tender::CashBs { amount_paid, change } => {
            validate_cash_amount(*amount_paid)?;
            validate_cash_amount(*change)?;
        }
        Tender::Multiple { payments } => {
            if payments.is_empty() {
                return Err(ValidationError::Required {
                    field: "payments".to_string(),
                });
            }
            for part in payments {
                if !part.amount.is_positive() {
                    return Err(ValidationError::MustBePositive {
                        field: "payment amount".to_string(),
                    });
                }
                if part.method == TenderMethod::Mobile
                    && part.reference.as_deref().map(str::trim).unwrap_or("").is_empty()
                {
                    return Err(ValidationError::Required {
                        field: "reference".to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Harina PAN 1kg").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("HAR-PAN-1KG").is_ok());
        assert!(validate_sku("abc_123").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_coupon_code_normalizes() {
        assert_eq!(validate_coupon_code("promo10").unwrap(), "PROMO10");
        assert_eq!(validate_coupon_code("  black-friday ").unwrap(), "BLACK-FRIDAY");
        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("no spaces allowed").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::from_cents(0)).is_ok());
        assert!(validate_price(Money::from_cents(1099)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_exchange_rate() {
        assert!(validate_exchange_rate(ExchangeRate::from_millis(36_500)).is_ok());
        assert!(validate_exchange_rate(ExchangeRate::from_millis(0)).is_err());
        assert!(validate_exchange_rate(ExchangeRate::from_millis(-5)).is_err());
    }

    #[test]
    fn test_validate_tender() {
        assert!(validate_tender(&Tender::Mobile {
            reference: "0412-999".to_string()
        })
        .is_ok());
        assert!(validate_tender(&Tender::Mobile {
            reference: "  ".to_string()
        })
        .is_err());

        assert!(validate_tender(&Tender::CashUsd {
            amount_paid: Money::from_cents(1000),
            change: Money::from_cents(460),
        })
        .is_ok());

        assert!(validate_tender(&Tender::Multiple { payments: vec![] }).is_err());

        assert!(validate_tender(&Tender::Multiple {
            payments: vec![crate::types::TenderPart {
                method: TenderMethod::CashBs,
                amount: Money::from_cents(10_000),
                reference: None,
            }],
        })
        .is_ok());

        assert!(validate_tender(&Tender::Multiple {
            payments: vec![crate::types::TenderPart {
                method: TenderMethod::Mobile,
                amount: Money::from_cents(500),
                reference: None,
            }],
        })
        .is_err());
    }
}
