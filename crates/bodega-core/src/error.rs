//! # Error Types
//!
//! Domain-specific error types for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  bodega-core errors (this file)                              │
//! │  ├── CoreError        - Business rule violations             │
//! │  └── ValidationError  - Input validation failures            │
//! │                                                              │
//! │  bodega-store errors (separate crate)                        │
//! │  └── PersistError     - Snapshot persistence failures        │
//! │                                                              │
//! │  Flow: ValidationError → CoreError → caller-facing message   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// A returned `CoreError` always means the operation was a no-op: the
/// store's state is exactly what it was before the call.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity cannot be satisfied by current stock.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Suspended cart not found: {0}")]
    SuspendedCartNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Coupon expired, exhausted or already consumed.
    #[error("Coupon cannot be applied: {code}")]
    CouponRejected { code: String },

    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Combo not found: {0}")]
    ComboNotFound(String),

    #[error("Combo {0} is not active")]
    ComboInactive(String),

    /// Only one unclosed register may exist at a time.
    #[error("A cash register is already open (id {0})")]
    RegisterAlreadyOpen(String),

    #[error("No open cash register")]
    NoOpenRegister,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad characters in a SKU or coupon code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU or coupon code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
