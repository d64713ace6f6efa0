//! # bodega-core: Pure Business Logic for Bodega POS
//!
//! This crate is the **heart** of Bodega POS. It contains the domain
//! model and all pure business arithmetic with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Bodega POS Architecture                    │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │              Frontend / printing / cloud sync           │  │
//! │  │        (external collaborators, not in this repo)       │  │
//! │  └────────────────────────────┬────────────────────────────┘  │
//! │                               │                               │
//! │  ┌────────────────────────────▼────────────────────────────┐  │
//! │  │                      bodega-store                       │  │
//! │  │   Store container · stock ledger · cart · sales ·       │  │
//! │  │   promotions · cash register · snapshot persistence     │  │
//! │  └────────────────────────────┬────────────────────────────┘  │
//! │                               │                               │
//! │  ┌────────────────────────────▼────────────────────────────┐  │
//! │  │              ★ bodega-core (THIS CRATE) ★               │  │
//! │  │                                                         │  │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌──────────┐   │  │
//! │  │   │  types  │  │  money  │  │  error  │  │validation│   │  │
//! │  │   │ Product │  │  Money  │  │CoreError│  │  rules   │   │  │
//! │  │   │  Sale   │  │ FX rate │  │  ...    │  │  checks  │   │  │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └──────────┘   │  │
//! │  │                                                         │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS    │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, no side effects
//! 2. **No I/O**: file system, network and hardware access are forbidden here
//! 3. **Integer money**: amounts are i64 cents; USD↔Bs conversion is
//!    fixed-point integer math
//! 4. **Explicit errors**: typed error enums, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Discount, ExchangeRate, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How far ahead the "expiring soon" classification looks, in days.
pub const EXPIRY_WINDOW_DAYS: i64 = 7;

/// Default low-stock threshold before the shop configures one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
