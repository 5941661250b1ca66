//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate contains the domain model and the business rules of the
//! point-of-sale backend as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/kasir-api)                    │   │
//! │  │    /api/products  /api/categories  /api/checkout  /api/...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, atomic checkout              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ Checkout- │  │   rules   │  │   │
//! │  │   │Transaction│  │           │  │   Plan    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, ...)
//! - [`money`] - Money type with checked integer arithmetic
//! - [`checkout`] - Checkout request validation and line pricing
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::checkout::{CheckoutPlan, StockSnapshot};
//! use kasir_core::Money;
//!
//! let indomie = StockSnapshot {
//!     product_id: 1,
//!     name: "Indomie Godog".to_string(),
//!     unit_price: Money::from_minor(3500),
//!     stock: 10,
//! };
//!
//! let mut plan = CheckoutPlan::new();
//! plan.add_line(&indomie, 2).unwrap();
//! assert_eq!(plan.total().minor(), 7000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CheckoutPlan, PricedLine, StockSnapshot};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in one checkout request.
///
/// Keeps a single database transaction bounded. A cart with more distinct
/// lines than this is almost certainly a client bug.
pub const MAX_CHECKOUT_LINES: usize = 100;

/// Maximum length of a product name.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Maximum length of a category description.
pub const MAX_CATEGORY_DESCRIPTION_LEN: usize = 500;
