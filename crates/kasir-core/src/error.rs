//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Domain errors (unknown product, no stock...)   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quantities, ...)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are raised before
/// or during a checkout and always mean the request was refused, never that
/// the system failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Checkout was requested with no items.
    #[error("Checkout items cannot be empty")]
    EmptyCheckout,

    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist in the database
    /// - Product was soft-deleted
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Insufficient stock to complete a checkout line.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout [{product: 2, quantity: 50}]
    ///      │
    ///      ▼
    /// Read stock: available=40
    ///      │
    ///      ▼
    /// InsufficientStock { product_name: "Vit 1000ml", requested: 50, available: 40 }
    ///      │
    ///      ▼
    /// Whole checkout rolled back, client told "only 40 left"
    /// ```
    #[error(
        "Insufficient stock for {product_name}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(i64),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// A monetary computation overflowed `i64`.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Coarse classification used by the transport layer to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input, rejected before storage is touched.
    Validation,
    /// The request is well-formed but the domain refuses it.
    Domain,
}

impl CoreError {
    /// Returns which family of errors this belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::EmptyCheckout
            | CoreError::AmountOverflow { .. }
            | CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::ProductNotFound(_)
            | CoreError::InsufficientStock { .. }
            | CoreError::TransactionNotFound(_)
            | CoreError::CategoryNotFound(_) => ErrorKind::Domain,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
