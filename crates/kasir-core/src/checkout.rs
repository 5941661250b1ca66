//! # Checkout Pricing
//!
//! Pure part of a checkout: request validation, per-line stock check and
//! checked price arithmetic. The storage layer feeds it product snapshots
//! read inside its database transaction and persists what it produces.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Checkout Flow                                  │
//! │                                                                         │
//! │  validate_items(items)            ← THIS MODULE (no I/O)                │
//! │       │  empty? non-positive quantity? too many lines?                  │
//! │       ▼                                                                 │
//! │  for each item, in request order:                                       │
//! │       │                                                                 │
//! │       ├── kasir-db: lookup(product_id) → StockSnapshot                  │
//! │       │                                                                 │
//! │       ├── CheckoutPlan::add_line(&snapshot, qty)   ← THIS MODULE        │
//! │       │        stock >= qty?  price × qty fits?  total fits?            │
//! │       │                                                                 │
//! │       └── kasir-db: decrement_stock(product_id, qty)                    │
//! │                                                                         │
//! │  kasir-db: insert transaction (plan.total()) + details (plan.lines())   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error from `add_line` aborts the whole checkout. The plan never
//! holds a partially valid state that would be persisted.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CheckoutItem;
use crate::validation;
use crate::MAX_CHECKOUT_LINES;

// =============================================================================
// Request Validation
// =============================================================================

/// Validates the shape of a checkout request before any storage access.
///
/// ## Rules
/// - At least one item
/// - At most [`MAX_CHECKOUT_LINES`] items
/// - Every quantity strictly positive
///
/// The same product may appear on several lines. Each line is checked
/// against the stock left after the earlier ones.
pub fn validate_items(items: &[CheckoutItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyCheckout);
    }

    validation::validate_line_count(items.len(), MAX_CHECKOUT_LINES)?;

    for item in items {
        validation::validate_quantity(item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Snapshots and Lines
// =============================================================================

/// The product fields a checkout needs, as read at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Money,
    pub stock: i64,
}

/// A priced checkout line, ready to be written as a transaction detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: i64,
    /// Name captured from the snapshot.
    pub product_name: String,
    pub quantity: i64,
    pub subtotal: Money,
}

// =============================================================================
// Checkout Plan
// =============================================================================

/// Accumulates priced lines and the running total of one checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutPlan {
    lines: Vec<PricedLine>,
    total: Money,
}

impl CheckoutPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prices one line against `snapshot` and appends it.
    ///
    /// `snapshot.stock` must be the stock as it stands after every earlier
    /// line of this checkout has been applied.
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] if `quantity` is not positive
    /// - [`CoreError::InsufficientStock`] if `quantity > snapshot.stock`
    /// - [`CoreError::AmountOverflow`] if the subtotal or total overflows
    pub fn add_line(&mut self, snapshot: &StockSnapshot, quantity: i64) -> CoreResult<&PricedLine> {
        validation::validate_quantity(quantity)?;

        if snapshot.stock < quantity {
            return Err(CoreError::InsufficientStock {
                product_name: snapshot.name.clone(),
                requested: quantity,
                available: snapshot.stock,
            });
        }

        let subtotal = snapshot
            .unit_price
            .checked_mul_quantity(quantity)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: format!("subtotal for {}", snapshot.name),
            })?;

        let total = self
            .total
            .checked_add(subtotal)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: "checkout total".to_string(),
            })?;

        self.total = total;
        self.lines.push(PricedLine {
            product_id: snapshot.product_id,
            product_name: snapshot.name.clone(),
            quantity,
            subtotal,
        });

        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Sum of all line subtotals so far.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
