//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Category     │◄──│     Product     │◄──│  TransactionDetail  │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │   │  id             │   │  id                 │   │
//! │  │  name           │   │  name           │   │  transaction_id ────┼─┐ │
//! │  │  description    │   │  price (Money)  │   │  product_id         │ │ │
//! │  └─────────────────┘   │  stock          │   │  product_name (snap)│ │ │
//! │                        │  category_id    │   │  quantity, subtotal │ │ │
//! │                        └─────────────────┘   └─────────────────────┘ │ │
//! │                                                                       │ │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐   │ │
//! │  │  CheckoutItem   │   │  Transaction                            │◄──┘ │
//! │  │  (input only)   │   │  id, total_amount, created_at, details  │     │
//! │  │  product_id     │   └─────────────────────────────────────────┘     │
//! │  │  quantity       │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! All persisted entities use database-assigned integer ids. Transaction ids
//! are monotonic, so "most recent first" is "highest id first".
//!
//! ## Snapshot Pattern
//! `TransactionDetail.product_name` and `TransactionDetail.subtotal` are
//! frozen at checkout time. Renaming or repricing a product later never
//! changes a committed transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::validation;

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryInput {
    /// Validates the input and returns a trimmed copy.
    pub fn validated(&self) -> CoreResult<CategoryInput> {
        validation::validate_category_name(&self.name)?;
        validation::validate_category_description(&self.description)?;

        Ok(CategoryInput {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Database-assigned identifier.
    pub id: i64,

    /// Display name shown to cashier and on receipts.
    pub name: String,

    /// Unit price in the smallest currency unit.
    pub price: Money,

    /// Units currently in stock. Never negative.
    pub stock: i64,

    /// Optional category.
    pub category_id: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a product.
///
/// `PUT /api/products/{id}` replaces all of these at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Money,
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl ProductInput {
    /// Validates the input and returns a trimmed copy.
    ///
    /// Category existence is not checked here (that needs the database);
    /// the foreign key catches it on write.
    pub fn validated(&self) -> CoreResult<ProductInput> {
        validation::validate_product_name(&self.name)?;
        validation::validate_price(self.price)?;
        validation::validate_stock(self.stock)?;

        Ok(ProductInput {
            name: self.name.trim().to_string(),
            ..self.clone()
        })
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// One requested line of a checkout. Exists only for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CheckoutItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        CheckoutItem {
            product_id,
            quantity,
        }
    }
}

/// Request body for `POST /api/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// A missing `items` key is treated as an empty cart.
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed checkout with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

/// Transaction header used by the list view (no detail expansion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionSummary {
    pub id: i64,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
}

impl TransactionSummary {
    /// Attaches detail lines, producing the full transaction.
    pub fn with_details(self, details: Vec<TransactionDetail>) -> Transaction {
        Transaction {
            id: self.id,
            total_amount: self.total_amount,
            created_at: self.created_at,
            details,
        }
    }
}

/// A line item in a transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionDetail {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// unit price at time of sale × quantity.
    pub subtotal: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn sample_transaction() -> Transaction {
        let created_at = Utc::now();
        Transaction {
            id: 7,
            total_amount: Money::from_minor(16000),
            created_at,
            details: vec![
                TransactionDetail {
                    id: 1,
                    transaction_id: 7,
                    product_id: 1,
                    product_name: "Indomie Godog".to_string(),
                    quantity: 2,
                    subtotal: Money::from_minor(7000),
                },
                TransactionDetail {
                    id: 2,
                    transaction_id: 7,
                    product_id: 2,
                    product_name: "Vit 1000ml".to_string(),
                    quantity: 3,
                    subtotal: Money::from_minor(9000),
                },
            ],
        }
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx = sample_transaction();
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["total_amount"], 16000);
        assert_eq!(json["details"][0]["product_name"], "Indomie Godog");
        assert_eq!(json["details"][1]["subtotal"], 9000);
        assert_eq!(json["details"][1]["transaction_id"], 7);
    }

    #[test]
    fn test_checkout_request_missing_items_is_empty() {
        let req: CheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.items.is_empty());

        let req: CheckoutRequest =
            serde_json::from_str(r#"{"items":[{"product_id":1,"quantity":2}]}"#).unwrap();
        assert_eq!(req.items, vec![CheckoutItem::new(1, 2)]);
    }

    #[test]
    fn test_product_input_validated_trims() {
        let input = ProductInput {
            name: "  Kecap  ".to_string(),
            price: Money::from_minor(12000),
            stock: 20,
            category_id: None,
        };
        assert_eq!(input.validated().unwrap().name, "Kecap");

        let bad = ProductInput {
            stock: -1,
            ..input
        };
        assert!(matches!(bad.validated(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_category_input_validated() {
        let input: CategoryInput = serde_json::from_str(r#"{"name":"Minuman"}"#).unwrap();
        let valid = input.validated().unwrap();
        assert_eq!(valid.name, "Minuman");
        assert_eq!(valid.description, "");

        let empty = CategoryInput {
            name: "   ".to_string(),
            description: String::new(),
        };
        assert!(empty.validated().is_err());
    }
}
