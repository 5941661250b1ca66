//! # Transaction Repository
//!
//! The checkout engine and the transaction history.
//!
//! ## Checkout Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout (one SQLite transaction)               │
//! │                                                                         │
//! │  validate_items ──✗──► EmptyCheckout / Validation (storage untouched)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │   for each item:                                                        │
//! │     lookup ─────────────✗──► ProductNotFound(id)        ─┐             │
//! │     plan.add_line ──────✗──► InsufficientStock / overflow ├─► ROLLBACK  │
//! │     decrement_stock ────✗──► InsufficientStock (race)    ─┘   (drop)   │
//! │   INSERT transactions        RETURNING id                               │
//! │   INSERT transaction_details (one per line, request order)             │
//! │  COMMIT ──────────────────────────────────────────────► Transaction    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Returning early with `?` drops the `sqlx::Transaction`, which rolls
//! back every decrement made so far.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::product;
use kasir_core::checkout::{self, CheckoutPlan, PricedLine};
use kasir_core::{
    CheckoutItem, CoreError, Transaction, TransactionDetail, TransactionSummary,
};

const DETAIL_COLUMNS: &str = "id, transaction_id, product_id, product_name, quantity, subtotal";

/// Repository for checkouts and transaction history.
///
/// ## Usage
/// ```rust,ignore
/// let tx = db
///     .transactions()
///     .checkout(&[CheckoutItem::new(1, 2), CheckoutItem::new(2, 3)])
///     .await?;
///
/// let same = db.transactions().get_by_id(tx.id).await?;
/// let recent = db.transactions().list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Sells `items` atomically.
    ///
    /// Either every line is priced, its stock decremented and the
    /// transaction with all details written, or nothing changes at all.
    ///
    /// ## Errors
    /// * `DbError::Domain(EmptyCheckout | Validation)` - Bad request shape
    /// * `DbError::Domain(ProductNotFound)` - Unknown or soft-deleted product
    /// * `DbError::Domain(InsufficientStock)` - Not enough stock for a line
    /// * `DbError::Domain(AmountOverflow)` - Total doesn't fit in `i64`
    /// * any other `DbError` - Storage failure, nothing committed
    pub async fn checkout(&self, items: &[CheckoutItem]) -> DbResult<Transaction> {
        checkout::validate_items(items).inspect_err(|err| {
            warn!(error = %err, lines = items.len(), "Checkout rejected");
        })?;

        // Take the write lock up front; a deferred transaction would fail
        // with "database is locked" when upgrading after the lookups.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let plan = match price_and_reserve(&mut tx, items).await {
            Ok(plan) => plan,
            Err(err) => {
                if let DbError::Domain(domain) = &err {
                    warn!(error = %domain, "Checkout rejected, rolling back");
                }
                return Err(err);
            }
        };

        let header = sqlx::query_as::<_, TransactionSummary>(
            "INSERT INTO transactions (total_amount, created_at) VALUES (?1, ?2) \
             RETURNING id, total_amount, created_at",
        )
        .bind(plan.total())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let mut details = Vec::with_capacity(plan.lines().len());
        for line in plan.lines() {
            details.push(insert_detail(&mut tx, header.id, line).await?);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            transaction_id = header.id,
            total_amount = %header.total_amount,
            lines = details.len(),
            "Checkout committed"
        );

        Ok(header.with_details(details))
    }

    /// Gets a transaction with its details, in detail-id order.
    ///
    /// Details carry the product name captured at sale time, not the current one.
    ///
    /// ## Returns
    /// * `Ok(Some(Transaction))` - Transaction found
    /// * `Ok(None)` - No transaction with this id
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Transaction>> {
        let header = sqlx::query_as::<_, TransactionSummary>(
            "SELECT id, total_amount, created_at FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let details = sqlx::query_as::<_, TransactionDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM transaction_details \
             WHERE transaction_id = ?1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(header.with_details(details)))
    }

    /// Lists all transactions, most recent first, without details.
    pub async fn list(&self) -> DbResult<Vec<TransactionSummary>> {
        let transactions = sqlx::query_as::<_, TransactionSummary>(
            "SELECT id, total_amount, created_at FROM transactions ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}

/// Prices every line and decrements its stock, in request order.
async fn price_and_reserve(
    conn: &mut SqliteConnection,
    items: &[CheckoutItem],
) -> DbResult<CheckoutPlan> {
    let mut plan = CheckoutPlan::new();

    for item in items {
        let snapshot = product::lookup(conn, item.product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(item.product_id))?;

        plan.add_line(&snapshot, item.quantity)?;

        if !product::decrement_stock(conn, item.product_id, item.quantity).await? {
            // Another checkout got there between our read and our write
            let available = product::lookup(conn, item.product_id)
                .await?
                .map(|s| s.stock)
                .unwrap_or(0);

            return Err(CoreError::InsufficientStock {
                product_name: snapshot.name,
                requested: item.quantity,
                available,
            }
            .into());
        }

        debug!(
            product_id = item.product_id,
            quantity = item.quantity,
            "Line reserved"
        );
    }

    Ok(plan)
}

async fn insert_detail(
    conn: &mut SqliteConnection,
    transaction_id: i64,
    line: &PricedLine,
) -> DbResult<TransactionDetail> {
    let detail = sqlx::query_as::<_, TransactionDetail>(&format!(
        "INSERT INTO transaction_details \
            (transaction_id, product_id, product_name, quantity, subtotal) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         RETURNING {DETAIL_COLUMNS}"
    ))
    .bind(transaction_id)
    .bind(line.product_id)
    .bind(&line.product_name)
    .bind(line.quantity)
    .bind(line.subtotal)
    .fetch_one(&mut *conn)
    .await?;

    Ok(detail)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kasir_core::{Money, ProductInput};

    struct Fixture {
        db: Database,
        a: i64,
        b: i64,
    }

    /// A: "Indomie Godog" 3500, stock 10. B: "Vit 1000ml" 3000, stock 40.
    async fn setup() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = insert_product(&db, "Indomie Godog", 3500, 10).await;
        let b = insert_product(&db, "Vit 1000ml", 3000, 40).await;
        Fixture { db, a, b }
    }

    async fn insert_product(db: &Database, name: &str, price: i64, stock: i64) -> i64 {
        db.products()
            .insert(&ProductInput {
                name: name.to_string(),
                price: Money::from_minor(price),
                stock,
                category_id: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn detail_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM transaction_details")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_two_lines() {
        let f = setup().await;

        let tx = f
            .db
            .transactions()
            .checkout(&[CheckoutItem::new(f.a, 2), CheckoutItem::new(f.b, 3)])
            .await
            .unwrap();

        assert_eq!(tx.total_amount, Money::from_minor(16000));
        assert_eq!(tx.details.len(), 2);
        assert_eq!(tx.details[0].product_id, f.a);
        assert_eq!(tx.details[0].product_name, "Indomie Godog");
        assert_eq!(tx.details[0].subtotal, Money::from_minor(7000));
        assert_eq!(tx.details[1].subtotal, Money::from_minor(9000));
        assert!(tx.details.iter().all(|d| d.transaction_id == tx.id));
        let details_sum: Money = tx.details.iter().map(|d| d.subtotal).sum();
        assert_eq!(details_sum, tx.total_amount);

        assert_eq!(stock_of(&f.db, f.a).await, 8);
        assert_eq!(stock_of(&f.db, f.b).await, 37);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let f = setup().await;

        let err = f
            .db
            .transactions()
            .checkout(&[CheckoutItem::new(f.a, 2), CheckoutItem::new(f.b, 50)])
            .await
            .unwrap_err();

        assert_eq!(
            err.as_domain(),
            Some(&CoreError::InsufficientStock {
                product_name: "Vit 1000ml".to_string(),
                requested: 50,
                available: 40,
            })
        );

        // the decrement of A made before B failed is undone
        assert_eq!(stock_of(&f.db, f.a).await, 10);
        assert_eq!(stock_of(&f.db, f.b).await, 40);
        assert!(f.db.transactions().list().await.unwrap().is_empty());
        assert_eq!(detail_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back() {
        let f = setup().await;

        let err = f
            .db
            .transactions()
            .checkout(&[CheckoutItem::new(f.a, 1), CheckoutItem::new(999, 1)])
            .await
            .unwrap_err();

        assert_eq!(err.as_domain(), Some(&CoreError::ProductNotFound(999)));
        assert_eq!(stock_of(&f.db, f.a).await, 10);
        assert!(f.db.transactions().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_invalid_quantity() {
        let f = setup().await;
        let repo = f.db.transactions();

        let err = repo.checkout(&[]).await.unwrap_err();
        assert_eq!(err.as_domain(), Some(&CoreError::EmptyCheckout));

        let err = repo
            .checkout(&[CheckoutItem::new(f.a, 1), CheckoutItem::new(f.b, 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        assert_eq!(stock_of(&f.db, f.a).await, 10);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_product_accumulates() {
        let f = setup().await;
        let repo = f.db.transactions();

        let err = repo
            .checkout(&[CheckoutItem::new(f.a, 6), CheckoutItem::new(f.a, 5)])
            .await
            .unwrap_err();
        assert_eq!(
            err.as_domain(),
            Some(&CoreError::InsufficientStock {
                product_name: "Indomie Godog".to_string(),
                requested: 5,
                available: 4,
            })
        );
        assert_eq!(stock_of(&f.db, f.a).await, 10);

        let tx = repo
            .checkout(&[CheckoutItem::new(f.a, 6), CheckoutItem::new(f.a, 4)])
            .await
            .unwrap();
        assert_eq!(tx.details.len(), 2);
        assert_eq!(tx.total_amount, Money::from_minor(35000));
        assert_eq!(stock_of(&f.db, f.a).await, 0);
    }

    #[tokio::test]
    async fn test_soft_deleted_product_cannot_be_sold() {
        let f = setup().await;
        f.db.products().soft_delete(f.a).await.unwrap();

        let err = f
            .db
            .transactions()
            .checkout(&[CheckoutItem::new(f.a, 1)])
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&CoreError::ProductNotFound(f.a)));
    }

    #[tokio::test]
    async fn test_get_by_id_is_stable() {
        let f = setup().await;
        let repo = f.db.transactions();

        let created = repo
            .checkout(&[CheckoutItem::new(f.a, 2), CheckoutItem::new(f.b, 3)])
            .await
            .unwrap();

        let first = repo.get_by_id(created.id).await.unwrap().unwrap();
        let second = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, created);

        assert!(repo.get_by_id(created.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_keeps_sold_name_and_price() {
        let f = setup().await;
        let repo = f.db.transactions();

        let created = repo.checkout(&[CheckoutItem::new(f.a, 2)]).await.unwrap();

        f.db.products()
            .update(
                f.a,
                &ProductInput {
                    name: "Indomie Goreng".to_string(),
                    price: Money::from_minor(4000),
                    stock: 8,
                    category_id: None,
                },
            )
            .await
            .unwrap();
        f.db.products().soft_delete(f.a).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.details[0].product_name, "Indomie Godog");
        assert_eq!(fetched.details[0].subtotal, Money::from_minor(7000));
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let f = setup().await;
        let repo = f.db.transactions();

        let first = repo.checkout(&[CheckoutItem::new(f.a, 1)]).await.unwrap();
        let _ = repo.checkout(&[CheckoutItem::new(f.b, 41)]).await.unwrap_err();
        let second = repo.checkout(&[CheckoutItem::new(f.b, 1)]).await.unwrap();

        let list = repo.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
        assert!(second.id > first.id);
        assert_eq!(list[1].total_amount, Money::from_minor(3500));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("kasir.db")).max_connections(4))
            .await
            .unwrap();
        let id = insert_product(&db, "Kecap", 12000, 10).await;

        let mut handles = Vec::new();
        for _ in 0..25 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.transactions().checkout(&[CheckoutItem::new(id, 1)]).await
            }));
        }

        let mut successes = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => rejected += 1,
                Err(err) => panic!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(successes, 10);
        assert_eq!(rejected, 15);
        assert_eq!(stock_of(&db, id).await, 0);
        assert_eq!(db.transactions().list().await.unwrap().len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_with_ample_stock_all_commit() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("kasir.db")).max_connections(4))
            .await
            .unwrap();
        let id = insert_product(&db, "Vit 1000ml", 3000, 1000).await;

        let mut handles = Vec::new();
        for _ in 0..40 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.transactions().checkout(&[CheckoutItem::new(id, 1)]).await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "checkout failed: {:?}", result.err());
        }

        assert_eq!(stock_of(&db, id).await, 960);

        let transactions = db.transactions().list().await.unwrap();
        assert_eq!(transactions.len(), 40);
        assert!(transactions
            .iter()
            .all(|tx| tx.total_amount == Money::from_minor(3000)));
    }
}
