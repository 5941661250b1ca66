//! # Checkout & Transaction Routes
//!
//! `POST /api/checkout` is the only write path for sales. The handler hands
//! the item list to [`kasir_db::TransactionRepository::checkout`] untouched;
//! validation, pricing and stock control all happen inside the repository's
//! database transaction.
//!
//! ```json
//! POST /api/checkout
//! { "items": [ { "product_id": 1, "quantity": 2 }, { "product_id": 2, "quantity": 3 } ] }
//!
//! 201 Created
//! {
//!   "id": 1,
//!   "total_amount": 16000,
//!   "created_at": "2026-10-17T09:30:00Z",
//!   "details": [
//!     { "id": 1, "transaction_id": 1, "product_id": 1, "product_name": "Indomie Godog", "quantity": 2, "subtotal": 7000 },
//!     { "id": 2, "transaction_id": 1, "product_id": 2, "product_name": "Vit 1000ml", "quantity": 3, "subtotal": 9000 }
//!   ]
//! }
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use kasir_core::{CheckoutRequest, CoreError, Transaction, TransactionSummary};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

pub async fn checkout(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    let transaction = state.db.transactions().checkout(&request.items).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Transaction headers, newest first.
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionSummary>>, ApiError> {
    Ok(Json(state.db.transactions().list().await?))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Transaction>, ApiError> {
    let transaction = state
        .db
        .transactions()
        .get_by_id(id)
        .await?
        .ok_or(CoreError::TransactionNotFound(id))?;

    Ok(Json(transaction))
}
