//! # Product Routes
//!
//! CRUD over the inventory. Deleting is a soft delete: the row stays so
//! past transactions keep their reference, but the product disappears from
//! listings and can no longer be sold.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use kasir_core::{CoreError, Product, ProductInput};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

/// Query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<i64>,
}

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.db.products().list(filter.category_id).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or(CoreError::ProductNotFound(id))?;

    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.db.products().insert(&input).await?;
    info!(id = product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>, ApiError> {
    let product = state.db.products().update(id, &input).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.products().soft_delete(id).await?;
    info!(id, "Product deactivated");

    Ok(StatusCode::NO_CONTENT)
}
