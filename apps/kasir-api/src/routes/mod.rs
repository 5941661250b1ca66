//! # HTTP Routes
//!
//! ```text
//! /health                          GET
//! /api/products                    GET (?category_id=)  POST
//! /api/products/{id}               GET  PUT  DELETE
//! /api/categories                  GET  POST
//! /api/categories/{id}             GET  PUT  DELETE
//! /api/checkout                    POST
//! /api/transactions                GET
//! /api/transactions/{id}           GET
//! ```
//!
//! Each handler makes one repository call and maps the outcome.

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub mod categories;
pub mod health;
pub mod products;
pub mod transactions;

/// Builds the route table. State is attached by [`crate::router`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/api/checkout", post(transactions::checkout))
        .route("/api/transactions", get(transactions::list_transactions))
        .route("/api/transactions/{id}", get(transactions::get_transaction))
}
