//! Category routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use kasir_core::{Category, CategoryInput, CoreError};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories().list().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .db
        .categories()
        .get_by_id(id)
        .await?
        .ok_or(CoreError::CategoryNotFound(id))?;

    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.db.categories().insert(&input).await?;
    info!(id = category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.db.categories().update(id, &input).await?))
}

/// Products of a deleted category are kept and become uncategorized.
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.categories().delete(id).await?;
    info!(id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send};

    #[tokio::test]
    async fn test_category_lifecycle() {
        let (router, _db) = app().await;

        let (status, created) = send(
            &router,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Makanan", "description": "Makanan instan"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["description"], "Makanan instan");

        let uri = format!("/api/categories/{}", created["id"]);
        let (status, updated) = send(
            &router,
            Method::PUT,
            &uri,
            Some(json!({"name": "Makanan Ringan"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Makanan Ringan");
        assert_eq!(updated["description"], "");

        let (status, list) = send(&router, Method::GET, "/api/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = send(&router, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let (router, _db) = app().await;
        let body = json!({"name": "Minuman"});

        let (status, _) = send(&router, Method::POST, "/api/categories", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, err) = send(&router, Method::POST, "/api/categories", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "CONFLICT");
        assert!(err["message"].as_str().unwrap().contains("Minuman"));
    }

    #[tokio::test]
    async fn test_missing_and_invalid() {
        let (router, _db) = app().await;

        let (status, body) = send(
            &router,
            Method::PUT,
            "/api/categories/12",
            Some(json!({"name": "Bumbu"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/categories",
            Some(json!({"name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
