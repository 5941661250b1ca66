//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kasir POS                              │
//! │                                                                         │
//! │  Handler returns Result<T, ApiError>                                   │
//! │         │                                                               │
//! │         ├── Json/Path/Query rejection ──► 400 INVALID_REQUEST          │
//! │         │                                                               │
//! │         ├── CoreError (via DbError::Domain)                            │
//! │         │     EmptyCheckout          ──► 400 EMPTY_CHECKOUT            │
//! │         │     Validation, overflow   ──► 400 VALIDATION_ERROR          │
//! │         │     ProductNotFound        ──► 404 PRODUCT_NOT_FOUND         │
//! │         │     Transaction/Category   ──► 404 NOT_FOUND                 │
//! │         │     InsufficientStock      ──► 409 INSUFFICIENT_STOCK        │
//! │         │                                                               │
//! │         └── DbError                                                    │
//! │               UniqueViolation        ──► 409 CONFLICT                  │
//! │               ForeignKeyViolation    ──► 400 VALIDATION_ERROR          │
//! │               anything else          ──► 500 DATABASE_ERROR (logged)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! A machine-readable `code`, a human-readable `message`, and for some
//! codes extra context fields:
//! ```json
//! {
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for Vit 1000ml: requested 50, available 40",
//!   "product_name": "Vit 1000ml",
//!   "requested": 50,
//!   "available": 40
//! }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use kasir_core::{CoreError, ErrorKind};
use kasir_db::DbError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Extra fields merged into the body
    #[serde(flatten)]
    pub context: Option<ErrorContext>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed body, path or query string (400)
    InvalidRequest,

    /// Input validation failed (400)
    ValidationError,

    /// Checkout with no items (400)
    EmptyCheckout,

    /// Checkout or product lookup named an unknown product (404)
    ProductNotFound,

    /// Any other resource not found (404)
    NotFound,

    /// Not enough stock for a checkout line (409)
    InsufficientStock,

    /// Unique constraint, e.g. duplicate category name (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::ValidationError | ErrorCode::EmptyCheckout => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::ProductNotFound | ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock | ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured context for errors that carry more than a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorContext {
    Product {
        product_id: i64,
    },
    Stock {
        product_name: String,
        requested: i64,
        available: i64,
    },
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            context: None,
        }
    }

    fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a request-shape error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidRequest, message)
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts core errors to API errors.
///
/// Errors with a dedicated code are matched first. The rest fall back on
/// [`CoreError::kind`]: validation failures become `VALIDATION_ERROR`, and
/// the remaining domain errors are missing resources.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = match &err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };

        match err {
            CoreError::EmptyCheckout => ApiError::new(ErrorCode::EmptyCheckout, message),
            CoreError::ProductNotFound(product_id) => {
                ApiError::new(ErrorCode::ProductNotFound, message)
                    .with_context(ErrorContext::Product { product_id })
            }
            CoreError::InsufficientStock {
                product_name,
                requested,
                available,
            } => ApiError::new(ErrorCode::InsufficientStock, message).with_context(
                ErrorContext::Stock {
                    product_name,
                    requested,
                    available,
                },
            ),
            other => match other.kind() {
                ErrorKind::Validation => ApiError::validation(message),
                ErrorKind::Domain => ApiError::new(ErrorCode::NotFound, message),
            },
        }
    }
}

/// Converts database errors to API errors.
///
/// Storage failures are logged with their detail and reported to the client
/// with a generic message.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => e.into(),
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                warn!(%message, "Foreign key violation");
                ApiError::validation("Invalid reference")
            }
            DbError::TransactionFailed(e) => {
                error!(error = %e, "Database transaction failed");
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy")
            }
            other => {
                error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_request(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
