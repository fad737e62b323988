pub mod ingredients;
pub mod instructions;
mod links;
mod pagination;
pub mod recipes;
pub mod root;
pub mod upload;


use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::data::DataError;
use crate::resources::ResourceError;
use crate::storage::StorageError;
use crate::telemetry::current_correlation_id;
use crate::types::{Link, Pagination};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Set on server errors; quote it when reporting a problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
}

/// Shared `{message}` response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// `message` is returned to the client, `cause` only logged.
    Internal { message: &'static str, cause: String },
}

impl ApiError {
    pub fn internal(message: &'static str, cause: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            message,
            cause: cause.to_string(),
        }
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ResourceError::Validation(msg) => ApiError::BadRequest(msg),
            ResourceError::Persistence(DataError::ForeignKey(msg)) => {
                ApiError::BadRequest(format!("Invalid reference: {}", msg))
            }
            ResourceError::Persistence(err) => ApiError::internal("Database operation failed", err),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::internal("Failed to upload image", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error,
                    error_id: None,
                },
            ),
            ApiError::NotFound(error) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error,
                    error_id: None,
                },
            ),
            ApiError::Internal { message, cause } => {
                let error_id = Uuid::new_v4().to_string();
                tracing::error!(
                    error_id = %error_id,
                    correlation_id = %current_correlation_id().unwrap_or_default(),
                    cause = %cause,
                    "{}",
                    message
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: message.to_string(),
                        error_id: Some(error_id),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Recipe Sections API"),
        components(schemas(ErrorResponse, MessageResponse, Link, Pagination))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        root::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        instructions::ApiDoc::openapi(),
        upload::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
