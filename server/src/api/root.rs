use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use super::MessageResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(welcome))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "root",
    responses(
        (status = 200, description = "Service is up", body = MessageResponse)
    )
)]
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Recipe Sections API".to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(paths(welcome))]
pub struct ApiDoc;
