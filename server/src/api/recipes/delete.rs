use crate::api::{links, ApiResult, ErrorResponse};
use crate::types::Link;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteRecipeResponse {
    pub message: String,
    pub links: Vec<Link>,
}

#[utoipa::path(
    delete,
    path = "/recipes_sections/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe and its parts deleted", body = DeleteRecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn delete_recipe(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<DeleteRecipeResponse>> {
    services.recipes.delete(id)?;
    Ok(Json(DeleteRecipeResponse {
        message: format!("Recipe {} deleted", id),
        links: links::collection_links(),
    }))
}
