use crate::api::{links, ApiResult, ErrorResponse};
use crate::types::RecipeSection;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/recipes_sections/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe with its ingredients and instructions", body = RecipeSection),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<RecipeSection>> {
    let record = services.recipes.get_by_key(id)?;
    Ok(Json(links::recipe(record, services.images.as_ref())))
}
