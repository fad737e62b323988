use super::create::store_picture_name;
use crate::api::{links, ApiResult, ErrorResponse};
use crate::types::{RecipeSection, RecipeSectionInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

#[utoipa::path(
    put,
    path = "/recipes_sections/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipeSectionInput,
    responses(
        (status = 202, description = "Recipe updated", body = RecipeSection),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(services): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<RecipeSectionInput>,
) -> ApiResult<(StatusCode, Json<RecipeSection>)> {
    let input = store_picture_name(input, services.images.as_ref());
    let record = services.recipes.update(id, input)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(links::recipe(record, services.images.as_ref())),
    ))
}
