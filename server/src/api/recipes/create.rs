use crate::api::{links, ApiResult, ErrorResponse};
use crate::storage::ImageStore;
use crate::types::{RecipeSection, RecipeSectionInput};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};

#[utoipa::path(
    post,
    path = "/recipes_sections",
    tag = "recipes",
    request_body = RecipeSectionInput,
    responses(
        (status = 201, description = "Recipe created", body = RecipeSection),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(services): State<AppState>,
    Json(input): Json<RecipeSectionInput>,
) -> ApiResult<(StatusCode, Json<RecipeSection>)> {
    let input = store_picture_name(input, services.images.as_ref());
    let record = services.recipes.create(input)?;
    Ok((
        StatusCode::CREATED,
        Json(links::recipe(record, services.images.as_ref())),
    ))
}

/// Pictures are stored by object name; clients may send back the URL they got.
pub(super) fn store_picture_name(
    mut input: RecipeSectionInput,
    images: &dyn ImageStore,
) -> RecipeSectionInput {
    input.pictures = input.pictures.map(|value| images.object_name(&value));
    input
}
