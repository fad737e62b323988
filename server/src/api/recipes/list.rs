use super::filter::parse_filter;
use crate::api::{links, pagination, ApiError, ApiResult, ErrorResponse};
use crate::types::PaginatedRecipeResponse;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Number of items to return (default: 10, max: 100)
    pub limit: Option<i64>,
    /// Comma-separated `column:value` pairs. Columns: recipe_name,
    /// user_id, cuisine_id, cooking_time. A recipe_name value may contain
    /// commas unless a known `column:` follows one.
    ///
    /// Example: "cuisine_id:2,recipe_name:Mac, cheese"
    pub filter_by: Option<String>,
}

#[utoipa::path(
    get,
    path = "/recipes_sections",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "One page of recipes", body = PaginatedRecipeResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "No recipes on this page", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(services): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> ApiResult<Json<PaginatedRecipeResponse>> {
    let page = pagination::page(params.offset, params.limit)?;
    let filter = params
        .filter_by
        .as_deref()
        .map(parse_filter)
        .transpose()
        .map_err(ApiError::BadRequest)?
        .unwrap_or_default();

    let (records, total_count) = services.recipes.get_page(page, &filter)?;
    if records.is_empty() {
        return Err(ApiError::NotFound("No recipes found".to_string()));
    }

    let data = records
        .into_iter()
        .map(|record| links::recipe(record, services.images.as_ref()))
        .collect();

    Ok(Json(PaginatedRecipeResponse {
        data,
        pagination: pagination::metadata(page, total_count),
    }))
}
