//! `/ingredients` endpoints.

use super::{links, pagination, ApiResult, ErrorResponse, MessageResponse};
use crate::types::{IngredientInput, IngredientRecord, PaginatedIngredientResponse};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

/// Returns the router for /ingredients endpoints (mounted at /ingredients)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients).post(create_ingredient))
        .route(
            "/{id}",
            get(get_ingredient)
                .put(update_ingredient)
                .delete(delete_ingredient),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListIngredientsParams {
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Number of items to return (default: 10, max: 100)
    pub limit: Option<i64>,
    /// Only ingredients of this recipe
    pub recipe_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "One page of ingredients", body = PaginatedIngredientResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    )
)]
pub async fn list_ingredients(
    State(services): State<AppState>,
    Query(params): Query<ListIngredientsParams>,
) -> ApiResult<Json<PaginatedIngredientResponse>> {
    let page = pagination::page(params.offset, params.limit)?;
    let (records, total_count) = services.ingredients.get_page(page, params.recipe_id)?;
    Ok(Json(PaginatedIngredientResponse {
        data: records.into_iter().map(links::ingredient).collect(),
        pagination: pagination::metadata(page, total_count),
    }))
}

#[utoipa::path(
    post,
    path = "/ingredients",
    tag = "ingredients",
    request_body = IngredientInput,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientRecord),
        (status = 400, description = "Missing or unknown recipe_id", body = ErrorResponse)
    )
)]
pub async fn create_ingredient(
    State(services): State<AppState>,
    Json(input): Json<IngredientInput>,
) -> ApiResult<(StatusCode, Json<IngredientRecord>)> {
    let record = services.ingredients.create(input)?;
    Ok((StatusCode::CREATED, Json(links::ingredient(record))))
}

#[utoipa::path(
    get,
    path = "/ingredients/{id}",
    tag = "ingredients",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientRecord),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<IngredientRecord>> {
    Ok(Json(links::ingredient(services.ingredients.get_by_key(id)?)))
}

#[utoipa::path(
    put,
    path = "/ingredients/{id}",
    tag = "ingredients",
    params(("id" = i32, Path, description = "Ingredient ID")),
    request_body = IngredientInput,
    responses(
        (status = 202, description = "Ingredient updated", body = IngredientRecord),
        (status = 400, description = "Missing or unknown recipe_id", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn update_ingredient(
    State(services): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<IngredientInput>,
) -> ApiResult<(StatusCode, Json<IngredientRecord>)> {
    let record = services.ingredients.update(id, input)?;
    Ok((StatusCode::ACCEPTED, Json(links::ingredient(record))))
}

#[utoipa::path(
    delete,
    path = "/ingredients/{id}",
    tag = "ingredients",
    params(("id" = i32, Path, description = "Ingredient ID")),
    responses(
        (status = 200, description = "Ingredient deleted", body = MessageResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn delete_ingredient(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    services.ingredients.delete(id)?;
    Ok(Json(MessageResponse {
        message: format!("Ingredient {} deleted", id),
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_ingredients,
        create_ingredient,
        get_ingredient,
        update_ingredient,
        delete_ingredient,
    ),
    components(schemas(IngredientInput, IngredientRecord, PaginatedIngredientResponse))
)]
pub struct ApiDoc;
