//! Ingredients and instructions addressed through their recipe.

use crate::api::{links, ApiResult, ErrorResponse};
use crate::types::{IngredientInput, IngredientRecord, InstructionInput, InstructionRecord};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartsDeletedResponse {
    pub message: String,
    /// Number of rows removed
    pub deleted: usize,
}

#[utoipa::path(
    get,
    path = "/recipes_sections/{id}/ingredients",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Ingredients of the recipe", body = Vec<IngredientRecord>),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn list_ingredients(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<IngredientRecord>>> {
    let records = services.ingredients.get_by_parent_id(id)?;
    Ok(Json(records.into_iter().map(links::ingredient).collect()))
}

#[utoipa::path(
    post,
    path = "/recipes_sections/{id}/ingredients",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = IngredientInput,
    responses(
        (status = 201, description = "Ingredient added", body = IngredientRecord),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn create_ingredient(
    State(services): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<IngredientInput>,
) -> ApiResult<(StatusCode, Json<IngredientRecord>)> {
    let record = services.ingredients.create_for_parent(id, input)?;
    Ok((StatusCode::CREATED, Json(links::ingredient(record))))
}

#[utoipa::path(
    delete,
    path = "/recipes_sections/{id}/ingredients",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Ingredients removed", body = PartsDeletedResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn delete_ingredients(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<PartsDeletedResponse>> {
    let deleted = services.ingredients.delete_by_parent_id(id)?;
    Ok(Json(PartsDeletedResponse {
        message: format!("Ingredients of recipe {} deleted", id),
        deleted,
    }))
}

#[utoipa::path(
    get,
    path = "/recipes_sections/{id}/instructions",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Instructions of the recipe in step order", body = Vec<InstructionRecord>),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn list_instructions(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<InstructionRecord>>> {
    let records = services.instructions.get_by_parent_id(id)?;
    Ok(Json(records.into_iter().map(links::instruction).collect()))
}

#[utoipa::path(
    post,
    path = "/recipes_sections/{id}/instructions",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = InstructionInput,
    responses(
        (status = 201, description = "Instruction added", body = InstructionRecord),
        (status = 400, description = "Invalid step number", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn create_instruction(
    State(services): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<InstructionInput>,
) -> ApiResult<(StatusCode, Json<InstructionRecord>)> {
    let record = services.instructions.create_for_parent(id, input)?;
    Ok((StatusCode::CREATED, Json(links::instruction(record))))
}

#[utoipa::path(
    delete,
    path = "/recipes_sections/{id}/instructions",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Instructions removed", body = PartsDeletedResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn delete_instructions(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<PartsDeletedResponse>> {
    let deleted = services.instructions.delete_by_parent_id(id)?;
    Ok(Json(PartsDeletedResponse {
        message: format!("Instructions of recipe {} deleted", id),
        deleted,
    }))
}
