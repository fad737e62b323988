use super::{links, pagination, ApiResult, ErrorResponse, MessageResponse};
use crate::types::{InstructionInput, InstructionRecord, PaginatedInstructionResponse};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

/// Returns the router for /instructions endpoints (mounted at /instructions)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_instructions).post(create_instruction))
        .route(
            "/{id}",
            get(get_instruction)
                .put(update_instruction)
                .delete(delete_instruction),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListInstructionsParams {
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Number of items to return (default: 10, max: 100)
    pub limit: Option<i64>,
    /// Only steps of this recipe
    pub recipe_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/instructions",
    tag = "instructions",
    params(ListInstructionsParams),
    responses(
        (status = 200, description = "One page of instructions in step order", body = PaginatedInstructionResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse)
    )
)]
pub async fn list_instructions(
    State(services): State<AppState>,
    Query(params): Query<ListInstructionsParams>,
) -> ApiResult<Json<PaginatedInstructionResponse>> {
    let page = pagination::page(params.offset, params.limit)?;
    let (records, total_count) = services.instructions.get_page(page, params.recipe_id)?;
    Ok(Json(PaginatedInstructionResponse {
        data: records.into_iter().map(links::instruction).collect(),
        pagination: pagination::metadata(page, total_count),
    }))
}

#[utoipa::path(
    post,
    path = "/instructions",
    tag = "instructions",
    request_body = InstructionInput,
    responses(
        (status = 201, description = "Instruction created", body = InstructionRecord),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_instruction(
    State(services): State<AppState>,
    Json(input): Json<InstructionInput>,
) -> ApiResult<(StatusCode, Json<InstructionRecord>)> {
    let record = services.instructions.create(input)?;
    Ok((StatusCode::CREATED, Json(links::instruction(record))))
}

#[utoipa::path(
    get,
    path = "/instructions/{id}",
    tag = "instructions",
    params(("id" = i32, Path, description = "Instruction ID")),
    responses(
        (status = 200, description = "Instruction", body = InstructionRecord),
        (status = 404, description = "Instruction not found", body = ErrorResponse)
    )
)]
pub async fn get_instruction(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<InstructionRecord>> {
    Ok(Json(links::instruction(services.instructions.get_by_key(id)?)))
}

#[utoipa::path(
    put,
    path = "/instructions/{id}",
    tag = "instructions",
    params(("id" = i32, Path, description = "Instruction ID")),
    request_body = InstructionInput,
    responses(
        (status = 202, description = "Instruction updated", body = InstructionRecord),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Instruction not found", body = ErrorResponse)
    )
)]
pub async fn update_instruction(
    State(services): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<InstructionInput>,
) -> ApiResult<(StatusCode, Json<InstructionRecord>)> {
    let record = services.instructions.update(id, input)?;
    Ok((StatusCode::ACCEPTED, Json(links::instruction(record))))
}

#[utoipa::path(
    delete,
    path = "/instructions/{id}",
    tag = "instructions",
    params(("id" = i32, Path, description = "Instruction ID")),
    responses(
        (status = 200, description = "Instruction deleted", body = MessageResponse),
        (status = 404, description = "Instruction not found", body = ErrorResponse)
    )
)]
pub async fn delete_instruction(
    State(services): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageResponse>> {
    services.instructions.delete(id)?;
    Ok(Json(MessageResponse {
        message: format!("Instruction {} deleted", id),
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list_instructions,
        create_instruction,
        get_instruction,
        update_instruction,
        delete_instruction,
    ),
    components(schemas(InstructionInput, InstructionRecord, PaginatedInstructionResponse))
)]
pub struct ApiDoc;
