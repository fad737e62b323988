pub mod create;
pub mod delete;
mod filter;
pub mod get;
pub mod list;
pub mod parts;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for recipe endpoints (mounted at /recipes_sections)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/ingredients",
            get(parts::list_ingredients)
                .post(parts::create_ingredient)
                .delete(parts::delete_ingredients),
        )
        .route(
            "/{id}/instructions",
            get(parts::list_instructions)
                .post(parts::create_instruction)
                .delete(parts::delete_instructions),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        parts::list_ingredients,
        parts::create_ingredient,
        parts::delete_ingredients,
        parts::list_instructions,
        parts::create_instruction,
        parts::delete_instructions,
    ),
    components(schemas(
        crate::types::RecipeSection,
        crate::types::RecipeSectionInput,
        crate::types::PaginatedRecipeResponse,
        delete::DeleteRecipeResponse,
        parts::PartsDeletedResponse,
    ))
)]
pub struct ApiDoc;
