//! Data access for recipe sections, ingredients and instructions.
//!
//! [`DataService`] is the seam between the resources and the store. Two
//! backends exist: MySQL through diesel, and an in-process store used for
//! local runs and the test suite. The backend is chosen once at startup by
//! [`connect`].

mod memory;
#[cfg(feature = "mysql")]
mod mysql;

pub use memory::MemoryDataService;
#[cfg(feature = "mysql")]
pub use mysql::MySqlDataService;

use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::DataBackend;
use crate::models::{
    IngredientFields, IngredientRow, InstructionFields, InstructionRow, RecipeFields, RecipeRow,
};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("foreign key constraint failed: {0}")]
    ForeignKey(String),

    #[error("database query failed: {0}")]
    Query(String),

    #[error("backend not available: {0}")]
    Unavailable(String),
}

pub type DataResult<T> = Result<T, DataError>;

impl From<diesel::result::Error> for DataError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match err {
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DataError::ForeignKey(info.message().to_string())
            }
            other => DataError::Query(other.to_string()),
        }
    }
}

/// One page of rows: skip `offset`, take at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

/// Conjunctive equality filter over the recipe columns that may be filtered on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub recipe_name: Option<String>,
    pub user_id: Option<i32>,
    pub cuisine_id: Option<i32>,
    pub cooking_time: Option<i32>,
}

impl RecipeFilter {
    pub fn matches(&self, row: &RecipeRow) -> bool {
        self.recipe_name
            .as_ref()
            .is_none_or(|name| row.recipe_name.as_ref() == Some(name))
            && self.user_id.is_none_or(|id| row.user_id == Some(id))
            && self.cuisine_id.is_none_or(|id| row.cuisine_id == Some(id))
            && self
                .cooking_time
                .is_none_or(|minutes| row.cooking_time == Some(minutes))
    }
}

/// Sub-resources written together with a recipe.
///
/// `None` leaves the stored set alone, `Some` replaces it. The `recipe_id`
/// of every part is overwritten with the parent's id.
#[derive(Debug, Clone, Default)]
pub struct RecipeParts {
    pub ingredients: Option<Vec<IngredientFields>>,
    pub instructions: Option<Vec<InstructionFields>>,
}

/// Storage operations for the three tables.
///
/// "Not found" is reported as `Ok(None)` or `Ok(false)`; `Err` always means
/// the store itself failed. Recipe writes that touch parts are atomic.
pub trait DataService: Send + Sync + fmt::Debug {
    /// Backend name for logs ("mysql", "memory").
    fn backend_name(&self) -> &'static str;

    fn get_recipe(&self, recipe_id: i32) -> DataResult<Option<RecipeRow>>;
    fn list_recipes(&self, filter: &RecipeFilter, page: Page) -> DataResult<Vec<RecipeRow>>;
    fn count_recipes(&self, filter: &RecipeFilter) -> DataResult<i64>;
    fn create_recipe(
        &self,
        fields: RecipeFields,
        create_time: NaiveDateTime,
        parts: RecipeParts,
    ) -> DataResult<RecipeRow>;
    fn update_recipe(
        &self,
        recipe_id: i32,
        fields: RecipeFields,
        parts: RecipeParts,
    ) -> DataResult<Option<RecipeRow>>;
    /// Deletes the recipe together with its ingredients and instructions.
    fn delete_recipe(&self, recipe_id: i32) -> DataResult<bool>;

    fn get_ingredient(&self, ingredient_id: i32) -> DataResult<Option<IngredientRow>>;
    fn list_ingredients(&self, recipe_id: Option<i32>, page: Page)
        -> DataResult<Vec<IngredientRow>>;
    fn count_ingredients(&self, recipe_id: Option<i32>) -> DataResult<i64>;
    fn ingredients_for_recipe(&self, recipe_id: i32) -> DataResult<Vec<IngredientRow>>;
    fn create_ingredient(&self, fields: IngredientFields) -> DataResult<IngredientRow>;
    fn update_ingredient(
        &self,
        ingredient_id: i32,
        fields: IngredientFields,
    ) -> DataResult<Option<IngredientRow>>;
    fn delete_ingredient(&self, ingredient_id: i32) -> DataResult<bool>;
    fn delete_ingredients_for_recipe(&self, recipe_id: i32) -> DataResult<usize>;

    fn get_instruction(&self, instruction_id: i32) -> DataResult<Option<InstructionRow>>;
    fn list_instructions(
        &self,
        recipe_id: Option<i32>,
        page: Page,
    ) -> DataResult<Vec<InstructionRow>>;
    fn count_instructions(&self, recipe_id: Option<i32>) -> DataResult<i64>;
    fn instructions_for_recipe(&self, recipe_id: i32) -> DataResult<Vec<InstructionRow>>;
    fn create_instruction(&self, fields: InstructionFields) -> DataResult<InstructionRow>;
    fn update_instruction(
        &self,
        instruction_id: i32,
        fields: InstructionFields,
    ) -> DataResult<Option<InstructionRow>>;
    fn delete_instruction(&self, instruction_id: i32) -> DataResult<bool>;
    fn delete_instructions_for_recipe(&self, recipe_id: i32) -> DataResult<usize>;
}

/// Build the configured backend.
pub fn connect(backend: &DataBackend) -> DataResult<Arc<dyn DataService>> {
    match backend {
        DataBackend::Memory => Ok(Arc::new(MemoryDataService::default())),
        #[cfg(feature = "mysql")]
        DataBackend::MySql {
            database_url,
            pool_size,
        } => Ok(Arc::new(MySqlDataService::connect(database_url, *pool_size)?)),
        #[cfg(not(feature = "mysql"))]
        DataBackend::MySql { .. } => Err(DataError::Unavailable(
            "built without the `mysql` feature".to_string(),
        )),
    }
}
