//! Resources sit between the HTTP handlers and the data service. They
//! validate input, map wire records to rows and back, and compose a recipe
//! with its ingredients and instructions.

mod ingredient;
mod instruction;
mod recipe;

pub use ingredient::IngredientResource;
pub use instruction::InstructionResource;
pub use recipe::RecipeResource;

use thiserror::Error;

use crate::data::DataError;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Persistence(#[from] DataError),
}

pub type ResourceResult<T> = Result<T, ResourceError>;

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Reject a value longer than its column, counted in characters.
fn check_length(field: &str, value: Option<&str>, max: usize) -> ResourceResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ResourceError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

fn validate_step_number(step_number: Option<i32>) -> ResourceResult<()> {
    match step_number {
        Some(step) if step < 1 => Err(ResourceError::Validation(format!(
            "step_number must be at least 1, got {}",
            step
        ))),
        _ => Ok(()),
    }
}
