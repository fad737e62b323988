//! Wire records shared by the resources and the HTTP layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Format of `create_time` in responses.
pub const CREATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Hypermedia link attached to a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub rel: String,
    pub href: String,
    pub method: String,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>, method: &str) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            method: method.to_string(),
        }
    }
}

/// A recipe as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecipeSection {
    pub recipe_id: i32,
    pub recipe_name: Option<String>,
    pub user_id: Option<i32>,
    pub content: Option<String>,
    pub rating: Option<f64>,
    pub cuisine_id: Option<i32>,
    pub ingredient_id: Vec<i32>,
    pub comment: Vec<i32>,
    pub cooking_time: Option<i32>,
    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    #[schema(example = "2024-05-01T12:30:00")]
    pub create_time: Option<String>,
    /// Public URL of the recipe picture
    pub pictures: Option<String>,
    /// Present on single-recipe reads and writes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<IngredientRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<InstructionRecord>>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IngredientRecord {
    pub ingredient_id: i32,
    pub recipe_id: i32,
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub note: Option<String>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InstructionRecord {
    pub instruction_id: i32,
    pub recipe_id: i32,
    pub step_number: Option<i32>,
    pub description: Option<String>,
    pub links: Vec<Link>,
}

/// Request body for creating or replacing a recipe.
///
/// `recipe_id`, `create_time` and `links` may be sent back as received and
/// are ignored. Absent `ingredients`/`instructions` leave the stored parts
/// alone on update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeSectionInput {
    #[serde(default)]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub cuisine_id: Option<i32>,
    /// List of ids; a comma-joined string is also accepted
    #[serde(default, deserialize_with = "id_list::deserialize")]
    #[schema(value_type = Vec<i32>)]
    pub ingredient_id: Vec<i32>,
    #[serde(default, deserialize_with = "id_list::deserialize")]
    #[schema(value_type = Vec<i32>)]
    pub comment: Vec<i32>,
    #[serde(default)]
    pub cooking_time: Option<i32>,
    /// Object name or public URL of an uploaded picture
    #[serde(default)]
    pub pictures: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientInput>>,
    #[serde(default)]
    pub instructions: Option<Vec<InstructionInput>>,
}

/// Request body for an ingredient. Inside a recipe body or under
/// `/recipes_sections/{id}/ingredients` the `recipe_id` comes from the parent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IngredientInput {
    #[serde(default)]
    pub recipe_id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct InstructionInput {
    #[serde(default)]
    pub recipe_id: Option<i32>,
    #[serde(default)]
    pub step_number: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Pagination {
    /// Number of items skipped
    pub offset: i64,
    /// Number of items requested
    pub limit: i64,
    /// Number of items matching the filter
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedRecipeResponse {
    pub data: Vec<RecipeSection>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedIngredientResponse {
    pub data: Vec<IngredientRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedInstructionResponse {
    pub data: Vec<InstructionRecord>,
    pub pagination: Pagination,
}

/// Id lists (`ingredient_id`, `comment`) are JSON lists on the wire and
/// comma-joined text in the store.
pub mod id_list {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<i32>),
        Joined(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(Vec::new()),
            Some(Repr::List(ids)) => Ok(ids),
            Some(Repr::Joined(text)) => parse(&text).map_err(de::Error::custom),
        }
    }

    /// Strict parse of `"1, 2, 3"`. Blank input is an empty list.
    pub fn parse(text: &str) -> Result<Vec<i32>, String> {
        text.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i32>()
                    .map_err(|_| format!("invalid id '{}' in id list", part))
            })
            .collect()
    }

    /// Parse a stored value, skipping anything that is not an id.
    pub fn from_stored(stored: Option<&str>) -> Vec<i32> {
        stored
            .map(|text| {
                text.split(',')
                    .filter_map(|part| part.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Storage encoding; an empty list is stored as NULL.
    pub fn to_stored(ids: &[i32]) -> Option<String> {
        if ids.is_empty() {
            return None;
        }
        Some(
            ids.iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_list_accepts_list_and_legacy_string() {
        let input: RecipeSectionInput = serde_json::from_value(json!({
            "recipe_name": "Pasta",
            "ingredient_id": [1, 2, 3],
            "comment": "4, 5"
        }))
        .unwrap();
        assert_eq!(input.ingredient_id, vec![1, 2, 3]);
        assert_eq!(input.comment, vec![4, 5]);
    }

    #[test]
    fn test_id_list_null_and_missing_are_empty() {
        let input: RecipeSectionInput =
            serde_json::from_value(json!({"recipe_name": "Pasta", "comment": null})).unwrap();
        assert!(input.ingredient_id.is_empty());
        assert!(input.comment.is_empty());
    }

    #[test]
    fn test_id_list_rejects_free_text() {
        let result: Result<RecipeSectionInput, _> =
            serde_json::from_value(json!({"recipe_name": "Pasta", "comment": "Delicious!"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_id_list_storage_encoding() {
        assert_eq!(id_list::to_stored(&[1, 2, 3]).as_deref(), Some("1,2,3"));
        assert_eq!(id_list::to_stored(&[]), None);
        assert_eq!(id_list::from_stored(Some("1, 2,3")), vec![1, 2, 3]);
        assert_eq!(id_list::from_stored(Some("Delicious!")), Vec::<i32>::new());
        assert_eq!(id_list::from_stored(None), Vec::<i32>::new());
        assert_eq!(id_list::parse(" "), Ok(vec![]));
    }

    #[test]
    fn test_recipe_input_ignores_server_fields() {
        let input: RecipeSectionInput = serde_json::from_value(json!({
            "recipe_id": 99,
            "recipe_name": "Pasta",
            "create_time": "2020-01-01T00:00:00",
            "links": []
        }))
        .unwrap();
        assert_eq!(input.recipe_name.as_deref(), Some("Pasta"));
        assert!(input.ingredients.is_none());
    }

    #[test]
    fn test_parts_are_omitted_when_absent() {
        let record = RecipeSection {
            recipe_id: 1,
            recipe_name: Some("Pasta".to_string()),
            user_id: None,
            content: None,
            rating: None,
            cuisine_id: None,
            ingredient_id: vec![],
            comment: vec![],
            cooking_time: None,
            create_time: None,
            pictures: None,
            ingredients: None,
            instructions: None,
            links: vec![],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("ingredients").is_none());
        assert_eq!(value["ingredient_id"], json!([]));
    }
}
