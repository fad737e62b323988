use std::sync::Arc;

use super::{check_length, ResourceError, ResourceResult};
use crate::data::{DataService, Page};
use crate::models::{IngredientFields, IngredientRow};
use crate::types::{IngredientInput, IngredientRecord};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_QUANTITY_LEN: usize = 64;
pub const MAX_UNIT_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct IngredientResource {
    data: Arc<dyn DataService>,
}

impl IngredientResource {
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self { data }
    }

    pub fn get_by_key(&self, ingredient_id: i32) -> ResourceResult<IngredientRecord> {
        self.data
            .get_ingredient(ingredient_id)?
            .map(to_record)
            .ok_or(ResourceError::NotFound {
                entity: "ingredient",
                id: ingredient_id,
            })
    }

    /// One page of ingredients, optionally of a single recipe, with the total
    /// number of matching rows.
    pub fn get_page(
        &self,
        page: Page,
        recipe_id: Option<i32>,
    ) -> ResourceResult<(Vec<IngredientRecord>, i64)> {
        let rows = self.data.list_ingredients(recipe_id, page)?;
        let total_count = self.data.count_ingredients(recipe_id)?;
        Ok((rows.into_iter().map(to_record).collect(), total_count))
    }

    pub fn get_by_parent_id(&self, recipe_id: i32) -> ResourceResult<Vec<IngredientRecord>> {
        self.require_parent(recipe_id)?;
        Ok(self
            .data
            .ingredients_for_recipe(recipe_id)?
            .into_iter()
            .map(to_record)
            .collect())
    }

    /// Create from a body that names its recipe.
    pub fn create(&self, input: IngredientInput) -> ResourceResult<IngredientRecord> {
        let recipe_id = required_recipe_id(&input)?;
        self.check_parent(recipe_id)?;
        let row = self.data.create_ingredient(to_fields(recipe_id, input)?)?;
        tracing::info!(ingredient_id = row.ingredient_id, recipe_id, "created ingredient");
        Ok(to_record(row))
    }

    /// Create under `recipe_id`; any `recipe_id` in the body is ignored.
    pub fn create_for_parent(
        &self,
        recipe_id: i32,
        input: IngredientInput,
    ) -> ResourceResult<IngredientRecord> {
        self.require_parent(recipe_id)?;
        let row = self.data.create_ingredient(to_fields(recipe_id, input)?)?;
        tracing::info!(ingredient_id = row.ingredient_id, recipe_id, "created ingredient");
        Ok(to_record(row))
    }

    pub fn update(
        &self,
        ingredient_id: i32,
        input: IngredientInput,
    ) -> ResourceResult<IngredientRecord> {
        let recipe_id = required_recipe_id(&input)?;
        let not_found = ResourceError::NotFound {
            entity: "ingredient",
            id: ingredient_id,
        };
        if self.data.get_ingredient(ingredient_id)?.is_none() {
            return Err(not_found);
        }
        self.check_parent(recipe_id)?;
        let fields = to_fields(recipe_id, input)?;
        self.data
            .update_ingredient(ingredient_id, fields)?
            .map(to_record)
            .ok_or(not_found)
    }

    pub fn delete(&self, ingredient_id: i32) -> ResourceResult<()> {
        if self.data.delete_ingredient(ingredient_id)? {
            Ok(())
        } else {
            Err(ResourceError::NotFound {
                entity: "ingredient",
                id: ingredient_id,
            })
        }
    }

    /// Remove every ingredient of a recipe; returns how many were removed.
    pub fn delete_by_parent_id(&self, recipe_id: i32) -> ResourceResult<usize> {
        self.require_parent(recipe_id)?;
        Ok(self.data.delete_ingredients_for_recipe(recipe_id)?)
    }

    /// Missing parent in the path: 404.
    fn require_parent(&self, recipe_id: i32) -> ResourceResult<()> {
        match self.data.get_recipe(recipe_id)? {
            Some(_) => Ok(()),
            None => Err(ResourceError::NotFound {
                entity: "recipe",
                id: recipe_id,
            }),
        }
    }

    /// Missing parent named in the body: 400.
    fn check_parent(&self, recipe_id: i32) -> ResourceResult<()> {
        match self.data.get_recipe(recipe_id)? {
            Some(_) => Ok(()),
            None => Err(ResourceError::Validation(format!(
                "recipe {} not found",
                recipe_id
            ))),
        }
    }
}

fn required_recipe_id(input: &IngredientInput) -> ResourceResult<i32> {
    input
        .recipe_id
        .ok_or_else(|| ResourceError::Validation("recipe_id is required".to_string()))
}

pub(crate) fn to_fields(
    recipe_id: i32,
    input: IngredientInput,
) -> ResourceResult<IngredientFields> {
    check_length("ingredient name", input.name.as_deref(), MAX_NAME_LEN)?;
    check_length("quantity", input.quantity.as_deref(), MAX_QUANTITY_LEN)?;
    check_length("unit", input.unit.as_deref(), MAX_UNIT_LEN)?;
    Ok(IngredientFields {
        recipe_id,
        name: input.name,
        quantity: input.quantity,
        unit: input.unit,
        note: input.note,
    })
}

pub(crate) fn to_record(row: IngredientRow) -> IngredientRecord {
    IngredientRecord {
        ingredient_id: row.ingredient_id,
        recipe_id: row.recipe_id,
        name: row.name,
        quantity: row.quantity,
        unit: row.unit,
        note: row.note,
        links: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemoryDataService, RecipeParts};
    use crate::models::RecipeFields;

    fn setup() -> (IngredientResource, i32) {
        let data = Arc::new(MemoryDataService::default());
        let recipe = data
            .create_recipe(
                RecipeFields {
                    recipe_name: Some("Pancakes".to_string()),
                    ..Default::default()
                },
                chrono::Utc::now().naive_utc(),
                RecipeParts::default(),
            )
            .unwrap();
        (IngredientResource::new(data), recipe.recipe_id)
    }

    fn flour(recipe_id: Option<i32>) -> IngredientInput {
        IngredientInput {
            recipe_id,
            name: Some("flour".to_string()),
            quantity: Some("200".to_string()),
            unit: Some("g".to_string()),
            note: None,
        }
    }

    #[test]
    fn test_create_requires_recipe_id() {
        let (resource, _) = setup();
        assert!(matches!(
            resource.create(flour(None)),
            Err(ResourceError::Validation(msg)) if msg.contains("recipe_id")
        ));
    }

    #[test]
    fn test_create_rejects_unknown_recipe() {
        let (resource, _) = setup();
        assert!(matches!(
            resource.create(flour(Some(404))),
            Err(ResourceError::Validation(_))
        ));
    }

    #[test]
    fn test_create_and_read_back() {
        let (resource, recipe_id) = setup();
        let created = resource.create(flour(Some(recipe_id))).unwrap();
        assert_eq!(created.recipe_id, recipe_id);
        assert_eq!(resource.get_by_key(created.ingredient_id).unwrap(), created);
        assert_eq!(resource.get_by_parent_id(recipe_id).unwrap(), vec![created]);
    }

    #[test]
    fn test_create_for_parent_uses_path_id() {
        let (resource, recipe_id) = setup();
        let created = resource
            .create_for_parent(recipe_id, flour(Some(9999)))
            .unwrap();
        assert_eq!(created.recipe_id, recipe_id);
        assert!(matches!(
            resource.create_for_parent(9999, flour(None)),
            Err(ResourceError::NotFound { entity: "recipe", id: 9999 })
        ));
    }

    #[test]
    fn test_overlong_fields_rejected() {
        let (resource, recipe_id) = setup();
        let long_name = IngredientInput {
            name: Some("f".repeat(MAX_NAME_LEN + 1)),
            ..flour(Some(recipe_id))
        };
        assert!(matches!(
            resource.create(long_name),
            Err(ResourceError::Validation(msg)) if msg.contains("name")
        ));

        let long_unit = IngredientInput {
            unit: Some("g".repeat(MAX_UNIT_LEN + 1)),
            ..flour(None)
        };
        assert!(matches!(
            resource.create_for_parent(recipe_id, long_unit),
            Err(ResourceError::Validation(msg)) if msg.contains("unit")
        ));

        let created = resource.create(flour(Some(recipe_id))).unwrap();
        let long_quantity = IngredientInput {
            quantity: Some("9".repeat(MAX_QUANTITY_LEN + 1)),
            ..flour(Some(recipe_id))
        };
        assert!(matches!(
            resource.update(created.ingredient_id, long_quantity),
            Err(ResourceError::Validation(msg)) if msg.contains("quantity")
        ));
        assert_eq!(resource.get_by_key(created.ingredient_id).unwrap(), created);
    }

    #[test]
    fn test_length_counts_characters() {
        let (resource, recipe_id) = setup();
        let accented = IngredientInput {
            name: Some("é".repeat(MAX_NAME_LEN)),
            ..flour(Some(recipe_id))
        };
        assert!(resource.create(accented).is_ok());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (resource, recipe_id) = setup();
        assert!(matches!(
            resource.update(77, flour(Some(recipe_id))),
            Err(ResourceError::NotFound { entity: "ingredient", id: 77 })
        ));
    }

    #[test]
    fn test_page_counts_per_recipe() {
        let (resource, recipe_id) = setup();
        for _ in 0..3 {
            resource.create(flour(Some(recipe_id))).unwrap();
        }
        let (rows, total) = resource
            .get_page(Page { offset: 1, limit: 1 }, Some(recipe_id))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(total, 3);
        let (_, total) = resource
            .get_page(Page { offset: 0, limit: 10 }, Some(recipe_id + 1))
            .unwrap();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_delete_by_parent_id() {
        let (resource, recipe_id) = setup();
        resource.create(flour(Some(recipe_id))).unwrap();
        resource.create(flour(Some(recipe_id))).unwrap();
        assert_eq!(resource.delete_by_parent_id(recipe_id).unwrap(), 2);
        assert!(resource.get_by_parent_id(recipe_id).unwrap().is_empty());
        assert!(matches!(
            resource.delete_by_parent_id(9999),
            Err(ResourceError::NotFound { .. })
        ));
    }
}
