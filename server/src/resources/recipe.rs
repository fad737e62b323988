use chrono::{NaiveDateTime, SubsecRound, Utc};
use std::sync::Arc;

use super::{
    blank, check_length, ingredient, instruction, validate_step_number, ResourceError,
    ResourceResult,
};
use crate::data::{DataService, Page, RecipeFilter, RecipeParts};
use crate::models::{RecipeFields, RecipeRow};
use crate::types::{id_list, RecipeSection, RecipeSectionInput, CREATE_TIME_FORMAT};

pub const MAX_RATING: f64 = 5.0;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_PICTURES_LEN: usize = 1024;

#[derive(Debug, Clone)]
pub struct RecipeResource {
    data: Arc<dyn DataService>,
}

impl RecipeResource {
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self { data }
    }

    /// A recipe with its ingredients and instructions attached.
    pub fn get_by_key(&self, recipe_id: i32) -> ResourceResult<RecipeSection> {
        let row = self
            .data
            .get_recipe(recipe_id)?
            .ok_or(ResourceError::NotFound {
                entity: "recipe",
                id: recipe_id,
            })?;
        self.compose(row)
    }

    /// One page of recipes (without parts) and the number of recipes
    /// matching `filter`.
    pub fn get_page(
        &self,
        page: Page,
        filter: &RecipeFilter,
    ) -> ResourceResult<(Vec<RecipeSection>, i64)> {
        let rows = self.data.list_recipes(filter, page)?;
        let total_count = self.data.count_recipes(filter)?;
        Ok((rows.into_iter().map(to_record).collect(), total_count))
    }

    pub fn create(&self, input: RecipeSectionInput) -> ResourceResult<RecipeSection> {
        let (fields, parts) = validate(input)?;
        let row = self.data.create_recipe(fields, now(), parts)?;
        tracing::info!(recipe_id = row.recipe_id, "created recipe");
        self.compose(row)
    }

    /// Full overwrite of the writable fields. Parts are replaced only when
    /// the input carries them.
    pub fn update(
        &self,
        recipe_id: i32,
        input: RecipeSectionInput,
    ) -> ResourceResult<RecipeSection> {
        let (fields, parts) = validate(input)?;
        let row = self
            .data
            .update_recipe(recipe_id, fields, parts)?
            .ok_or(ResourceError::NotFound {
                entity: "recipe",
                id: recipe_id,
            })?;
        tracing::info!(recipe_id, "updated recipe");
        self.compose(row)
    }

    /// Delete a recipe along with its ingredients and instructions.
    pub fn delete(&self, recipe_id: i32) -> ResourceResult<()> {
        if !self.data.delete_recipe(recipe_id)? {
            return Err(ResourceError::NotFound {
                entity: "recipe",
                id: recipe_id,
            });
        }
        tracing::info!(recipe_id, "deleted recipe");
        Ok(())
    }

    fn compose(&self, row: RecipeRow) -> ResourceResult<RecipeSection> {
        let ingredients = self
            .data
            .ingredients_for_recipe(row.recipe_id)?
            .into_iter()
            .map(ingredient::to_record)
            .collect();
        let instructions = self
            .data
            .instructions_for_recipe(row.recipe_id)?
            .into_iter()
            .map(instruction::to_record)
            .collect();

        let mut record = to_record(row);
        record.ingredients = Some(ingredients);
        record.instructions = Some(instructions);
        Ok(record)
    }
}

/// Current UTC time at second precision.
fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

fn validate(input: RecipeSectionInput) -> ResourceResult<(RecipeFields, RecipeParts)> {
    if blank(&input.recipe_name) {
        return Err(ResourceError::Validation(
            "recipe_name is required".to_string(),
        ));
    }
    let recipe_name = input.recipe_name.as_deref().map(str::trim);
    check_length("recipe_name", recipe_name, MAX_NAME_LEN)?;
    check_length("pictures", input.pictures.as_deref(), MAX_PICTURES_LEN)?;
    if let Some(rating) = input.rating {
        if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
            return Err(ResourceError::Validation(format!(
                "rating must be between 0 and {}",
                MAX_RATING
            )));
        }
    }
    if let Some(minutes) = input.cooking_time {
        if minutes < 0 {
            return Err(ResourceError::Validation(
                "cooking_time must not be negative".to_string(),
            ));
        }
    }
    if let Some(steps) = &input.instructions {
        for step in steps {
            validate_step_number(step.step_number)?;
        }
    }

    // Parts get the parent's id from the store.
    let parts = RecipeParts {
        ingredients: input
            .ingredients
            .map(|list| {
                list.into_iter()
                    .map(|part| ingredient::to_fields(0, part))
                    .collect::<ResourceResult<Vec<_>>>()
            })
            .transpose()?,
        instructions: input.instructions.map(|list| {
            list.into_iter()
                .map(|part| instruction::to_fields(0, part))
                .collect()
        }),
    };

    let fields = RecipeFields {
        recipe_name: input.recipe_name.map(|name| name.trim().to_string()),
        user_id: input.user_id,
        content: input.content,
        rating: input.rating,
        cuisine_id: input.cuisine_id,
        ingredient_id: id_list::to_stored(&input.ingredient_id),
        comment: id_list::to_stored(&input.comment),
        cooking_time: input.cooking_time,
        pictures: input.pictures.filter(|p| !p.is_empty()),
    };

    Ok((fields, parts))
}

fn to_record(row: RecipeRow) -> RecipeSection {
    RecipeSection {
        recipe_id: row.recipe_id,
        recipe_name: row.recipe_name,
        user_id: row.user_id,
        content: row.content,
        rating: row.rating,
        cuisine_id: row.cuisine_id,
        ingredient_id: id_list::from_stored(row.ingredient_id.as_deref()),
        comment: id_list::from_stored(row.comment.as_deref()),
        cooking_time: row.cooking_time,
        create_time: row
            .create_time
            .map(|t| t.format(CREATE_TIME_FORMAT).to_string()),
        pictures: row.pictures,
        ingredients: None,
        instructions: None,
        links: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryDataService;
    use crate::types::{IngredientInput, InstructionInput};

    fn resource() -> RecipeResource {
        RecipeResource::new(Arc::new(MemoryDataService::default()))
    }

    fn pasta() -> RecipeSectionInput {
        RecipeSectionInput {
            recipe_name: Some("Pasta".to_string()),
            user_id: Some(1),
            cuisine_id: Some(2),
            rating: Some(4.5),
            cooking_time: Some(20),
            ingredient_id: vec![1, 2, 3],
            ingredients: Some(vec![IngredientInput {
                name: Some("spaghetti".to_string()),
                ..Default::default()
            }]),
            instructions: Some(vec![InstructionInput {
                step_number: Some(1),
                description: Some("Boil water".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_composes_parts() {
        let resource = resource();
        let created = resource.create(pasta()).unwrap();

        assert_eq!(created.ingredient_id, vec![1, 2, 3]);
        let ingredients = created.ingredients.as_ref().unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0].recipe_id, created.recipe_id);
        assert_eq!(created.instructions.as_ref().unwrap().len(), 1);

        let create_time = created.create_time.as_deref().unwrap();
        assert!(NaiveDateTime::parse_from_str(create_time, CREATE_TIME_FORMAT).is_ok());

        assert_eq!(resource.get_by_key(created.recipe_id).unwrap(), created);
    }

    #[test]
    fn test_update_overwrites_and_keeps_create_time() {
        let resource = resource();
        let created = resource.create(pasta()).unwrap();

        let updated = resource
            .update(
                created.recipe_id,
                RecipeSectionInput {
                    recipe_name: Some("Updated Pasta".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.recipe_name.as_deref(), Some("Updated Pasta"));
        assert_eq!(updated.rating, None);
        assert!(updated.ingredient_id.is_empty());
        assert_eq!(updated.create_time, created.create_time);
        // parts absent from the body are left alone
        assert_eq!(updated.ingredients, created.ingredients);
    }

    #[test]
    fn test_update_with_empty_parts_clears_them() {
        let resource = resource();
        let created = resource.create(pasta()).unwrap();
        let mut input = pasta();
        input.ingredients = Some(vec![]);
        let updated = resource.update(created.recipe_id, input).unwrap();
        assert_eq!(updated.ingredients, Some(vec![]));
        assert_eq!(updated.instructions.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_recipe() {
        let resource = resource();
        assert!(matches!(
            resource.get_by_key(999),
            Err(ResourceError::NotFound { entity: "recipe", id: 999 })
        ));
        assert!(matches!(
            resource.update(999, pasta()),
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            resource.delete(999),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_then_get() {
        let resource = resource();
        let created = resource.create(pasta()).unwrap();
        resource.delete(created.recipe_id).unwrap();
        assert!(matches!(
            resource.get_by_key(created.recipe_id),
            Err(ResourceError::NotFound { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let resource = resource();
        let cases = [
            RecipeSectionInput {
                recipe_name: Some("   ".to_string()),
                ..Default::default()
            },
            RecipeSectionInput {
                rating: Some(5.5),
                ..pasta()
            },
            RecipeSectionInput {
                rating: Some(f64::NAN),
                ..pasta()
            },
            RecipeSectionInput {
                cooking_time: Some(-1),
                ..pasta()
            },
            RecipeSectionInput {
                instructions: Some(vec![InstructionInput {
                    step_number: Some(0),
                    ..Default::default()
                }]),
                ..pasta()
            },
                   RecipeSectionInput {
                recipe_name: Some("p".repeat(MAX_NAME_LEN + 1)),
                ..pasta()
            },
            RecipeSectionInput {
                pictures: Some("x".repeat(MAX_PICTURES_LEN + 1)),
                ..pasta()
            },
            RecipeSectionInput {
                ingredients: Some(vec![IngredientInput {
                    unit: Some("u".repeat(65)),
                    ..Default::default()
                }]),
                ..pasta()
            },
        ];
        for input in cases {
            assert!(matches!(
                resource.create(input),
                Err(ResourceError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_name_length_is_measured_after_trim() {
        let resource = resource();
        let padded = format!("  {}  ", "p".repeat(MAX_NAME_LEN));
        let created = resource
            .create(RecipeSectionInput {
                recipe_name: Some(padded),
                ..pasta()
            })
            .unwrap();
        assert_eq!(created.recipe_name.map(|n| n.len()), Some(MAX_NAME_LEN));
    }

    #[test]
    fn test_page_applies_filter_and_counts() {
        let resource = resource();
        for cuisine_id in [1, 2, 2] {
            resource
                .create(RecipeSectionInput {
                    cuisine_id: Some(cuisine_id),
                    ..pasta()
                })
                .unwrap();
        }

        let filter = RecipeFilter {
            cuisine_id: Some(2),
            ..Default::default()
        };
        let (rows, total) = resource
            .get_page(Page { offset: 0, limit: 1 }, &filter)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(total, 2);
        assert!(rows[0].ingredients.is_none());
    }
}
