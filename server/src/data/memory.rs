//! In-process backend.
//!
//! Tables live behind one mutex, so every operation (including a recipe with
//! its parts) is applied atomically. Ids start at 1 and are never reused.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{DataError, DataResult, DataService, Page, RecipeFilter, RecipeParts};
use crate::models::{
    IngredientFields, IngredientRow, InstructionFields, InstructionRow, RecipeFields, RecipeRow,
};

#[derive(Debug, Default)]
struct Tables {
    recipes: BTreeMap<i32, RecipeRow>,
    ingredients: BTreeMap<i32, IngredientRow>,
    instructions: BTreeMap<i32, InstructionRow>,
    last_recipe_id: i32,
    last_ingredient_id: i32,
    last_instruction_id: i32,
}

impl Tables {
    fn require_recipe(&self, recipe_id: i32) -> DataResult<()> {
        if self.recipes.contains_key(&recipe_id) {
            Ok(())
        } else {
            Err(DataError::ForeignKey(format!(
                "recipe_id {} does not reference an existing recipe",
                recipe_id
            )))
        }
    }

    fn insert_ingredient(&mut self, fields: IngredientFields) -> IngredientRow {
        self.last_ingredient_id += 1;
        let row = IngredientRow::from_fields(self.last_ingredient_id, fields);
        self.ingredients.insert(row.ingredient_id, row.clone());
        row
    }

    fn insert_instruction(&mut self, fields: InstructionFields) -> InstructionRow {
        self.last_instruction_id += 1;
        let row = InstructionRow::from_fields(self.last_instruction_id, fields);
        self.instructions.insert(row.instruction_id, row.clone());
        row
    }

    fn remove_ingredients_of(&mut self, recipe_id: i32) -> usize {
        let before = self.ingredients.len();
        self.ingredients.retain(|_, row| row.recipe_id != recipe_id);
        before - self.ingredients.len()
    }

    fn remove_instructions_of(&mut self, recipe_id: i32) -> usize {
        let before = self.instructions.len();
        self.instructions.retain(|_, row| row.recipe_id != recipe_id);
        before - self.instructions.len()
    }

    fn write_parts(&mut self, recipe_id: i32, parts: RecipeParts) {
        if let Some(ingredients) = parts.ingredients {
            self.remove_ingredients_of(recipe_id);
            for mut fields in ingredients {
                fields.recipe_id = recipe_id;
                self.insert_ingredient(fields);
            }
        }
        if let Some(instructions) = parts.instructions {
            self.remove_instructions_of(recipe_id);
            for mut fields in instructions {
                fields.recipe_id = recipe_id;
                self.insert_instruction(fields);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryDataService {
    tables: Mutex<Tables>,
}

impl MemoryDataService {
    fn tables(&self) -> DataResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| {
            tracing::error!("memory store lock poisoned");
            DataError::Connection("memory store lock poisoned".to_string())
        })
    }
}

fn page_of<T>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Instructions are kept in step order; unnumbered steps go last.
fn step_order(a: &InstructionRow, b: &InstructionRow) -> std::cmp::Ordering {
    let key = |row: &InstructionRow| (row.step_number.is_none(), row.step_number, row.instruction_id);
    key(a).cmp(&key(b))
}

impl DataService for MemoryDataService {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn get_recipe(&self, recipe_id: i32) -> DataResult<Option<RecipeRow>> {
        Ok(self.tables()?.recipes.get(&recipe_id).cloned())
    }

    fn list_recipes(&self, filter: &RecipeFilter, page: Page) -> DataResult<Vec<RecipeRow>> {
        let tables = self.tables()?;
        let matching = tables.recipes.values().filter(|row| filter.matches(row)).cloned();
        Ok(page_of(matching, page))
    }

    fn count_recipes(&self, filter: &RecipeFilter) -> DataResult<i64> {
        let tables = self.tables()?;
        Ok(count(
            tables.recipes.values().filter(|row| filter.matches(row)).count(),
        ))
    }

    fn create_recipe(
        &self,
        fields: RecipeFields,
        create_time: NaiveDateTime,
        parts: RecipeParts,
    ) -> DataResult<RecipeRow> {
        let mut tables = self.tables()?;
        tables.last_recipe_id += 1;
        let row = RecipeRow::from_fields(tables.last_recipe_id, fields, create_time);
        tables.recipes.insert(row.recipe_id, row.clone());
        tables.write_parts(row.recipe_id, parts);
        Ok(row)
    }

    fn update_recipe(
        &self,
        recipe_id: i32,
        fields: RecipeFields,
        parts: RecipeParts,
    ) -> DataResult<Option<RecipeRow>> {
        let mut tables = self.tables()?;
        let Some(row) = tables.recipes.get_mut(&recipe_id) else {
            return Ok(None);
        };
        row.overwrite(fields);
        let row = row.clone();
        tables.write_parts(recipe_id, parts);
        Ok(Some(row))
    }

    fn delete_recipe(&self, recipe_id: i32) -> DataResult<bool> {
        let mut tables = self.tables()?;
        if tables.recipes.remove(&recipe_id).is_none() {
            return Ok(false);
        }
        tables.remove_ingredients_of(recipe_id);
        tables.remove_instructions_of(recipe_id);
        Ok(true)
    }

    fn get_ingredient(&self, ingredient_id: i32) -> DataResult<Option<IngredientRow>> {
        Ok(self.tables()?.ingredients.get(&ingredient_id).cloned())
    }

    fn list_ingredients(
        &self,
        recipe_id: Option<i32>,
        page: Page,
    ) -> DataResult<Vec<IngredientRow>> {
        let tables = self.tables()?;
        let matching = tables
            .ingredients
            .values()
            .filter(|row| recipe_id.is_none_or(|id| row.recipe_id == id))
            .cloned();
        Ok(page_of(matching, page))
    }

    fn count_ingredients(&self, recipe_id: Option<i32>) -> DataResult<i64> {
        let tables = self.tables()?;
        Ok(count(
            tables
                .ingredients
                .values()
                .filter(|row| recipe_id.is_none_or(|id| row.recipe_id == id))
                .count(),
        ))
    }

    fn ingredients_for_recipe(&self, recipe_id: i32) -> DataResult<Vec<IngredientRow>> {
        let tables = self.tables()?;
        Ok(tables
            .ingredients
            .values()
            .filter(|row| row.recipe_id == recipe_id)
            .cloned()
            .collect())
    }

    fn create_ingredient(&self, fields: IngredientFields) -> DataResult<IngredientRow> {
        let mut tables = self.tables()?;
        tables.require_recipe(fields.recipe_id)?;
        Ok(tables.insert_ingredient(fields))
    }

    fn update_ingredient(
        &self,
        ingredient_id: i32,
        fields: IngredientFields,
    ) -> DataResult<Option<IngredientRow>> {
        let mut tables = self.tables()?;
        if !tables.ingredients.contains_key(&ingredient_id) {
            return Ok(None);
        }
        tables.require_recipe(fields.recipe_id)?;
        let row = IngredientRow::from_fields(ingredient_id, fields);
        tables.ingredients.insert(ingredient_id, row.clone());
        Ok(Some(row))
    }

    fn delete_ingredient(&self, ingredient_id: i32) -> DataResult<bool> {
        Ok(self.tables()?.ingredients.remove(&ingredient_id).is_some())
    }

    fn delete_ingredients_for_recipe(&self, recipe_id: i32) -> DataResult<usize> {
        Ok(self.tables()?.remove_ingredients_of(recipe_id))
    }

    fn get_instruction(&self, instruction_id: i32) -> DataResult<Option<InstructionRow>> {
        Ok(self.tables()?.instructions.get(&instruction_id).cloned())
    }

    fn list_instructions(
        &self,
        recipe_id: Option<i32>,
        page: Page,
    ) -> DataResult<Vec<InstructionRow>> {
        let tables = self.tables()?;
        let mut matching: Vec<InstructionRow> = tables
            .instructions
            .values()
            .filter(|row| recipe_id.is_none_or(|id| row.recipe_id == id))
            .cloned()
            .collect();
        matching.sort_by(step_order);
        Ok(page_of(matching.into_iter(), page))
    }

    fn count_instructions(&self, recipe_id: Option<i32>) -> DataResult<i64> {
        let tables = self.tables()?;
        Ok(count(
            tables
                .instructions
                .values()
                .filter(|row| recipe_id.is_none_or(|id| row.recipe_id == id))
                .count(),
        ))
    }

    fn instructions_for_recipe(&self, recipe_id: i32) -> DataResult<Vec<InstructionRow>> {
        let tables = self.tables()?;
        let mut rows: Vec<InstructionRow> = tables
            .instructions
            .values()
            .filter(|row| row.recipe_id == recipe_id)
            .cloned()
            .collect();
        rows.sort_by(step_order);
        Ok(rows)
    }

    fn create_instruction(&self, fields: InstructionFields) -> DataResult<InstructionRow> {
        let mut tables = self.tables()?;
        tables.require_recipe(fields.recipe_id)?;
        Ok(tables.insert_instruction(fields))
    }

    fn update_instruction(
        &self,
        instruction_id: i32,
        fields: InstructionFields,
    ) -> DataResult<Option<InstructionRow>> {
        let mut tables = self.tables()?;
        if !tables.instructions.contains_key(&instruction_id) {
            return Ok(None);
        }
        tables.require_recipe(fields.recipe_id)?;
        let row = InstructionRow::from_fields(instruction_id, fields);
        tables.instructions.insert(instruction_id, row.clone());
        Ok(Some(row))
    }

    fn delete_instruction(&self, instruction_id: i32) -> DataResult<bool> {
        Ok(self.tables()?.instructions.remove(&instruction_id).is_some())
    }

    fn delete_instructions_for_recipe(&self, recipe_id: i32) -> DataResult<usize> {
        Ok(self.tables()?.remove_instructions_of(recipe_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn created_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 27)
            .unwrap()
            .and_hms_opt(9, 54, 51)
            .unwrap()
    }

    fn recipe(name: &str, cuisine_id: i32) -> RecipeFields {
        RecipeFields {
            recipe_name: Some(name.to_string()),
            cuisine_id: Some(cuisine_id),
            ..Default::default()
        }
    }

    fn ingredient(name: &str) -> IngredientFields {
        IngredientFields {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn step(number: i32, text: &str) -> InstructionFields {
        InstructionFields {
            step_number: Some(number),
            description: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let store = MemoryDataService::default();
        let first = store
            .create_recipe(recipe("Pasta", 2), created_at(), RecipeParts::default())
            .unwrap();
        let second = store
            .create_recipe(recipe("Soup", 3), created_at(), RecipeParts::default())
            .unwrap();
        assert_eq!(first.recipe_id, 1);
        assert_eq!(second.recipe_id, 2);
        assert_eq!(first.create_time, Some(created_at()));
    }

    #[test]
    fn test_create_stamps_parent_id_on_parts() {
        let store = MemoryDataService::default();
        let parts = RecipeParts {
            ingredients: Some(vec![ingredient("flour"), ingredient("eggs")]),
            instructions: Some(vec![step(1, "Mix")]),
        };
        let row = store
            .create_recipe(recipe("Pasta", 2), created_at(), parts)
            .unwrap();

        let ingredients = store.ingredients_for_recipe(row.recipe_id).unwrap();
        assert_eq!(ingredients.len(), 2);
        assert!(ingredients.iter().all(|i| i.recipe_id == row.recipe_id));
        assert_eq!(store.instructions_for_recipe(row.recipe_id).unwrap().len(), 1);
    }

    #[test]
    fn test_update_keeps_create_time_and_untouched_parts() {
        let store = MemoryDataService::default();
        let parts = RecipeParts {
            ingredients: Some(vec![ingredient("flour")]),
            instructions: Some(vec![step(1, "Mix")]),
        };
        let row = store
            .create_recipe(recipe("Pasta", 2), created_at(), parts)
            .unwrap();

        let replace_steps = RecipeParts {
            ingredients: None,
            instructions: Some(vec![step(1, "Boil"), step(2, "Drain")]),
        };
        let updated = store
            .update_recipe(row.recipe_id, recipe("Better Pasta", 2), replace_steps)
            .unwrap()
            .unwrap();

        assert_eq!(updated.recipe_name.as_deref(), Some("Better Pasta"));
        assert_eq!(updated.create_time, Some(created_at()));
        assert_eq!(store.ingredients_for_recipe(row.recipe_id).unwrap().len(), 1);
        let steps = store.instructions_for_recipe(row.recipe_id).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].description.as_deref(), Some("Boil"));
    }

    #[test]
    fn test_update_missing_recipe_is_none() {
        let store = MemoryDataService::default();
        let result = store
            .update_recipe(42, recipe("Ghost", 1), RecipeParts::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_cascades_to_parts() {
        let store = MemoryDataService::default();
        let parts = RecipeParts {
            ingredients: Some(vec![ingredient("flour")]),
            instructions: Some(vec![step(1, "Mix")]),
        };
        let row = store
            .create_recipe(recipe("Pasta", 2), created_at(), parts)
            .unwrap();

        assert!(store.delete_recipe(row.recipe_id).unwrap());
        assert!(store.get_recipe(row.recipe_id).unwrap().is_none());
        assert_eq!(store.count_ingredients(None).unwrap(), 0);
        assert_eq!(store.count_instructions(None).unwrap(), 0);
        assert!(!store.delete_recipe(row.recipe_id).unwrap());
    }

    #[test]
    fn test_filter_and_page() {
        let store = MemoryDataService::default();
        for i in 0..7 {
            let cuisine = if i % 2 == 0 { 1 } else { 2 };
            store
                .create_recipe(recipe(&format!("R{}", i), cuisine), created_at(), RecipeParts::default())
                .unwrap();
        }
        let italian = RecipeFilter {
            cuisine_id: Some(1),
            ..Default::default()
        };
        assert_eq!(store.count_recipes(&italian).unwrap(), 4);
        assert_eq!(store.count_recipes(&RecipeFilter::default()).unwrap(), 7);

        let page = store
            .list_recipes(&italian, Page { offset: 1, limit: 2 })
            .unwrap();
        let names: Vec<_> = page.iter().filter_map(|r| r.recipe_name.as_deref()).collect();
        assert_eq!(names, vec!["R2", "R4"]);
    }

    #[test]
    fn test_sub_resource_requires_existing_parent() {
        let store = MemoryDataService::default();
        let orphan = IngredientFields {
            recipe_id: 99,
            ..ingredient("salt")
        };
        assert!(matches!(
            store.create_ingredient(orphan),
            Err(DataError::ForeignKey(_))
        ));
    }

    #[test]
    fn test_instructions_sorted_by_step() {
        let store = MemoryDataService::default();
        let row = store
            .create_recipe(recipe("Pasta", 2), created_at(), RecipeParts::default())
            .unwrap();
        for (n, text) in [(3, "Serve"), (1, "Boil"), (2, "Drain")] {
            store
                .create_instruction(InstructionFields {
                    recipe_id: row.recipe_id,
                    ..step(n, text)
                })
                .unwrap();
        }
        let steps: Vec<_> = store
            .instructions_for_recipe(row.recipe_id)
            .unwrap()
            .into_iter()
            .filter_map(|s| s.step_number)
            .collect();
        assert_eq!(steps, vec![1, 2, 3]);
    }
}
