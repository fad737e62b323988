use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::{ingredients, instructions, recipe_sections};

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = recipe_sections)]
pub struct RecipeRow {
    pub recipe_id: i32,
    pub recipe_name: Option<String>,
    pub user_id: Option<i32>,
    pub content: Option<String>,
    pub rating: Option<f64>,
    pub cuisine_id: Option<i32>,
    /// Comma-joined ingredient ids
    pub ingredient_id: Option<String>,
    /// Comma-joined comment ids
    pub comment: Option<String>,
    pub cooking_time: Option<i32>,
    pub create_time: Option<NaiveDateTime>,
    pub pictures: Option<String>,
}

/// Writable recipe columns. The store assigns `recipe_id`, and `create_time`
/// is only ever written by `create_recipe`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFields {
    pub recipe_name: Option<String>,
    pub user_id: Option<i32>,
    pub content: Option<String>,
    pub rating: Option<f64>,
    pub cuisine_id: Option<i32>,
    pub ingredient_id: Option<String>,
    pub comment: Option<String>,
    pub cooking_time: Option<i32>,
    pub pictures: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_sections)]
pub struct NewRecipe<'a> {
    pub recipe_name: Option<&'a str>,
    pub user_id: Option<i32>,
    pub content: Option<&'a str>,
    pub rating: Option<f64>,
    pub cuisine_id: Option<i32>,
    pub ingredient_id: Option<&'a str>,
    pub comment: Option<&'a str>,
    pub cooking_time: Option<i32>,
    pub create_time: Option<NaiveDateTime>,
    pub pictures: Option<&'a str>,
}

impl RecipeFields {
    pub fn as_insert(&self, create_time: NaiveDateTime) -> NewRecipe<'_> {
        NewRecipe {
            recipe_name: self.recipe_name.as_deref(),
            user_id: self.user_id,
            content: self.content.as_deref(),
            rating: self.rating,
            cuisine_id: self.cuisine_id,
            ingredient_id: self.ingredient_id.as_deref(),
            comment: self.comment.as_deref(),
            cooking_time: self.cooking_time,
            create_time: Some(create_time),
            pictures: self.pictures.as_deref(),
        }
    }
}

impl RecipeRow {
    pub fn from_fields(recipe_id: i32, fields: RecipeFields, create_time: NaiveDateTime) -> Self {
        let mut row = Self {
            recipe_id,
            recipe_name: None,
            user_id: None,
            content: None,
            rating: None,
            cuisine_id: None,
            ingredient_id: None,
            comment: None,
            cooking_time: None,
            create_time: Some(create_time),
            pictures: None,
        };
        row.overwrite(fields);
        row
    }

    /// Full-field overwrite; leaves the key and creation time alone.
    pub fn overwrite(&mut self, fields: RecipeFields) {
        self.recipe_name = fields.recipe_name;
        self.user_id = fields.user_id;
        self.content = fields.content;
        self.rating = fields.rating;
        self.cuisine_id = fields.cuisine_id;
        self.ingredient_id = fields.ingredient_id;
        self.comment = fields.comment;
        self.cooking_time = fields.cooking_time;
        self.pictures = fields.pictures;
    }
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = ingredients)]
pub struct IngredientRow {
    pub ingredient_id: i32,
    pub recipe_id: i32,
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub note: Option<String>,
}

#[derive(Insertable, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = ingredients)]
pub struct IngredientFields {
    pub recipe_id: i32,
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub note: Option<String>,
}

impl IngredientRow {
    pub fn from_fields(ingredient_id: i32, fields: IngredientFields) -> Self {
        Self {
            ingredient_id,
            recipe_id: fields.recipe_id,
            name: fields.name,
            quantity: fields.quantity,
            unit: fields.unit,
            note: fields.note,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = instructions)]
pub struct InstructionRow {
    pub instruction_id: i32,
    pub recipe_id: i32,
    pub step_number: Option<i32>,
    pub description: Option<String>,
}

#[derive(Insertable, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = instructions)]
pub struct InstructionFields {
    pub recipe_id: i32,
    pub step_number: Option<i32>,
    pub description: Option<String>,
}

impl InstructionRow {
    pub fn from_fields(instruction_id: i32, fields: InstructionFields) -> Self {
        Self {
            instruction_id,
            recipe_id: fields.recipe_id,
            step_number: fields.step_number,
            description: fields.description,
        }
    }
}
