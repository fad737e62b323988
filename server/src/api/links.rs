//! Link annotations and picture URLs added to records on the way out.

use crate::storage::ImageStore;
use crate::types::{IngredientRecord, InstructionRecord, Link, RecipeSection};

const RECIPES: &str = "/recipes_sections";

pub fn recipe_href(recipe_id: i32) -> String {
    format!("{}/{}", RECIPES, recipe_id)
}

pub fn recipe_links(recipe_id: i32) -> Vec<Link> {
    let href = recipe_href(recipe_id);
    vec![
        Link::new("self", href.clone(), "GET"),
        Link::new("update", href.clone(), "PUT"),
        Link::new("delete", href.clone(), "DELETE"),
        Link::new("comments", format!("{}/comments", href), "GET"),
        Link::new("ingredients", format!("{}/ingredients", href), "GET"),
        Link::new("instructions", format!("{}/instructions", href), "GET"),
    ]
}

/// Links returned once a recipe is gone.
pub fn collection_links() -> Vec<Link> {
    vec![
        Link::new("collection", RECIPES, "GET"),
        Link::new("create", RECIPES, "POST"),
    ]
}

pub fn ingredient(mut record: IngredientRecord) -> IngredientRecord {
    record.links = vec![
        Link::new(
            "self",
            format!("/ingredients/{}", record.ingredient_id),
            "GET",
        ),
        Link::new("recipe", recipe_href(record.recipe_id), "GET"),
    ];
    record
}

pub fn instruction(mut record: InstructionRecord) -> InstructionRecord {
    record.links = vec![
        Link::new(
            "self",
            format!("/instructions/{}", record.instruction_id),
            "GET",
        ),
        Link::new("recipe", recipe_href(record.recipe_id), "GET"),
    ];
    record
}

/// Add links to a recipe and its parts, and render `pictures` as a URL.
pub fn recipe(mut record: RecipeSection, images: &dyn ImageStore) -> RecipeSection {
    record.links = recipe_links(record.recipe_id);
    record.pictures = record
        .pictures
        .take()
        .map(|name| images.public_url(&name));
    record.ingredients = record
        .ingredients
        .take()
        .map(|list| list.into_iter().map(ingredient).collect());
    record.instructions = record
        .instructions
        .take()
        .map(|list| list.into_iter().map(instruction).collect());
    record
}
