//! `filter_by` query parsing: comma-separated `column:value` pairs.
//!
//! Example: `filter_by=cuisine_id:2,user_id:1`
//!
//! A `recipe_name` value may contain commas. Inside it, a comma only ends
//! the pair when a known `column:` follows.

use crate::data::RecipeFilter;

/// Columns that may appear in `filter_by`.
pub const FILTER_COLUMNS: &[&str] = &["recipe_name", "user_id", "cuisine_id", "cooking_time"];

pub fn parse_filter(filter_by: &str) -> Result<RecipeFilter, String> {
    let mut filter = RecipeFilter::default();

    for pair in split_pairs(filter_by)
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        let (column, value) = pair
            .split_once(':')
            .map(|(c, v)| (c.trim(), v.trim()))
            .filter(|(c, v)| !c.is_empty() && !v.is_empty())
            .ok_or_else(|| format!("Malformed filter '{}', expected column:value", pair))?;

        match column {
            "recipe_name" => filter.recipe_name = Some(value.to_string()),
            "user_id" => filter.user_id = Some(int_value(column, value)?),
            "cuisine_id" => filter.cuisine_id = Some(int_value(column, value)?),
            "cooking_time" => filter.cooking_time = Some(int_value(column, value)?),
            other => {
                return Err(format!(
                    "Cannot filter on '{}'. Allowed: {}",
                    other,
                    FILTER_COLUMNS.join(", ")
                ))
            }
        }
    }

    Ok(filter)
}

fn split_pairs(filter_by: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut start = 0;
    for (i, _) in filter_by.match_indices(',') {
        let in_name = filter_by[start..i]
            .split_once(':')
            .is_some_and(|(column, _)| column.trim() == "recipe_name");
        let rest = filter_by[i + 1..].trim_start();
        if in_name && !rest.is_empty() && !starts_with_column(rest) {
            continue;
        }
        pairs.push(&filter_by[start..i]);
        start = i + 1;
    }
    pairs.push(&filter_by[start..]);
    pairs
}

fn starts_with_column(text: &str) -> bool {
    FILTER_COLUMNS.iter().any(|column| {
        text.strip_prefix(column)
            .is_some_and(|rest| rest.trim_start().starts_with(':'))
    })
}

fn int_value(column: &str, value: &str) -> Result<i32, String> {
    value
        .parse()
        .map_err(|_| format!("{} must be an integer, got '{}'", column, value))
}
