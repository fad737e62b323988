//! MySQL backend on diesel.
//!
//! Each call checks a connection out of the pool and returns it when the
//! guard drops, on success and on every error path.

use chrono::NaiveDateTime;
use diesel::mysql::Mysql;
use diesel::prelude::*;
use std::fmt;

use super::{DataError, DataResult, DataService, Page, RecipeFilter, RecipeParts};
use crate::db::{self, DbConn, DbPool};
use crate::models::{
    IngredientFields, IngredientRow, InstructionFields, InstructionRow, RecipeFields, RecipeRow,
};
use crate::raw_sql;
use crate::schema::{ingredients, instructions, recipe_sections};

pub struct MySqlDataService {
    pool: DbPool,
}

impl fmt::Debug for MySqlDataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlDataService")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl MySqlDataService {
    pub fn connect(database_url: &str, pool_size: u32) -> DataResult<Self> {
        let pool = db::create_pool(database_url, pool_size)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> DataResult<DbConn> {
        self.pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get database connection");
            DataError::Connection(e.to_string())
        })
    }
}

/// Log a failed operation where it happened and pass the result through.
fn logged<T>(what: &'static str, result: DataResult<T>) -> DataResult<T> {
    if let Err(e) = &result {
        tracing::error!(operation = what, error = %e, "database operation failed");
    }
    result
}

fn recipe_query(filter: &RecipeFilter) -> recipe_sections::BoxedQuery<'static, Mysql> {
    let mut query = recipe_sections::table.into_boxed();
    if let Some(name) = &filter.recipe_name {
        query = query.filter(recipe_sections::recipe_name.eq(name.clone()));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(recipe_sections::user_id.eq(user_id));
    }
    if let Some(cuisine_id) = filter.cuisine_id {
        query = query.filter(recipe_sections::cuisine_id.eq(cuisine_id));
    }
    if let Some(cooking_time) = filter.cooking_time {
        query = query.filter(recipe_sections::cooking_time.eq(cooking_time));
    }
    query
}

fn ingredient_query(recipe_id: Option<i32>) -> ingredients::BoxedQuery<'static, Mysql> {
    let mut query = ingredients::table.into_boxed();
    if let Some(recipe_id) = recipe_id {
        query = query.filter(ingredients::recipe_id.eq(recipe_id));
    }
    query
}

fn instruction_query(recipe_id: Option<i32>) -> instructions::BoxedQuery<'static, Mysql> {
    let mut query = instructions::table.into_boxed();
    if let Some(recipe_id) = recipe_id {
        query = query.filter(instructions::recipe_id.eq(recipe_id));
    }
    query
}

fn last_inserted_id(conn: &mut MysqlConnection) -> DataResult<i32> {
    let id: u64 = diesel::select(raw_sql::last_insert_id()).get_result(conn)?;
    i32::try_from(id).map_err(|_| DataError::Query(format!("generated id {} out of range", id)))
}

fn find_recipe(conn: &mut MysqlConnection, recipe_id: i32) -> DataResult<Option<RecipeRow>> {
    Ok(recipe_sections::table
        .find(recipe_id)
        .select(RecipeRow::as_select())
        .first(conn)
        .optional()?)
}

/// Replace the parts named in `parts`; runs inside the caller's transaction.
fn write_parts(conn: &mut MysqlConnection, recipe_id: i32, parts: RecipeParts) -> DataResult<()> {
    if let Some(mut rows) = parts.ingredients {
        diesel::delete(ingredients::table.filter(ingredients::recipe_id.eq(recipe_id)))
            .execute(conn)?;
        rows.iter_mut().for_each(|row| row.recipe_id = recipe_id);
        if !rows.is_empty() {
            diesel::insert_into(ingredients::table)
                .values(&rows)
                .execute(conn)?;
        }
    }
    if let Some(mut rows) = parts.instructions {
        diesel::delete(instructions::table.filter(instructions::recipe_id.eq(recipe_id)))
            .execute(conn)?;
        rows.iter_mut().for_each(|row| row.recipe_id = recipe_id);
        if !rows.is_empty() {
            diesel::insert_into(instructions::table)
                .values(&rows)
                .execute(conn)?;
        }
    }
    Ok(())
}

impl DataService for MySqlDataService {
    fn backend_name(&self) -> &'static str {
        "mysql"
    }

    fn get_recipe(&self, recipe_id: i32) -> DataResult<Option<RecipeRow>> {
        let mut pooled = self.conn()?;
        logged("get_recipe", find_recipe(&mut pooled, recipe_id))
    }

    fn list_recipes(&self, filter: &RecipeFilter, page: Page) -> DataResult<Vec<RecipeRow>> {
        let mut pooled = self.conn()?;
        let result = recipe_query(filter)
            .select(RecipeRow::as_select())
            .order(recipe_sections::recipe_id.asc())
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut *pooled)
            .map_err(DataError::from);
        logged("list_recipes", result)
    }

    fn count_recipes(&self, filter: &RecipeFilter) -> DataResult<i64> {
        let mut pooled = self.conn()?;
        let result = recipe_query(filter)
            .count()
            .get_result(&mut *pooled)
            .map_err(DataError::from);
        logged("count_recipes", result)
    }

    fn create_recipe(
        &self,
        fields: RecipeFields,
        create_time: NaiveDateTime,
        parts: RecipeParts,
    ) -> DataResult<RecipeRow> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            diesel::insert_into(recipe_sections::table)
                .values(fields.as_insert(create_time))
                .execute(conn)?;
            let recipe_id = last_inserted_id(conn)?;
            write_parts(conn, recipe_id, parts)?;
            find_recipe(conn, recipe_id)?
                .ok_or_else(|| DataError::Query(format!("recipe {} vanished after insert", recipe_id)))
        });
        logged("create_recipe", result)
    }

    fn update_recipe(
        &self,
        recipe_id: i32,
        fields: RecipeFields,
        parts: RecipeParts,
    ) -> DataResult<Option<RecipeRow>> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            let existing: Option<i32> = recipe_sections::table
                .find(recipe_id)
                .select(recipe_sections::recipe_id)
                .for_update()
                .first(conn)
                .optional()?;
            if existing.is_none() {
                return Ok(None);
            }

            diesel::update(recipe_sections::table.find(recipe_id))
                .set((
                    recipe_sections::recipe_name.eq(fields.recipe_name.as_deref()),
                    recipe_sections::user_id.eq(fields.user_id),
                    recipe_sections::content.eq(fields.content.as_deref()),
                    recipe_sections::rating.eq(fields.rating),
                    recipe_sections::cuisine_id.eq(fields.cuisine_id),
                    recipe_sections::ingredient_id.eq(fields.ingredient_id.as_deref()),
                    recipe_sections::comment.eq(fields.comment.as_deref()),
                    recipe_sections::cooking_time.eq(fields.cooking_time),
                    recipe_sections::pictures.eq(fields.pictures.as_deref()),
                ))
                .execute(conn)?;
            write_parts(conn, recipe_id, parts)?;
            find_recipe(conn, recipe_id)
        });
        logged("update_recipe", result)
    }

    fn delete_recipe(&self, recipe_id: i32) -> DataResult<bool> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            diesel::delete(ingredients::table.filter(ingredients::recipe_id.eq(recipe_id)))
                .execute(conn)?;
            diesel::delete(instructions::table.filter(instructions::recipe_id.eq(recipe_id)))
                .execute(conn)?;
            let deleted = diesel::delete(recipe_sections::table.find(recipe_id)).execute(conn)?;
            Ok(deleted > 0)
        });
        logged("delete_recipe", result)
    }

    fn get_ingredient(&self, ingredient_id: i32) -> DataResult<Option<IngredientRow>> {
        let mut pooled = self.conn()?;
        let result = ingredients::table
            .find(ingredient_id)
            .select(IngredientRow::as_select())
            .first(&mut *pooled)
            .optional()
            .map_err(DataError::from);
        logged("get_ingredient", result)
    }

    fn list_ingredients(
        &self,
        recipe_id: Option<i32>,
        page: Page,
    ) -> DataResult<Vec<IngredientRow>> {
        let mut pooled = self.conn()?;
        let result = ingredient_query(recipe_id)
            .select(IngredientRow::as_select())
            .order(ingredients::ingredient_id.asc())
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut *pooled)
            .map_err(DataError::from);
        logged("list_ingredients", result)
    }

    fn count_ingredients(&self, recipe_id: Option<i32>) -> DataResult<i64> {
        let mut pooled = self.conn()?;
        let result = ingredient_query(recipe_id)
            .count()
            .get_result(&mut *pooled)
            .map_err(DataError::from);
        logged("count_ingredients", result)
    }

    fn ingredients_for_recipe(&self, recipe_id: i32) -> DataResult<Vec<IngredientRow>> {
        let mut pooled = self.conn()?;
        let result = ingredients::table
            .filter(ingredients::recipe_id.eq(recipe_id))
            .select(IngredientRow::as_select())
            .order(ingredients::ingredient_id.asc())
            .load(&mut *pooled)
            .map_err(DataError::from);
        logged("ingredients_for_recipe", result)
    }

    fn create_ingredient(&self, fields: IngredientFields) -> DataResult<IngredientRow> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            diesel::insert_into(ingredients::table)
                .values(&fields)
                .execute(conn)?;
            let ingredient_id = last_inserted_id(conn)?;
            Ok(IngredientRow::from_fields(ingredient_id, fields.clone()))
        });
        logged("create_ingredient", result)
    }

    fn update_ingredient(
        &self,
        ingredient_id: i32,
        fields: IngredientFields,
    ) -> DataResult<Option<IngredientRow>> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            let existing: Option<i32> = ingredients::table
                .find(ingredient_id)
                .select(ingredients::ingredient_id)
                .for_update()
                .first(conn)
                .optional()?;
            if existing.is_none() {
                return Ok(None);
            }

            diesel::update(ingredients::table.find(ingredient_id))
                .set((
                    ingredients::recipe_id.eq(fields.recipe_id),
                    ingredients::name.eq(fields.name.as_deref()),
                    ingredients::quantity.eq(fields.quantity.as_deref()),
                    ingredients::unit.eq(fields.unit.as_deref()),
                    ingredients::note.eq(fields.note.as_deref()),
                ))
                .execute(conn)?;
            Ok(Some(IngredientRow::from_fields(ingredient_id, fields.clone())))
        });
        logged("update_ingredient", result)
    }

    fn delete_ingredient(&self, ingredient_id: i32) -> DataResult<bool> {
        let mut pooled = self.conn()?;
        let result = diesel::delete(ingredients::table.find(ingredient_id))
            .execute(&mut *pooled)
            .map(|deleted| deleted > 0)
            .map_err(DataError::from);
        logged("delete_ingredient", result)
    }

    fn delete_ingredients_for_recipe(&self, recipe_id: i32) -> DataResult<usize> {
        let mut pooled = self.conn()?;
        let result = diesel::delete(ingredients::table.filter(ingredients::recipe_id.eq(recipe_id)))
            .execute(&mut *pooled)
            .map_err(DataError::from);
        logged("delete_ingredients_for_recipe", result)
    }

    fn get_instruction(&self, instruction_id: i32) -> DataResult<Option<InstructionRow>> {
        let mut pooled = self.conn()?;
        let result = instructions::table
            .find(instruction_id)
            .select(InstructionRow::as_select())
            .first(&mut *pooled)
            .optional()
            .map_err(DataError::from);
        logged("get_instruction", result)
    }

    fn list_instructions(
        &self,
        recipe_id: Option<i32>,
        page: Page,
    ) -> DataResult<Vec<InstructionRow>> {
        let mut pooled = self.conn()?;
        let result = instruction_query(recipe_id)
            .select(InstructionRow::as_select())
            .order((
                instructions::step_number.is_null().asc(),
                instructions::step_number.asc(),
                instructions::instruction_id.asc(),
            ))
            .limit(page.limit)
            .offset(page.offset)
            .load(&mut *pooled)
            .map_err(DataError::from);
        logged("list_instructions", result)
    }

    fn count_instructions(&self, recipe_id: Option<i32>) -> DataResult<i64> {
        let mut pooled = self.conn()?;
        let result = instruction_query(recipe_id)
            .count()
            .get_result(&mut *pooled)
            .map_err(DataError::from);
        logged("count_instructions", result)
    }

    fn instructions_for_recipe(&self, recipe_id: i32) -> DataResult<Vec<InstructionRow>> {
        let mut pooled = self.conn()?;
        let result = instructions::table
            .filter(instructions::recipe_id.eq(recipe_id))
            .select(InstructionRow::as_select())
            .order((
                instructions::step_number.is_null().asc(),
                instructions::step_number.asc(),
                instructions::instruction_id.asc(),
            ))
            .load(&mut *pooled)
            .map_err(DataError::from);
        logged("instructions_for_recipe", result)
    }

    fn create_instruction(&self, fields: InstructionFields) -> DataResult<InstructionRow> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            diesel::insert_into(instructions::table)
                .values(&fields)
                .execute(conn)?;
            let instruction_id = last_inserted_id(conn)?;
            Ok(InstructionRow::from_fields(instruction_id, fields.clone()))
        });
        logged("create_instruction", result)
    }

    fn update_instruction(
        &self,
        instruction_id: i32,
        fields: InstructionFields,
    ) -> DataResult<Option<InstructionRow>> {
        let mut pooled = self.conn()?;
        let conn: &mut MysqlConnection = &mut pooled;
        let result = conn.transaction::<_, DataError, _>(|conn| {
            let existing: Option<i32> = instructions::table
                .find(instruction_id)
                .select(instructions::instruction_id)
                .for_update()
                .first(conn)
                .optional()?;
            if existing.is_none() {
                return Ok(None);
            }

            diesel::update(instructions::table.find(instruction_id))
                .set((
                    instructions::recipe_id.eq(fields.recipe_id),
                    instructions::step_number.eq(fields.step_number),
                    instructions::description.eq(fields.description.as_deref()),
                ))
                .execute(conn)?;
            Ok(Some(InstructionRow::from_fields(instruction_id, fields.clone())))
        });
        logged("update_instruction", result)
    }

    fn delete_instruction(&self, instruction_id: i32) -> DataResult<bool> {
        let mut pooled = self.conn()?;
        let result = diesel::delete(instructions::table.find(instruction_id))
            .execute(&mut *pooled)
            .map(|deleted| deleted > 0)
            .map_err(DataError::from);
        logged("delete_instruction", result)
    }

    fn delete_instructions_for_recipe(&self, recipe_id: i32) -> DataResult<usize> {
        let mut pooled = self.conn()?;
        let result =
            diesel::delete(instructions::table.filter(instructions::recipe_id.eq(recipe_id)))
                .execute(&mut *pooled)
                .map_err(DataError::from);
        logged("delete_instructions_for_recipe", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::query_builder::QueryFragment;

    fn sql_and_binds<T: QueryFragment<Mysql>>(query: &T) -> (String, String) {
        let rendered = diesel::debug_query::<Mysql, _>(query).to_string();
        let (sql, binds) = rendered
            .split_once(" -- binds: ")
            .expect("debug output lists binds");
        (sql.to_string(), binds.to_string())
    }

    #[test]
    fn test_recipe_query_binds_filter_values() {
        let filter = RecipeFilter {
            recipe_name: Some("Mac' OR '1'='1".to_string()),
            user_id: Some(7),
            cuisine_id: Some(3),
            cooking_time: Some(25),
        };
        let (sql, binds) = sql_and_binds(&recipe_query(&filter));

        assert!(sql.contains("`recipe_sections`.`recipe_name` = ?"), "{}", sql);
        assert!(sql.contains("`recipe_sections`.`user_id` = ?"), "{}", sql);
        assert!(sql.contains("`recipe_sections`.`cuisine_id` = ?"), "{}", sql);
        assert!(sql.contains("`recipe_sections`.`cooking_time` = ?"), "{}", sql);
        assert_eq!(sql.matches('?').count(), 4);
        assert!(!sql.contains("OR '1'"), "{}", sql);
        assert!(binds.contains("Mac' OR '1'='1"), "{}", binds);
    }

    #[test]
    fn test_recipe_query_without_filter_has_no_where() {
        let (sql, binds) = sql_and_binds(&recipe_query(&RecipeFilter::default()));
        assert!(!sql.contains("WHERE"), "{}", sql);
        assert_eq!(binds, "[]");
    }

    #[test]
    fn test_part_queries_scope_by_recipe() {
        let (sql, binds) = sql_and_binds(&ingredient_query(Some(12)));
        assert!(sql.contains("`ingredients`.`recipe_id` = ?"), "{}", sql);
        assert_eq!(binds, "[12]");

        let (sql, _) = sql_and_binds(&instruction_query(None));
        assert!(!sql.contains("WHERE"), "{}", sql);
    }
}
