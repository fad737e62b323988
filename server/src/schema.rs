// Mirrors sql/schema.sql. The database schema is managed outside this service.

diesel::table! {
    recipe_sections (recipe_id) {
        recipe_id -> Integer,
        #[max_length = 255]
        recipe_name -> Nullable<Varchar>,
        user_id -> Nullable<Integer>,
        content -> Nullable<Text>,
        rating -> Nullable<Double>,
        cuisine_id -> Nullable<Integer>,
        ingredient_id -> Nullable<Text>,
        comment -> Nullable<Text>,
        cooking_time -> Nullable<Integer>,
        create_time -> Nullable<Timestamp>,
        #[max_length = 1024]
        pictures -> Nullable<Varchar>,
    }
}

diesel::table! {
    ingredients (ingredient_id) {
        ingredient_id -> Integer,
        recipe_id -> Integer,
        #[max_length = 255]
        name -> Nullable<Varchar>,
        #[max_length = 64]
        quantity -> Nullable<Varchar>,
        #[max_length = 64]
        unit -> Nullable<Varchar>,
        note -> Nullable<Text>,
    }
}

diesel::table! {
    instructions (instruction_id) {
        instruction_id -> Integer,
        recipe_id -> Integer,
        step_number -> Nullable<Integer>,
        description -> Nullable<Text>,
    }
}

diesel::joinable!(ingredients -> recipe_sections (recipe_id));
diesel::joinable!(instructions -> recipe_sections (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(ingredients, instructions, recipe_sections);
