use std::sync::Arc;

use super::{validate_step_number, ResourceError, ResourceResult};
use crate::data::{DataService, Page};
use crate::models::{InstructionFields, InstructionRow};
use crate::types::{InstructionInput, InstructionRecord};

#[derive(Debug, Clone)]
pub struct InstructionResource {
    data: Arc<dyn DataService>,
}

impl InstructionResource {
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self { data }
    }

    pub fn get_by_key(&self, instruction_id: i32) -> ResourceResult<InstructionRecord> {
        self.data
            .get_instruction(instruction_id)?
            .map(to_record)
            .ok_or(ResourceError::NotFound {
                entity: "instruction",
                id: instruction_id,
            })
    }

    pub fn get_page(
        &self,
        page: Page,
        recipe_id: Option<i32>,
    ) -> ResourceResult<(Vec<InstructionRecord>, i64)> {
        let rows = self.data.list_instructions(recipe_id, page)?;
        let total_count = self.data.count_instructions(recipe_id)?;
        Ok((rows.into_iter().map(to_record).collect(), total_count))
    }

    /// Steps of one recipe in step order.
    pub fn get_by_parent_id(&self, recipe_id: i32) -> ResourceResult<Vec<InstructionRecord>> {
        self.require_parent(recipe_id)?;
        Ok(self
            .data
            .instructions_for_recipe(recipe_id)?
            .into_iter()
            .map(to_record)
            .collect())
    }

    pub fn create(&self, input: InstructionInput) -> ResourceResult<InstructionRecord> {
        let recipe_id = input
            .recipe_id
            .ok_or_else(|| ResourceError::Validation("recipe_id is required".to_string()))?;
        validate_step_number(input.step_number)?;
        self.check_parent(recipe_id)?;
        let row = self.data.create_instruction(to_fields(recipe_id, input))?;
        tracing::info!(instruction_id = row.instruction_id, recipe_id, "created instruction");
        Ok(to_record(row))
    }

    pub fn create_for_parent(
        &self,
        recipe_id: i32,
        input: InstructionInput,
    ) -> ResourceResult<InstructionRecord> {
        validate_step_number(input.step_number)?;
        self.require_parent(recipe_id)?;
        let row = self.data.create_instruction(to_fields(recipe_id, input))?;
        tracing::info!(instruction_id = row.instruction_id, recipe_id, "created instruction");
        Ok(to_record(row))
    }

    pub fn update(
        &self,
        instruction_id: i32,
        input: InstructionInput,
    ) -> ResourceResult<InstructionRecord> {
        let recipe_id = input
            .recipe_id
            .ok_or_else(|| ResourceError::Validation("recipe_id is required".to_string()))?;
        validate_step_number(input.step_number)?;

        let not_found = ResourceError::NotFound {
            entity: "instruction",
            id: instruction_id,
        };
        if self.data.get_instruction(instruction_id)?.is_none() {
            return Err(not_found);
        }
        self.check_parent(recipe_id)?;
        self.data
            .update_instruction(instruction_id, to_fields(recipe_id, input))?
            .map(to_record)
            .ok_or(not_found)
    }

    pub fn delete(&self, instruction_id: i32) -> ResourceResult<()> {
        if self.data.delete_instruction(instruction_id)? {
            Ok(())
        } else {
            Err(ResourceError::NotFound {
                entity: "instruction",
                id: instruction_id,
            })
        }
    }

    pub fn delete_by_parent_id(&self, recipe_id: i32) -> ResourceResult<usize> {
        self.require_parent(recipe_id)?;
        Ok(self.data.delete_instructions_for_recipe(recipe_id)?)
    }

    fn require_parent(&self, recipe_id: i32) -> ResourceResult<()> {
        if self.data.get_recipe(recipe_id)?.is_none() {
            return Err(ResourceError::NotFound {
                entity: "recipe",
                id: recipe_id,
            });
        }
        Ok(())
    }

    fn check_parent(&self, recipe_id: i32) -> ResourceResult<()> {
        if self.data.get_recipe(recipe_id)?.is_none() {
            return Err(ResourceError::Validation(format!(
                "recipe {} not found",
                recipe_id
            )));
        }
        Ok(())
    }
}

pub(crate) fn to_fields(recipe_id: i32, input: InstructionInput) -> InstructionFields {
    InstructionFields {
        recipe_id,
        step_number: input.step_number,
        description: input.description,
    }
}

pub(crate) fn to_record(row: InstructionRow) -> InstructionRecord {
    InstructionRecord {
        instruction_id: row.instruction_id,
        recipe_id: row.recipe_id,
        step_number: row.step_number,
        description: row.description,
        links: Vec::new(),
    }
}
