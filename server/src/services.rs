use anyhow::Context;
use std::sync::Arc;

use crate::config::Config;
use crate::data::{self, DataService};
use crate::resources::{IngredientResource, InstructionResource, RecipeResource};
use crate::storage::{self, ImageStore};

/// Everything the handlers need, built once at startup.
#[derive(Debug, Clone)]
pub struct Services {
    pub recipes: RecipeResource,
    pub ingredients: IngredientResource,
    pub instructions: InstructionResource,
    pub images: Arc<dyn ImageStore>,
}

impl Services {
    pub fn new(data: Arc<dyn DataService>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            recipes: RecipeResource::new(data.clone()),
            ingredients: IngredientResource::new(data.clone()),
            instructions: InstructionResource::new(data),
            images,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let data = data::connect(&config.data).context("Failed to set up data backend")?;
        let images =
            storage::connect(&config.images).context("Failed to set up image storage")?;

        tracing::info!(
            data_backend = data.backend_name(),
            image_base_url = images.public_base_url(),
            "services ready"
        );

        Ok(Self::new(data, images))
    }

    /// Memory-backed services for tests.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(data::MemoryDataService::default()),
            Arc::new(storage::MemoryImageStore::new(
                "https://storage.googleapis.com/test-bucket",
            )),
        )
    }
}
