use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{ImageStore, StorageError};

/// Image store that keeps uploads in memory.
#[derive(Debug)]
pub struct MemoryImageStore {
    public_url: String,
    objects: RwLock<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryImageStore {
    pub fn new(public_url: &str) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Content type and bytes of a stored object.
    #[cfg(test)]
    pub fn get(&self, object_name: &str) -> Option<(String, Vec<u8>)> {
        self.objects.read().ok()?.get(object_name).cloned()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StorageError> {
        self.objects
            .write()
            .map_err(|_| StorageError::RequestFailed("image store lock poisoned".to_string()))?
            .insert(object_name.to_string(), (content_type.to_string(), data));
        Ok(self.public_url(object_name))
    }

    fn public_base_url(&self) -> &str {
        &self.public_url
    }
}
