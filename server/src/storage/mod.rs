//! Object storage for recipe pictures.
//!
//! Recipes store only an object name in `pictures`; the store knows the
//! public base URL used to render it.

mod gcs;
pub mod image;
mod memory;

pub use gcs::GcsImageStore;
pub use memory::MemoryImageStore;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ImageBackend;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    RequestFailed(String),

    #[error("storage returned error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("storage client not configured: {0}")]
    NotConfigured(String),

    #[error("storage credentials unavailable: {0}")]
    Credentials(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::RequestFailed(err.to_string())
    }
}

impl From<gcp_auth::Error> for StorageError {
    fn from(err: gcp_auth::Error) -> Self {
        StorageError::Credentials(err.to_string())
    }
}

/// Trait for image stores, enabling a fake in tests.
#[async_trait]
pub trait ImageStore: Send + Sync + fmt::Debug {
    /// Upload `data` under `object_name` and make it publicly readable.
    /// Returns the public URL.
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StorageError>;

    /// Base URL that object names are appended to, without a trailing slash.
    fn public_base_url(&self) -> &str;

    /// Render a stored `pictures` value as a URL. Values that are already
    /// absolute URLs are returned unchanged.
    fn public_url(&self, object_name: &str) -> String {
        if is_absolute(object_name) {
            object_name.to_string()
        } else {
            format!(
                "{}/{}",
                self.public_base_url(),
                object_name.trim_start_matches('/')
            )
        }
    }

    /// Reduce a URL under this store's public base back to its object name.
    fn object_name(&self, value: &str) -> String {
        let base = self.public_base_url();
        value
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty())
            .unwrap_or(value)
            .to_string()
    }
}

fn is_absolute(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Build the configured image store.
pub fn connect(backend: &ImageBackend) -> Result<Arc<dyn ImageStore>, StorageError> {
    match backend {
        ImageBackend::Gcs(config) => Ok(Arc::new(GcsImageStore::new(config.clone())?)),
        ImageBackend::Memory { public_url } => Ok(Arc::new(MemoryImageStore::new(public_url))),
    }
}
