//! Google Cloud Storage over its JSON API.
//!
//! Uploads authenticate with application default credentials: a service
//! account key named by `GOOGLE_APPLICATION_CREDENTIALS`, gcloud user
//! credentials, or the metadata server. Tokens are cached and refreshed by
//! the provider. A configured static token replaces all of that, for
//! emulators that accept any bearer.

use async_trait::async_trait;
use gcp_auth::TokenProvider;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{ImageStore, StorageError};
use crate::config::GcsConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const STORAGE_SCOPES: &[&str] = &["https://www.googleapis.com/auth/devstorage.read_write"];

enum Credentials {
    Static(String),
    /// Discovered on first upload, so the server starts without credentials.
    ApplicationDefault(OnceCell<Arc<dyn TokenProvider>>),
}

impl Credentials {
    async fn bearer_token(&self) -> Result<String, StorageError> {
        match self {
            Credentials::Static(token) => Ok(token.clone()),
            Credentials::ApplicationDefault(provider) => {
                let provider = provider.get_or_try_init(gcp_auth::provider).await?;
                let token = provider.token(STORAGE_SCOPES).await?;
                Ok(token.as_str().to_string())
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Static(_) => f.write_str("Static(..)"),
            Credentials::ApplicationDefault(_) => f.write_str("ApplicationDefault"),
        }
    }
}

#[derive(Debug)]
pub struct GcsImageStore {
    client: reqwest::Client,
    bucket: String,
    api_url: String,
    public_url: String,
    credentials: Credentials,
}

impl GcsImageStore {
    pub fn new(config: GcsConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::NotConfigured("bucket name is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            bucket: config.bucket,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
            credentials: match config.access_token {
                Some(token) => Credentials::Static(token),
                None => Credentials::ApplicationDefault(OnceCell::new()),
            },
        })
    }

    fn upload_endpoint(&self) -> String {
        format!("{}/upload/storage/v1/b/{}/o", self.api_url, self.bucket)
    }
}

#[async_trait]
impl ImageStore for GcsImageStore {
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, StorageError> {
        let token = self.credentials.bearer_token().await?;
        let response = self
            .client
            .post(self.upload_endpoint())
            .query(&[
                ("uploadType", "media"),
                ("name", object_name),
                ("predefinedAcl", "publicRead"),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .bearer_auth(token)
            .body(data)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(bucket = %self.bucket, object = %object_name, "uploaded image");
        Ok(self.public_url(object_name))
    }

    fn public_base_url(&self) -> &str {
        &self.public_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bucket: &str) -> GcsConfig {
        GcsConfig {
            bucket: bucket.to_string(),
            api_url: "https://storage.googleapis.com/".to_string(),
            public_url: format!("https://storage.googleapis.com/{}", bucket),
            access_token: None,
        }
    }

    #[test]
    fn test_credentials_default_to_application_default() {
        let store = GcsImageStore::new(config("recipe-images")).unwrap();
        assert!(matches!(
            &store.credentials,
            Credentials::ApplicationDefault(cell) if !cell.initialized()
        ));
    }

    #[tokio::test]
    async fn test_static_token_overrides_discovery() {
        let store = GcsImageStore::new(GcsConfig {
            access_token: Some("emulator-token".to_string()),
            ..config("recipe-images")
        })
        .unwrap();
        assert_eq!(
            store.credentials.bearer_token().await.unwrap(),
            "emulator-token"
        );
        assert!(!format!("{:?}", store).contains("emulator-token"));
    }

    #[test]
    fn test_upload_endpoint() {
        let store = GcsImageStore::new(config("recipe-images")).unwrap();
        assert_eq!(
            store.upload_endpoint(),
            "https://storage.googleapis.com/upload/storage/v1/b/recipe-images/o"
        );
        assert_eq!(
            store.public_url("pasta.jpg"),
            "https://storage.googleapis.com/recipe-images/pasta.jpg"
        );
    }

    #[test]
    fn test_empty_bucket_rejected() {
        assert!(matches!(
            GcsImageStore::new(config(" ")),
            Err(StorageError::NotConfigured(_))
        ));
    }
}
