//! Service configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_NAME: &str = "recipe_management";
pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_STORAGE_API_URL: &str = "https://storage.googleapis.com";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Which store backs the data service.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBackend {
    MySql { database_url: String, pool_size: u32 },
    Memory,
}

/// Where uploaded images go.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageBackend {
    Gcs(GcsConfig),
    /// Keeps uploads in process; URLs point at `public_url`.
    Memory { public_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GcsConfig {
    pub bucket: String,
    /// JSON API origin, overridable for emulators.
    pub api_url: String,
    /// Base that object names are appended to in responses.
    pub public_url: String,
    /// Static bearer token for emulators. Unset means application default
    /// credentials.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data: DataBackend,
    pub images: ImageBackend,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `BIND_ADDR` (default "0.0.0.0:8000")
    /// - `DATA_BACKEND`: "mysql" (default) or "memory"
    /// - `DATABASE_URL`, or `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
    /// - `DB_POOL_SIZE` (default 10)
    /// - `IMAGE_BACKEND`: "gcs" (default) or "memory"
    /// - `STORAGE_API_URL`, `STORAGE_PUBLIC_URL`, `STORAGE_ACCESS_TOKEN`
    ///
    /// Required when `IMAGE_BACKEND=gcs`:
    /// - `STORAGE_BUCKET`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::InvalidValue {
                name: "BIND_ADDR".to_string(),
                value: DEFAULT_BIND_ADDR.to_string(),
            })
        })?;

        let data = match lookup("DATA_BACKEND").as_deref() {
            None | Some("mysql") => DataBackend::MySql {
                database_url: database_url(&lookup)?,
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", || Ok(DEFAULT_POOL_SIZE))?,
            },
            Some("memory") => DataBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "DATA_BACKEND".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let images = match lookup("IMAGE_BACKEND").as_deref() {
            None | Some("gcs") => {
                let bucket = lookup("STORAGE_BUCKET")
                    .ok_or_else(|| ConfigError::MissingEnvVar("STORAGE_BUCKET".to_string()))?;
                let api_url = lookup("STORAGE_API_URL")
                    .unwrap_or_else(|| DEFAULT_STORAGE_API_URL.to_string());
                let public_url = lookup("STORAGE_PUBLIC_URL")
                    .unwrap_or_else(|| format!("{}/{}", DEFAULT_STORAGE_API_URL, bucket));
                ImageBackend::Gcs(GcsConfig {
                    bucket,
                    api_url,
                    public_url,
                    access_token: lookup("STORAGE_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
                })
            }
            Some("memory") => ImageBackend::Memory {
                public_url: lookup("STORAGE_PUBLIC_URL")
                    .unwrap_or_else(|| "http://localhost:8000/images".to_string()),
            },
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "IMAGE_BACKEND".to_string(),
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            data,
            images,
        })
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from its parts.
/// Credentials with URL-reserved characters must go through `DATABASE_URL`.
fn database_url(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    if let Some(url) = lookup("DATABASE_URL") {
        return Ok(url);
    }

    let host = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
    let port: u16 = parse_or(lookup, "DB_PORT", || Ok(DEFAULT_DB_PORT))?;
    let user = lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string());
    let name = lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

    Ok(match lookup("DB_PASSWORD").filter(|p| !p.is_empty()) {
        Some(password) => format!("mysql://{}:{}@{}:{}/{}", user, password, host, port, name),
        None => format!("mysql://{}@{}:{}/{}", user, host, port, name),
    })
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: impl FnOnce() -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        None => default(),
    }
}
