use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CatalogError;

/// Runtime configuration, built once at startup and handed to the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Directory uploaded product images are written into.
    pub upload_dir: PathBuf,
    /// Lowercase filename extensions accepted for product images.
    pub allowed_extensions: Vec<String>,
    pub listen_addr: String,
    pub loglevel: String,
    /// Request body cap applied to the multipart routes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://catalog.db".to_string(),
            upload_dir: PathBuf::from("static/images"),
            allowed_extensions: ["png", "jpg", "jpeg", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults overlaid with `CATALOG_*` environment variables.
    pub fn load() -> Result<Self, CatalogError> {
        Self::figment().extract().map_err(Into::into)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("CATALOG_"))
    }
}
