use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TMDB_LANGUAGE: &str = "es-ES";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_PLACEHOLDER: &str = "https://via.placeholder.com/500x281?text=No+Image";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Configuration {
    pub catalog: Option<CatalogConfig>,
    pub tmdb: Option<TmdbConfig>,
    pub images: Option<ImageConfig>,
    pub http: Option<HttpConfig>,
    pub sync: Option<SyncConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(rename = "reloadAfterMutation")]
    pub reload_after_mutation: Option<bool>,
}

impl Configuration {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Configuration = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Catalog API root, without a trailing slash.
    pub fn catalog_base_url(&self) -> Result<String> {
        let raw = self
            .catalog
            .as_ref()
            .map(|c| c.base_url.trim())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConsoleError::Config("catalog.baseUrl is required".into()))?;
        validated_base(raw)
    }

    pub fn tmdb_base_url(&self) -> Result<String> {
        match self.tmdb.as_ref().and_then(|t| t.base_url.as_deref()) {
            Some(raw) => validated_base(raw.trim()),
            None => Ok(DEFAULT_TMDB_BASE_URL.to_string()),
        }
    }

    pub fn tmdb_language(&self) -> String {
        self.tmdb
            .as_ref()
            .and_then(|t| t.language.clone())
            .unwrap_or_else(|| DEFAULT_TMDB_LANGUAGE.to_string())
    }

    pub fn image_base_url(&self) -> String {
        self.images
            .as_ref()
            .and_then(|i| i.base_url.as_deref())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string())
    }

    pub fn placeholder(&self) -> String {
        self.images
            .as_ref()
            .and_then(|i| i.placeholder.clone())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string())
    }

    /// `http.timeoutSeconds`, 30 when unset. Zero is rejected.
    pub fn request_timeout(&self) -> Result<Duration> {
        match self.http.as_ref().map(|h| h.timeout_seconds) {
            None => Ok(Duration::from_secs(30)),
            Some(0) => Err(ConsoleError::Config(
                "http.timeoutSeconds must be at least 1".into(),
            )),
            Some(seconds) => Ok(Duration::from_secs(seconds)),
        }
    }

    pub fn reload_after_mutation(&self) -> bool {
        self.sync
            .as_ref()
            .and_then(|s| s.reload_after_mutation)
            .unwrap_or(false)
    }
}

fn validated_base(raw: &str) -> Result<String> {
    let url = Url::parse(raw).map_err(|e| ConsoleError::Config(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConsoleError::Config(format!(
            "{raw}: unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
