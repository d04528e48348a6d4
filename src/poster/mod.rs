//! Poster and thumbnail references.
//!
//! The catalog stores images as JSON text like
//! `{"original_image":"https:\/\/image.tmdb.org\/t\/p\/w500\/abc.jpg"}`, but rows
//! in the wild also hold bare URLs, bare TMDB paths, `null` or junk. Resolution
//! never fails; anything unusable maps to the placeholder.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static IMAGE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:original_image|thumbnail)"\s*:\s*"([^"]+)""#).expect("valid regex")
});

/// Where relative TMDB paths are served from and what to show when nothing
/// usable is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base_url: String,
    placeholder: String,
}

impl ImageResolver {
    pub fn new(base_url: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Resolves a stored poster/thumbnail value to a displayable URL.
    pub fn resolve(&self, raw: &str) -> String {
        match extract_path(raw) {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => {
                format!("{}{}", self.base_url, path)
            }
            Some(path) if path.starts_with("http://") || path.starts_with("https://") => path,
            _ => self.placeholder.clone(),
        }
    }

    /// Builds the stored form for a TMDB still/poster path.
    pub fn encode_tmdb_path(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        encode_poster(&format!("{}{}", self.base_url, path))
    }
}

/// Serializes `{"original_image": url}` with every `/` escaped as `\/`, the
/// way the catalog backend writes it.
pub fn encode_poster(url: &str) -> String {
    serde_json::json!({ "original_image": url })
        .to_string()
        .replace('/', "\\/")
}

fn extract_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if matches!(trimmed, "" | "null" | "{}" | "[]" | ".") {
        return None;
    }

    let path = if trimmed.starts_with('{') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => ["original_image", "thumbnail"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str))
                .map(str::to_string)?,
            Err(_) => IMAGE_FIELD
                .captures(trimmed)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())?,
        }
    } else {
        trimmed.to_string()
    };

    let path = path.replace("\\/", "/").replace('\\', "");
    let path = path.trim();
    if path.is_empty() || path == "null" {
        None
    } else {
        Some(path.to_string())
    }
}
