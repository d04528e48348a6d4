use crate::error::Result;
use crate::http::HttpClient;
use crate::models::{EntityId, Resource};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// REST client for the catalog backend (`tv_shows`, `seasons`, `episodes`,
/// `movies`).
#[derive(Clone)]
pub struct CatalogClient {
    http: HttpClient,
    base_url: String,
}

impl CatalogClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url<T: Resource>(&self) -> String {
        format!("{}/{}", self.base_url, T::PATH)
    }

    fn row_url<T: Resource>(&self, id: EntityId) -> String {
        format!("{}/{}/{}", self.base_url, T::PATH, id)
    }

    #[instrument(skip(self), fields(resource = T::PATH))]
    pub async fn list<T: Resource>(&self) -> Result<Vec<T>> {
        let body: Vec<serde_json::Value> = self.http.get_json(&self.collection_url::<T>()).await?;
        let fetched = body.len();
        let rows = decode_rows::<T>(body);
        debug!("Fetched {} {} rows, kept {}", fetched, T::PATH, rows.len());
        Ok(rows)
    }

    /// POSTs a draft. Returns the created row when the server echoes one back.
    #[instrument(skip(self, draft), fields(resource = T::PATH))]
    pub async fn create<T: Resource, D: Serialize>(&self, draft: &D) -> Result<Option<T>> {
        let body = self.http.post_json(&self.collection_url::<T>(), draft).await?;
        let created = decode_row::<T>(&body);
        match &created {
            Some(row) => info!("Created {} {}", T::KIND, row.id()),
            None => info!("Created {} (server did not echo the row)", T::KIND),
        }
        Ok(created)
    }

    /// PUTs the full row. Returns the stored row when the server echoes one back.
    #[instrument(skip(self, row), fields(resource = T::PATH, id = %row.id()))]
    pub async fn update<T: Resource>(&self, row: &T) -> Result<Option<T>> {
        let body = self.http.put_json(&self.row_url::<T>(row.id()), row).await?;
        info!("Updated {} {}", T::KIND, row.id());
        Ok(decode_row::<T>(&body))
    }

    #[instrument(skip(self), fields(resource = T::PATH))]
    pub async fn delete<T: Resource>(&self, id: EntityId) -> Result<()> {
        self.http.delete(&self.row_url::<T>(id)).await?;
        info!("Deleted {} {}", T::KIND, id);
        Ok(())
    }
}

/// Decodes a list body row by row. Rows that do not decode are logged and
/// skipped; the rest of the collection still loads.
fn decode_rows<T: Resource>(body: Vec<serde_json::Value>) -> Vec<T> {
    body.into_iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_value::<T>(raw) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("Skipping {} row at index {}: {}", T::PATH, index, e);
                None
            }
        })
        .collect()
}

/// Accepts a bare row, or a row wrapped in `data`. Acknowledgements such as
/// `{"id": 5, "message": "created"}` are not rows: every column must be present.
fn decode_row<T: Resource>(body: &str) -> Option<T> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = match value.get("data") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    let row: T = serde_json::from_value(candidate.clone()).ok()?;
    let columns = serde_json::to_value(&row).ok()?;
    let complete = columns
        .as_object()
        .map(|cols| cols.keys().all(|key| candidate.get(key).is_some()))
        .unwrap_or(false);
    complete.then_some(row)
}
