use crate::catalog::CatalogClient;
use crate::config::Configuration;
use crate::error::{ConsoleError, Result};
use crate::http::HttpClient;
use crate::loader::{self, LoadReport};
use crate::models::EntityId;
use crate::poster::ImageResolver;
use crate::store::{CatalogStore, Stored};
use tracing::{debug, warn};

/// Counts shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub shows: usize,
    pub seasons: usize,
    pub episodes: usize,
    pub movies: usize,
    pub featured: usize,
}

/// Owns the catalog client and the local store. Every section, import and
/// bulk operation goes through here so the store stays the single source
/// for rendering.
pub struct Console {
    api: CatalogClient,
    store: CatalogStore,
    images: ImageResolver,
    reload_after_mutation: bool,
}

impl Console {
    pub fn new(api: CatalogClient, images: ImageResolver) -> Self {
        Self {
            api,
            store: CatalogStore::default(),
            images,
            reload_after_mutation: false,
        }
    }

    pub fn from_config(config: &Configuration) -> Result<Self> {
        let http = HttpClient::new(config.request_timeout()?)?;
        let api = CatalogClient::new(http, config.catalog_base_url()?);
        let images = ImageResolver::new(config.image_base_url(), config.placeholder());
        Ok(Self::new(api, images).with_reload_after_mutation(config.reload_after_mutation()))
    }

    /// Re-fetch everything after each mutation instead of patching the store.
    pub fn with_reload_after_mutation(mut self, reload: bool) -> Self {
        self.reload_after_mutation = reload;
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn api(&self) -> &CatalogClient {
        &self.api
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    pub async fn load(&mut self) -> LoadReport {
        loader::load(&self.api, &mut self.store).await
    }

    pub fn summary(&self) -> Summary {
        Summary {
            shows: self.store.shows.len(),
            seasons: self.store.seasons.len(),
            episodes: self.store.episodes.len(),
            movies: self.store.movies.len(),
            featured: self.store.featured_movies().count(),
        }
    }

    pub(crate) fn require<T: Stored>(&self, id: EntityId) -> Result<&T> {
        T::collection(&self.store)
            .get(id)
            .ok_or(ConsoleError::NotFound {
                kind: T::KIND,
                id: id.0,
            })
    }

    pub(crate) fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    /// Applies rows the server confirmed. Falls back to a full reload when a
    /// row could not be read back or the console is set to always reload.
    pub(crate) async fn settle<T: Stored>(&mut self, rows: Vec<T>, complete: bool) {
        if self.reload_after_mutation || !complete {
            debug!("Reconciling with a full reload");
            let report = self.load().await;
            if !report.all_loaded() {
                warn!("Reload after {} change was partial: {:?}", T::KIND, report);
            }
            return;
        }
        let collection = T::collection_mut(&mut self.store);
        for row in rows {
            collection.upsert(row);
        }
    }

    pub(crate) async fn settle_removal(&mut self) {
        if self.reload_after_mutation {
            self.load().await;
        }
    }
}
