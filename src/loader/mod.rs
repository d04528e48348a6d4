use crate::catalog::CatalogClient;
use crate::error::{ConsoleError, Result};
use crate::models::{Episode, Movie, Resource, Season, TvShow};
use crate::store::{CatalogStore, Collection};
use std::fmt;
use tracing::{error, info, instrument, warn};

/// Outcome of fetching one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionLoad {
    Loaded(usize),
    /// The collection kept its previous rows.
    Failed(String),
}

impl CollectionLoad {
    pub fn is_loaded(&self) -> bool {
        matches!(self, CollectionLoad::Loaded(_))
    }
}

impl fmt::Display for CollectionLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionLoad::Loaded(n) => write!(f, "{n} rows"),
            CollectionLoad::Failed(reason) => write!(f, "stale ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub shows: CollectionLoad,
    pub seasons: CollectionLoad,
    pub episodes: CollectionLoad,
    pub movies: CollectionLoad,
}

impl LoadReport {
    pub fn all_loaded(&self) -> bool {
        [&self.shows, &self.seasons, &self.episodes, &self.movies]
            .iter()
            .all(|c| c.is_loaded())
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shows {}, seasons {}, episodes {}, movies {}",
            self.shows, self.seasons, self.episodes, self.movies
        )
    }
}

/// Fetches all four collections concurrently and applies each success on its
/// own. A failed fetch leaves that collection as it was.
#[instrument(skip_all, fields(base = %api.base_url()))]
pub async fn load(api: &CatalogClient, store: &mut CatalogStore) -> LoadReport {
    info!("Loading catalog");

    let (shows, seasons, episodes, movies) = tokio::join!(
        api.list::<TvShow>(),
        api.list::<Season>(),
        api.list::<Episode>(),
        api.list::<Movie>(),
    );

    let report = LoadReport {
        shows: apply(&mut store.shows, shows),
        seasons: apply(&mut store.seasons, seasons),
        episodes: apply(&mut store.episodes, episodes),
        movies: apply(&mut store.movies, movies),
    };

    info!(
        "Catalog loaded: {} shows, {} seasons, {} episodes, {} movies",
        store.shows.len(),
        store.seasons.len(),
        store.episodes.len(),
        store.movies.len()
    );
    report
}

fn apply<T: Resource>(collection: &mut Collection<T>, result: Result<Vec<T>>) -> CollectionLoad {
    match result {
        Ok(rows) => {
            let count = rows.len();
            collection.replace(rows);
            CollectionLoad::Loaded(count)
        }
        Err(e @ ConsoleError::Transport(_)) => {
            error!("Failed to reach catalog for {}: {}", T::PATH, e);
            CollectionLoad::Failed(e.to_string())
        }
        Err(e) => {
            warn!("Keeping previous {} rows: {}", T::PATH, e);
            CollectionLoad::Failed(e.to_string())
        }
    }
}
