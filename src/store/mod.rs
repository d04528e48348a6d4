use crate::models::{EntityId, Episode, Movie, Resource, Season, TvShow};
use std::collections::{BTreeMap, BTreeSet};

/// Rows of one collection keyed by identifier. Iteration is newest first
/// (identifier descending).
#[derive(Debug, Clone)]
pub struct Collection<T> {
    rows: BTreeMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Resource> Collection<T> {
    pub fn replace(&mut self, rows: Vec<T>) {
        self.rows = rows.into_iter().map(|row| (row.id(), row)).collect();
    }

    pub fn upsert(&mut self, row: T) {
        self.rows.insert(row.id(), row);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.rows.values().rev()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.rows.keys().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| keep(row));
        before - self.rows.len()
    }
}

/// Resources that live in a [`CatalogStore`] collection.
pub trait Stored: Resource {
    fn collection(store: &CatalogStore) -> &Collection<Self>;
    fn collection_mut(store: &mut CatalogStore) -> &mut Collection<Self>;
}

macro_rules! stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn collection(store: &CatalogStore) -> &Collection<Self> {
                &store.$field
            }

            fn collection_mut(store: &mut CatalogStore) -> &mut Collection<Self> {
                &mut store.$field
            }
        }
    };
}

stored!(TvShow, shows);
stored!(Season, seasons);
stored!(Episode, episodes);
stored!(Movie, movies);

/// Local copy of the catalog. Everything here can be re-fetched; the
/// backend stays authoritative.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    pub shows: Collection<TvShow>,
    pub seasons: Collection<Season>,
    pub episodes: Collection<Episode>,
    pub movies: Collection<Movie>,
}

/// What a local delete took with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Removed {
    pub shows: usize,
    pub seasons: usize,
    pub episodes: usize,
    pub movies: usize,
}

impl CatalogStore {
    pub fn seasons_of(&self, show: EntityId) -> impl Iterator<Item = &Season> + '_ {
        self.seasons.iter().filter(move |s| s.belongs_to(show))
    }

    /// Episodes of a season in playback order (`order`, then identifier).
    pub fn episodes_of(&self, season: EntityId) -> Vec<&Episode> {
        let mut episodes: Vec<&Episode> = self
            .episodes
            .iter()
            .filter(|e| e.season_id == season)
            .collect();
        episodes.sort_by_key(|e| (e.order, e.id));
        episodes
    }

    pub fn featured_movies(&self) -> impl Iterator<Item = &Movie> + '_ {
        self.movies.iter().filter(|m| m.is_featured)
    }

    /// Removes a show with its seasons and their episodes, mirroring the
    /// backend's cascade.
    pub fn remove_show(&mut self, id: EntityId) -> Removed {
        let shows = usize::from(self.shows.remove(id).is_some());
        let season_ids: BTreeSet<EntityId> = self.seasons_of(id).map(|s| s.id).collect();
        let seasons = self.seasons.retain(|s| !season_ids.contains(&s.id));
        let episodes = self
            .episodes
            .retain(|e| e.series_id != id && !season_ids.contains(&e.season_id));
        Removed {
            shows,
            seasons,
            episodes,
            ..Removed::default()
        }
    }

    /// Removes a season and its episodes.
    pub fn remove_season(&mut self, id: EntityId) -> Removed {
        let seasons = usize::from(self.seasons.remove(id).is_some());
        let episodes = self.episodes.retain(|e| e.season_id != id);
        Removed {
            seasons,
            episodes,
            ..Removed::default()
        }
    }

    pub fn remove_episode(&mut self, id: EntityId) -> Removed {
        Removed {
            episodes: usize::from(self.episodes.remove(id).is_some()),
            ..Removed::default()
        }
    }

    pub fn remove_movie(&mut self, id: EntityId) -> Removed {
        Removed {
            movies: usize::from(self.movies.remove(id).is_some()),
            ..Removed::default()
        }
    }
}
