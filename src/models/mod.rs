pub mod wire;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const SOURCE_SERVER: &str = "server";
pub const SOURCE_TYPE_MP4: &str = "mp4";

/// Server-assigned row identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        wire::required_id(deserializer)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A catalog collection the console can list and mutate.
pub trait Resource: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Collection path below the catalog base URL.
    const PATH: &'static str;
    /// Human readable name for messages.
    const KIND: &'static str;

    fn id(&self) -> EntityId;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvShow {
    pub id: EntityId,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub tmdb_id: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: EntityId,
    #[serde(rename = "tv_show_id", default, with = "wire::show_ref")]
    pub show_id: Option<EntityId>,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub slug: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub season_name: String,
    #[serde(default, deserialize_with = "wire::loose_int")]
    pub order: i64,
    #[serde(default, with = "wire::flag")]
    pub status: bool,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Season {
    pub fn belongs_to(&self, show: EntityId) -> bool {
        self.show_id == Some(show)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EntityId,
    #[serde(default, deserialize_with = "wire::loose_id")]
    pub season_id: EntityId,
    #[serde(default, deserialize_with = "wire::loose_id")]
    pub series_id: EntityId,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub episode_name: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub slug: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub description: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub file_source: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub source_type: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub file_url: String,
    #[serde(default, deserialize_with = "wire::loose_int")]
    pub order: i64,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub runtime: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub poster: String,
    #[serde(default, deserialize_with = "wire::loose_int")]
    pub total_view: i64,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: EntityId,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::loose_string")]
    pub thumbnail: String,
    #[serde(default, with = "wire::flag")]
    pub is_featured: bool,
}

impl Resource for TvShow {
    const PATH: &'static str = "tv_shows";
    const KIND: &'static str = "TV show";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Resource for Season {
    const PATH: &'static str = "seasons";
    const KIND: &'static str = "Season";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Resource for Episode {
    const PATH: &'static str = "episodes";
    const KIND: &'static str = "Episode";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Resource for Movie {
    const PATH: &'static str = "movies";
    const KIND: &'static str = "Movie";

    fn id(&self) -> EntityId {
        self.id
    }
}

// POST bodies. Field names match the catalog's columns.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TvShowDraft {
    pub title: String,
    pub tmdb_id: String,
    pub thumbnail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonDraft {
    #[serde(rename = "tv_show_id", serialize_with = "wire::show_ref::serialize_id")]
    pub show_id: EntityId,
    pub season_name: String,
    pub slug: String,
    pub order: i64,
    #[serde(with = "wire::flag")]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeDraft {
    pub season_id: EntityId,
    pub series_id: EntityId,
    pub episode_name: String,
    pub slug: String,
    pub description: String,
    pub file_source: String,
    pub source_type: String,
    pub file_url: String,
    pub order: i64,
    pub runtime: String,
    pub poster: String,
    pub total_view: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDraft {
    pub title: String,
    pub thumbnail: String,
    #[serde(with = "wire::flag")]
    pub is_featured: bool,
}

/// Lowercases, turns spaces into `-` and drops anything that is not a word
/// character or `-`.
pub fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
