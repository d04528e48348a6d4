//! Pulls season and episode metadata from TMDB into the catalog.

use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::models::{
    slugify, EntityId, Episode, EpisodeDraft, Season, SeasonDraft, TvShow, SOURCE_SERVER,
    SOURCE_TYPE_MP4,
};
use crate::poster::ImageResolver;
use crate::store::Stored;
use crate::tmdb::{TmdbClient, TmdbEpisode, TmdbSeasonSummary};
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub attempted: usize,
    pub registered: usize,
    /// Episode or season number with the reason it was not registered.
    pub failed: Vec<(i64, String)>,
}

/// Maps one TMDB episode onto the catalog's episode columns.
pub fn episode_draft(
    episode: &TmdbEpisode,
    season_id: EntityId,
    series_id: EntityId,
    images: &ImageResolver,
) -> EpisodeDraft {
    let number = episode.episode_number;
    let name = episode
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Episode {number}"));
    let description = episode
        .overview
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .unwrap_or("No description.")
        .to_string();
    let poster = episode
        .still_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| images.encode_tmdb_path(p))
        .unwrap_or_default();

    EpisodeDraft {
        season_id,
        series_id,
        slug: slugify(&name),
        episode_name: name,
        description,
        file_source: SOURCE_SERVER.to_string(),
        source_type: SOURCE_TYPE_MP4.to_string(),
        file_url: String::new(),
        order: number,
        runtime: format!("{} min", episode.runtime.unwrap_or(0)),
        poster,
        total_view: 0,
    }
}

/// `S01 : Dark`
pub fn season_name(show_title: &str, season_number: i64) -> String {
    format!("S{:02} : {}", season_number, show_title.trim())
}

pub fn season_draft(season: &TmdbSeasonSummary, show: &TvShow) -> SeasonDraft {
    let season_name = season_name(&show.title, season.season_number);
    SeasonDraft {
        show_id: show.id,
        slug: slugify(&season_name),
        season_name,
        order: season.season_number,
        status: true,
    }
}

fn picked(number: i64, pick: Option<&[i64]>) -> bool {
    pick.map_or(true, |numbers| numbers.contains(&number))
}

impl Console {
    fn tmdb_show(&self, show_id: EntityId) -> Result<TvShow> {
        let show = self.require::<TvShow>(show_id)?.clone();
        if show.tmdb_id.trim().is_empty() {
            return Err(ConsoleError::Validation(format!(
                "show {} has no TMDB id",
                show.title
            )));
        }
        Ok(show)
    }

    /// Fetches and maps a season's episodes without registering anything.
    pub async fn preview_episodes(
        &self,
        tmdb: &TmdbClient,
        show_id: EntityId,
        season_id: EntityId,
    ) -> Result<Vec<EpisodeDraft>> {
        let show = self.tmdb_show(show_id)?;
        let season = self.require::<Season>(season_id)?;
        let episodes = tmdb.season(&show.tmdb_id, season.order).await?;
        Ok(episodes
            .iter()
            .map(|e| episode_draft(e, season_id, show_id, self.images()))
            .collect())
    }

    /// Registers TMDB episodes for a season one at a time. `pick` limits the
    /// import to those episode numbers.
    #[instrument(skip(self, tmdb, pick))]
    pub async fn import_episodes(
        &mut self,
        tmdb: &TmdbClient,
        show_id: EntityId,
        season_id: EntityId,
        pick: Option<&[i64]>,
    ) -> Result<ImportReport> {
        let drafts: Vec<(i64, EpisodeDraft)> = self
            .preview_episodes(tmdb, show_id, season_id)
            .await?
            .into_iter()
            .filter(|d| picked(d.order, pick))
            .map(|d| (d.order, d))
            .collect();
        self.register::<Episode, _>(drafts).await
    }

    pub async fn preview_seasons(
        &self,
        tmdb: &TmdbClient,
        show_id: EntityId,
    ) -> Result<Vec<SeasonDraft>> {
        let show = self.tmdb_show(show_id)?;
        let details = tmdb.show(&show.tmdb_id).await?;
        Ok(details
            .seasons
            .iter()
            .map(|s| season_draft(s, &show))
            .collect())
    }

    #[instrument(skip(self, tmdb, pick))]
    pub async fn import_seasons(
        &mut self,
        tmdb: &TmdbClient,
        show_id: EntityId,
        pick: Option<&[i64]>,
    ) -> Result<ImportReport> {
        let drafts: Vec<(i64, SeasonDraft)> = self
            .preview_seasons(tmdb, show_id)
            .await?
            .into_iter()
            .filter(|d| picked(d.order, pick))
            .map(|d| (d.order, d))
            .collect();
        self.register::<Season, _>(drafts).await
    }

    /// POSTs drafts sequentially. Failures are counted, never rolled back.
    async fn register<T: Stored, D: Serialize>(
        &mut self,
        drafts: Vec<(i64, D)>,
    ) -> Result<ImportReport> {
        let mut report = ImportReport {
            attempted: drafts.len(),
            ..ImportReport::default()
        };
        let mut rows = Vec::new();
        let mut complete = true;

        for (number, draft) in drafts {
            match self.api().create::<T, _>(&draft).await {
                Ok(row) => {
                    report.registered += 1;
                    match row {
                        Some(row) => rows.push(row),
                        None => complete = false,
                    }
                    info!("Registered {} {}", T::KIND, number);
                }
                Err(e) => {
                    warn!("Failed to register {} {}: {}", T::KIND, number, e);
                    report.failed.push((number, e.to_string()));
                }
            }
        }

        if report.registered > 0 {
            self.settle(rows, complete).await;
        }
        info!(
            "Import finished: {}/{} {} registered",
            report.registered,
            report.attempted,
            T::PATH
        );
        Ok(report)
    }
}
