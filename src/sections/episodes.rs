use super::{required, required_id, Confirm, DeleteOutcome};
use crate::console::Console;
use crate::error::Result;
use crate::models::{
    slugify, EntityId, Episode, EpisodeDraft, Season, SOURCE_SERVER, SOURCE_TYPE_MP4,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeForm {
    pub season_id: Option<EntityId>,
    /// Taken from the season's owning show when left empty.
    pub series_id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub file_source: String,
    pub source_type: String,
    pub file_url: String,
    pub order: i64,
    pub runtime: String,
    pub poster: String,
}

impl Default for EpisodeForm {
    fn default() -> Self {
        Self {
            season_id: None,
            series_id: None,
            name: String::new(),
            description: String::new(),
            file_source: SOURCE_SERVER.to_string(),
            source_type: SOURCE_TYPE_MP4.to_string(),
            file_url: String::new(),
            order: 1,
            runtime: String::new(),
            poster: String::new(),
        }
    }
}

impl EpisodeForm {
    pub fn validate(&self) -> Result<EpisodeDraft> {
        let season_id = required_id("season", self.season_id)?;
        let series_id = required_id("series", self.series_id)?;
        let episode_name = required("episode name", &self.name)?;
        Ok(EpisodeDraft {
            season_id,
            series_id,
            slug: slugify(&episode_name),
            episode_name,
            description: self.description.trim().to_string(),
            file_source: self.file_source.trim().to_string(),
            source_type: self.source_type.trim().to_string(),
            file_url: self.file_url.trim().to_string(),
            order: self.order,
            runtime: self.runtime.trim().to_string(),
            poster: self.poster.trim().to_string(),
            total_view: 0,
        })
    }
}

impl From<&Episode> for EpisodeForm {
    fn from(episode: &Episode) -> Self {
        Self {
            season_id: Some(episode.season_id),
            series_id: Some(episode.series_id),
            name: episode.episode_name.clone(),
            description: episode.description.clone(),
            file_source: episode.file_source.clone(),
            source_type: episode.source_type.clone(),
            file_url: episode.file_url.clone(),
            order: episode.order,
            runtime: episode.runtime.clone(),
            poster: episode.poster.clone(),
        }
    }
}

impl Console {
    /// Episodes newest first, or in playback order when limited to a season.
    pub fn episodes(&self, season: Option<EntityId>) -> Vec<&Episode> {
        match season {
            Some(season) => self.store().episodes_of(season),
            None => self.store().episodes.iter().collect(),
        }
    }

    pub fn episode_form(&self, id: EntityId) -> Result<EpisodeForm> {
        Ok(EpisodeForm::from(self.require::<Episode>(id)?))
    }

    fn with_series(&self, form: &EpisodeForm) -> EpisodeForm {
        let mut form = form.clone();
        if form.series_id.is_none() {
            form.series_id = form
                .season_id
                .and_then(|id| self.store().seasons.get(id))
                .and_then(|season: &Season| season.show_id);
        }
        form
    }

    pub async fn create_episode(&mut self, form: &EpisodeForm) -> Result<Option<Episode>> {
        let draft = self.with_series(form).validate()?;
        let created = self.api().create::<Episode, _>(&draft).await?;
        self.settle(created.clone().into_iter().collect(), created.is_some())
            .await;
        Ok(created)
    }

    pub async fn update_episode(&mut self, id: EntityId, form: &EpisodeForm) -> Result<Episode> {
        let draft = self.with_series(form).validate()?;
        let existing = self.require::<Episode>(id)?;
        let row = Episode {
            id,
            season_id: draft.season_id,
            series_id: draft.series_id,
            episode_name: draft.episode_name,
            slug: draft.slug,
            description: draft.description,
            file_source: draft.file_source,
            source_type: draft.source_type,
            file_url: draft.file_url,
            order: draft.order,
            runtime: draft.runtime,
            poster: draft.poster,
            total_view: existing.total_view,
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        };
        let stored = self.api().update(&row).await?.unwrap_or(row);
        self.settle(vec![stored.clone()], true).await;
        Ok(stored)
    }

    pub async fn delete_episode(
        &mut self,
        id: EntityId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome> {
        let name = self.require::<Episode>(id)?.episode_name.clone();
        if !confirm.confirm(&format!("Delete episode \"{name}\"?")) {
            info!("Delete of episode {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        self.api().delete::<Episode>(id).await?;
        let removed = self.store_mut().remove_episode(id);
        self.settle_removal().await;
        Ok(DeleteOutcome::Deleted(removed))
    }
}
