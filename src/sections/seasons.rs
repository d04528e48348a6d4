use super::{required, required_id, Confirm, DeleteOutcome};
use crate::console::Console;
use crate::error::Result;
use crate::models::{slugify, EntityId, Season, SeasonDraft};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonForm {
    pub show_id: Option<EntityId>,
    pub name: String,
    pub order: i64,
    pub published: bool,
}

impl Default for SeasonForm {
    fn default() -> Self {
        Self {
            show_id: None,
            name: String::new(),
            order: 1,
            published: true,
        }
    }
}

impl SeasonForm {
    pub fn validate(&self) -> Result<SeasonDraft> {
        let show_id = required_id("show", self.show_id)?;
        let season_name = required("season name", &self.name)?;
        Ok(SeasonDraft {
            show_id,
            slug: slugify(&season_name),
            season_name,
            order: self.order,
            status: self.published,
        })
    }
}

impl From<&Season> for SeasonForm {
    fn from(season: &Season) -> Self {
        Self {
            show_id: season.show_id,
            name: season.season_name.clone(),
            order: season.order,
            published: season.status,
        }
    }
}

impl Console {
    /// Seasons newest first, optionally only those of one show.
    pub fn seasons(&self, show: Option<EntityId>) -> Vec<&Season> {
        match show {
            Some(show) => self.store().seasons_of(show).collect(),
            None => self.store().seasons.iter().collect(),
        }
    }

    pub fn season_form(&self, id: EntityId) -> Result<SeasonForm> {
        Ok(SeasonForm::from(self.require::<Season>(id)?))
    }

    pub async fn create_season(&mut self, form: &SeasonForm) -> Result<Option<Season>> {
        let draft = form.validate()?;
        let created = self.api().create::<Season, _>(&draft).await?;
        self.settle(created.clone().into_iter().collect(), created.is_some())
            .await;
        Ok(created)
    }

    pub async fn update_season(&mut self, id: EntityId, form: &SeasonForm) -> Result<Season> {
        let draft = form.validate()?;
        let existing = self.require::<Season>(id)?;
        let row = Season {
            id,
            show_id: Some(draft.show_id),
            slug: draft.slug,
            season_name: draft.season_name,
            order: draft.order,
            status: draft.status,
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        };
        let stored = self.api().update(&row).await?.unwrap_or(row);
        self.settle(vec![stored.clone()], true).await;
        Ok(stored)
    }

    /// Deletes a season. The backend drops its episodes too.
    pub async fn delete_season(
        &mut self,
        id: EntityId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome> {
        let name = self.require::<Season>(id)?.season_name.clone();
        let episodes = self.store().episodes_of(id).len();
        let prompt = format!(
            "Delete season \"{name}\"? Its {episodes} episode(s) will be deleted as well."
        );
        if !confirm.confirm(&prompt) {
            info!("Delete of season {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        self.api().delete::<Season>(id).await?;
        let removed = self.store_mut().remove_season(id);
        self.settle_removal().await;
        Ok(DeleteOutcome::Deleted(removed))
    }
}
