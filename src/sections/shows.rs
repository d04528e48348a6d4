use super::{required, Confirm, DeleteOutcome};
use crate::console::Console;
use crate::error::Result;
use crate::models::{EntityId, TvShow, TvShowDraft};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowForm {
    pub title: String,
    pub tmdb_id: String,
    pub thumbnail: String,
}

impl ShowForm {
    pub fn validate(&self) -> Result<TvShowDraft> {
        Ok(TvShowDraft {
            title: required("title", &self.title)?,
            tmdb_id: self.tmdb_id.trim().to_string(),
            thumbnail: self.thumbnail.trim().to_string(),
        })
    }
}

impl From<&TvShow> for ShowForm {
    fn from(show: &TvShow) -> Self {
        Self {
            title: show.title.clone(),
            tmdb_id: show.tmdb_id.clone(),
            thumbnail: show.thumbnail.clone(),
        }
    }
}

impl Console {
    pub fn shows(&self) -> Vec<&TvShow> {
        self.store().shows.iter().collect()
    }

    pub fn show_form(&self, id: EntityId) -> Result<ShowForm> {
        Ok(ShowForm::from(self.require::<TvShow>(id)?))
    }

    pub async fn create_show(&mut self, form: &ShowForm) -> Result<Option<TvShow>> {
        let draft = form.validate()?;
        let created = self.api().create::<TvShow, _>(&draft).await?;
        self.settle(created.clone().into_iter().collect(), created.is_some())
            .await;
        Ok(created)
    }

    pub async fn update_show(&mut self, id: EntityId, form: &ShowForm) -> Result<TvShow> {
        let draft = form.validate()?;
        self.require::<TvShow>(id)?;
        let row = TvShow {
            id,
            title: draft.title,
            tmdb_id: draft.tmdb_id,
            thumbnail: draft.thumbnail,
        };
        let stored = self.api().update(&row).await?.unwrap_or(row);
        self.settle(vec![stored.clone()], true).await;
        Ok(stored)
    }

    /// Deletes a show. The backend drops its seasons and episodes too.
    pub async fn delete_show(&mut self, id: EntityId, confirm: &dyn Confirm) -> Result<DeleteOutcome> {
        let title = self.require::<TvShow>(id)?.title.clone();
        let prompt = format!(
            "Delete \"{title}\"? This permanently removes ALL of its seasons and episodes."
        );
        if !confirm.confirm(&prompt) {
            info!("Delete of show {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        self.api().delete::<TvShow>(id).await?;
        let removed = self.store_mut().remove_show(id);
        self.settle_removal().await;
        Ok(DeleteOutcome::Deleted(removed))
    }
}
