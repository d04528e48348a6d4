use super::{required, Confirm, DeleteOutcome};
use crate::console::Console;
use crate::error::Result;
use crate::models::{EntityId, Movie, MovieDraft};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub thumbnail: String,
    pub featured: bool,
}

impl MovieForm {
    pub fn validate(&self) -> Result<MovieDraft> {
        Ok(MovieDraft {
            title: required("title", &self.title)?,
            thumbnail: self.thumbnail.trim().to_string(),
            is_featured: self.featured,
        })
    }
}

impl From<&Movie> for MovieForm {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            thumbnail: movie.thumbnail.clone(),
            featured: movie.is_featured,
        }
    }
}

impl Console {
    pub fn movies(&self, featured_only: bool) -> Vec<&Movie> {
        if featured_only {
            self.store().featured_movies().collect()
        } else {
            self.store().movies.iter().collect()
        }
    }

    pub fn movie_form(&self, id: EntityId) -> Result<MovieForm> {
        Ok(MovieForm::from(self.require::<Movie>(id)?))
    }

    pub async fn create_movie(&mut self, form: &MovieForm) -> Result<Option<Movie>> {
        let draft = form.validate()?;
        let created = self.api().create::<Movie, _>(&draft).await?;
        self.settle(created.clone().into_iter().collect(), created.is_some())
            .await;
        Ok(created)
    }

    pub async fn update_movie(&mut self, id: EntityId, form: &MovieForm) -> Result<Movie> {
        let draft = form.validate()?;
        self.require::<Movie>(id)?;
        let row = Movie {
            id,
            title: draft.title,
            thumbnail: draft.thumbnail,
            is_featured: draft.is_featured,
        };
        let stored = self.api().update(&row).await?.unwrap_or(row);
        self.settle(vec![stored.clone()], true).await;
        Ok(stored)
    }

    /// Adds a movie to, or removes it from, the featured rail.
    pub async fn set_featured(&mut self, id: EntityId, featured: bool) -> Result<Movie> {
        let mut form = self.movie_form(id)?;
        form.featured = featured;
        self.update_movie(id, &form).await
    }

    pub async fn delete_movie(
        &mut self,
        id: EntityId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome> {
        let title = self.require::<Movie>(id)?.title.clone();
        if !confirm.confirm(&format!("Delete movie \"{title}\"?")) {
            info!("Delete of movie {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        self.api().delete::<Movie>(id).await?;
        let removed = self.store_mut().remove_movie(id);
        self.settle_removal().await;
        Ok(DeleteOutcome::Deleted(removed))
    }
}
