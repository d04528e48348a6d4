//! List/create/update/delete for each catalog collection.

mod episodes;
mod movies;
mod seasons;
mod shows;

pub use episodes::EpisodeForm;
pub use movies::MovieForm;
pub use seasons::SeasonForm;
pub use shows::ShowForm;

use crate::error::{ConsoleError, Result};
use crate::models::EntityId;
use crate::store::Removed;

/// Asks the operator before an irreversible delete.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The operator declined; nothing was sent.
    Cancelled,
    /// The row is gone, along with whatever the cascade took locally.
    Deleted(Removed),
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn required_id(field: &str, value: Option<EntityId>) -> Result<EntityId> {
    value
        .filter(|id| id.0 != 0)
        .ok_or_else(|| ConsoleError::Validation(format!("{field} is required")))
}
