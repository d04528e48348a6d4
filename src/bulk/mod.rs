use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::models::{EntityId, Episode, Season};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// URL/episode pairs after truncating to the shorter list.
    pub matched: usize,
    pub updated: usize,
    pub failed: usize,
}

/// One URL per non-blank line, trimmed.
pub fn split_urls(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

impl Console {
    /// Assigns pasted playback URLs to a season's episodes in playback order,
    /// starting at `start`. Each episode is PUT on its own; `progress` sees
    /// `(done, matched)` after every request.
    #[instrument(skip(self, text, progress))]
    pub async fn assign_urls(
        &mut self,
        season_id: EntityId,
        start: EntityId,
        text: &str,
        mut progress: impl FnMut(usize, usize),
    ) -> Result<BulkReport> {
        self.require::<Season>(season_id)?;
        let episodes = self.store().episodes_of(season_id);
        let offset = episodes
            .iter()
            .position(|e| e.id == start)
            .ok_or(ConsoleError::NotFound {
                kind: "Episode",
                id: start.0,
            })?;

        let urls = split_urls(text);
        let pairs: Vec<(Episode, String)> = episodes[offset..]
            .iter()
            .zip(urls)
            .map(|(episode, url)| ((*episode).clone(), url.to_string()))
            .collect();

        let mut report = BulkReport {
            matched: pairs.len(),
            ..BulkReport::default()
        };
        info!("Assigning {} URLs", report.matched);

        let mut rows = Vec::with_capacity(pairs.len());
        for (done, (mut episode, url)) in pairs.into_iter().enumerate() {
            episode.file_url = url;
            match self.api().update(&episode).await {
                Ok(stored) => {
                    report.updated += 1;
                    rows.push(stored.unwrap_or(episode));
                }
                Err(e) => {
                    warn!("Failed to update episode {}: {}", episode.id, e);
                    report.failed += 1;
                }
            }
            progress(done + 1, report.matched);
        }

        if report.updated > 0 {
            self.settle(rows, true).await;
        }
        Ok(report)
    }
}
