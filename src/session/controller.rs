//! Glue between sources, the locator, and a score store, one handler per user action.

use std::path::Path;

use serde::Serialize;

use super::state::SessionState;
use crate::error::{AnnotateError, Result};
use crate::locator::{Resolution, VideoLocator};
use crate::reader::RecordSource;
use crate::store::{FileScoreStore, RaterColumn, ScoreStore, StoreId, UpsertOutcome, export_snapshot};
use crate::types::{AnnotatorConfig, Record, RecordId, Score, ScoreSnapshot};

/// What the rater sees for the current record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub record: Record,
    pub resolution: Resolution,
    /// Stored score, or the default when the record has not been scored.
    pub score: Score,
    pub scored: bool,
    pub progress: String,
}

/// Result of submitting a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved {
        record_id: RecordId,
        score: Score,
        snapshot: ScoreSnapshot,
    },
    /// The input was not an integer from 1 to 5; the stored value is unchanged.
    Skipped { input: String },
}

pub struct AnnotationController<S> {
    store: S,
    locator: VideoLocator,
    config: AnnotatorConfig,
}

impl AnnotationController<FileScoreStore> {
    /// Controller writing durable per-rater files under `config.results_dir`.
    #[must_use]
    pub fn with_file_store(config: AnnotatorConfig) -> Self {
        let store = FileScoreStore::from_config(&config);
        let locator = VideoLocator::from_config(&config);
        Self::new(store, locator, config)
    }
}

impl<S: ScoreStore> AnnotationController<S> {
    pub fn new(store: S, locator: VideoLocator, config: AnnotatorConfig) -> Self {
        Self {
            store,
            locator,
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn locator(&self) -> &VideoLocator {
        &self.locator
    }

    /// Swap the locator, e.g. after a mapping table was loaded.
    pub fn set_locator(&mut self, locator: VideoLocator) {
        self.locator = locator;
    }

    /// Load `source` into a new session derived from `state`. A failed load
    /// leaves the caller with its previous session.
    pub fn open_source(&self, state: &SessionState, source: &RecordSource) -> Result<SessionState> {
        let name = source.name();
        let records = source.load()?;
        if records.is_empty() {
            return Err(AnnotateError::EmptySource { source_name: name });
        }
        Ok(state.with_source(name, records))
    }

    pub fn current_view(&self, state: &SessionState) -> Result<ItemView> {
        let (record, store) = Self::current(state)?;
        let stored = self
            .store
            .read(&store)?
            .score_for(&record.id, state.rater());
        Ok(ItemView {
            resolution: self.locator.resolve(&record.video_ref),
            score: stored.unwrap_or_default(),
            scored: stored.is_some(),
            progress: state.navigator().progress_label(),
            record: record.clone(),
        })
    }

    /// Parse `raw` and record it for the current record under the session's rater.
    pub fn submit_score(&self, state: &SessionState, raw: &str) -> Result<SubmitOutcome> {
        let (record, store) = Self::current(state)?;
        let Ok(score) = raw.parse::<Score>() else {
            tracing::debug!(record.id = %record.id, input = raw, "ignoring invalid score input");
            return Ok(SubmitOutcome::Skipped {
                input: raw.to_string(),
            });
        };
        let video_name = self.locator.resolve(&record.video_ref).display_name;
        match self
            .store
            .upsert(&store, &record.id, &video_name, i64::from(score.get()))?
        {
            UpsertOutcome::Applied { snapshot, .. } => {
                tracing::info!(store = %store, record.id = %record.id, score = %score, "score saved");
                Ok(SubmitOutcome::Saved {
                    record_id: record.id.clone(),
                    score,
                    snapshot,
                })
            }
            UpsertOutcome::Skipped { .. } => Ok(SubmitOutcome::Skipped {
                input: raw.to_string(),
            }),
        }
    }

    /// Full table of the session's store.
    pub fn progress(&self, state: &SessionState) -> Result<ScoreSnapshot> {
        let store = Self::store_id(state)?;
        self.store.read(&store)
    }

    /// Write the session's store to `path` in the persisted layout. The
    /// `rater` column follows the store unless the config forces it.
    pub fn export(&self, state: &SessionState, path: impl AsRef<Path>) -> Result<ScoreSnapshot> {
        let snapshot = self.progress(state)?;
        let column = if self.config.include_rater_column {
            RaterColumn::Always
        } else {
            self.store.export_column()
        };
        export_snapshot(path, &snapshot, column)?;
        Ok(snapshot)
    }

    fn store_id(state: &SessionState) -> Result<StoreId> {
        state.store_id().ok_or_else(|| AnnotateError::EmptySource {
            source_name: String::new(),
        })
    }

    fn current(state: &SessionState) -> Result<(&Record, StoreId)> {
        let store = Self::store_id(state)?;
        let record = state.current().ok_or_else(|| AnnotateError::EmptySource {
            source_name: store.source().to_string(),
        })?;
        Ok((record, store))
    }
}
