//! Score stores: durable per-rater files and per-session memory.
//!
//! Both backends follow the same cycle: validate the score, take the store's
//! exclusive scope, load the snapshot, overwrite the `(record_id, rater)` row in
//! place or append it, persist the whole snapshot, release. An out-of-range
//! score never reaches the store.

mod file;
pub mod layout;
mod memory;

use std::fmt;
use std::path::Path;

pub use file::FileScoreStore;
pub use layout::{RaterColumn, export_snapshot, load_export, read_snapshot, write_snapshot};
pub use memory::MemoryScoreStore;

use crate::constants::SCORE_FILE_EXTENSION;
use crate::error::Result;
use crate::types::{Rater, RecordId, Score, ScoreEntry, ScoreSnapshot, UpsertEffect};

/// Names one store: the record source it scores and the rater writing to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreId {
    source: String,
    rater: Rater,
}

impl StoreId {
    /// `source_name` may be a file name; its extension is dropped.
    pub fn new(source_name: &str, rater: impl Into<Rater>) -> Self {
        let trimmed = source_name.trim();
        let source = Path::new(trimmed)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| trimmed.to_string());
        Self {
            source,
            rater: rater.into(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn rater(&self) -> &Rater {
        &self.rater
    }

    /// File name of the durable store: `<source>_<rater>.csv`, with the rater
    /// percent-encoded so the last `_` always starts the rater part.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.{SCORE_FILE_EXTENSION}",
            self.source,
            self.rater.file_component()
        )
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.rater)
    }
}

/// Result of an upsert: the store's full snapshot after the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Applied {
        snapshot: ScoreSnapshot,
        effect: UpsertEffect,
    },
    /// The score was invalid; nothing was written.
    Skipped { snapshot: ScoreSnapshot },
}

impl UpsertOutcome {
    #[must_use]
    pub fn snapshot(&self) -> &ScoreSnapshot {
        match self {
            Self::Applied { snapshot, .. } | Self::Skipped { snapshot } => snapshot,
        }
    }

    #[must_use]
    pub fn into_snapshot(self) -> ScoreSnapshot {
        match self {
            Self::Applied { snapshot, .. } | Self::Skipped { snapshot } => snapshot,
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Insert-or-update storage keyed by `(record_id, rater)`.
///
/// The rater of an upsert is the rater of its [`StoreId`].
pub trait ScoreStore: Send + Sync {
    /// Record `score` for `record_id`. Scores outside 1..=5 are skipped
    /// without touching the store.
    fn upsert(
        &self,
        store: &StoreId,
        record_id: &RecordId,
        video_name: &str,
        score: i64,
    ) -> Result<UpsertOutcome>;

    /// Every entry of the store, in insertion order.
    fn read(&self, store: &StoreId) -> Result<ScoreSnapshot>;

    /// Rater column used when exporting this store.
    fn export_column(&self) -> RaterColumn {
        RaterColumn::Auto
    }
}

/// Validate a raw score and build the entry an upsert would write.
pub(crate) fn validated_entry(
    store: &StoreId,
    record_id: &RecordId,
    video_name: &str,
    score: i64,
) -> Option<ScoreEntry> {
    let Some(score) = Score::new(score) else {
        tracing::debug!(
            store = %store,
            record.id = %record_id,
            score,
            "skipping upsert with out-of-range score"
        );
        return None;
    };
    Some(ScoreEntry {
        record_id: record_id.clone(),
        rater: store.rater().clone(),
        video_name: video_name.to_string(),
        score,
    })
}
