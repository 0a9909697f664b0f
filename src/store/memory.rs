//! Per-session store for deployments without durable storage. One store per
//! source; raters share it and are told apart by the row's `rater` field.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{RaterColumn, ScoreStore, StoreId, UpsertOutcome, validated_entry};
use crate::error::{AnnotateError, Result};
use crate::types::{RecordId, ScoreSnapshot};

#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    stores: Mutex<HashMap<String, Arc<Mutex<ScoreSnapshot>>>>,
}

fn lock_poisoned<T>(_: T) -> AnnotateError {
    AnnotateError::Lock("in-memory score store lock poisoned".into())
}

impl MemoryScoreStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-source slot. The outer map is locked only long enough to find it,
    /// so writers to different sources never wait on each other.
    fn slot(&self, source: &str) -> Result<Arc<Mutex<ScoreSnapshot>>> {
        let mut stores = self.stores.lock().map_err(lock_poisoned)?;
        Ok(Arc::clone(stores.entry(source.to_string()).or_default()))
    }

    fn guard(slot: &Mutex<ScoreSnapshot>) -> Result<MutexGuard<'_, ScoreSnapshot>> {
        slot.lock().map_err(lock_poisoned)
    }

    /// Sources that have received at least one lookup or write.
    pub fn sources(&self) -> Result<Vec<String>> {
        let stores = self.stores.lock().map_err(lock_poisoned)?;
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl ScoreStore for MemoryScoreStore {
    fn upsert(
        &self,
        store: &StoreId,
        record_id: &RecordId,
        video_name: &str,
        score: i64,
    ) -> Result<UpsertOutcome> {
        let slot = self.slot(store.source())?;
        let mut snapshot = Self::guard(&slot)?;
        let Some(entry) = validated_entry(store, record_id, video_name, score) else {
            return Ok(UpsertOutcome::Skipped {
                snapshot: snapshot.clone(),
            });
        };
        let effect = snapshot.upsert(entry);
        Ok(UpsertOutcome::Applied {
            snapshot: snapshot.clone(),
            effect,
        })
    }

    fn read(&self, store: &StoreId) -> Result<ScoreSnapshot> {
        let slot = self.slot(store.source())?;
        let snapshot = Self::guard(&slot)?;
        Ok(snapshot.clone())
    }

    /// Raters share a table here, so exports always say who scored what.
    fn export_column(&self) -> RaterColumn {
        RaterColumn::Always
    }
}
