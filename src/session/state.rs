use std::sync::Arc;

use super::navigator::Navigator;
use crate::store::StoreId;
use crate::types::{Rater, Record};

/// Everything a session needs between interactions. Handlers return a new
/// value instead of mutating shared state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    source_name: Option<String>,
    records: Arc<[Record]>,
    navigator: Navigator,
    rater: Rater,
}

impl SessionState {
    #[must_use]
    pub fn new(rater: impl Into<Rater>) -> Self {
        Self {
            rater: rater.into(),
            ..Self::default()
        }
    }

    /// Replace the record sequence; the position goes back to the first record.
    #[must_use]
    pub fn with_source(&self, source_name: impl Into<String>, records: Vec<Record>) -> Self {
        let records: Arc<[Record]> = records.into();
        Self {
            source_name: Some(source_name.into()),
            navigator: Navigator::reset(records.len()),
            records,
            rater: self.rater.clone(),
        }
    }

    #[must_use]
    pub fn with_rater(&self, rater: impl Into<Rater>) -> Self {
        Self {
            rater: rater.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn next(&self) -> Self {
        self.with_navigator(self.navigator.next())
    }

    #[must_use]
    pub fn previous(&self) -> Self {
        self.with_navigator(self.navigator.previous())
    }

    #[must_use]
    pub fn jump_to(&self, index: usize) -> Self {
        self.with_navigator(self.navigator.jump_to(index))
    }

    fn with_navigator(&self, navigator: Navigator) -> Self {
        Self {
            navigator,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn navigator(&self) -> Navigator {
        self.navigator
    }

    #[must_use]
    pub fn rater(&self) -> &Rater {
        &self.rater
    }

    #[must_use]
    pub fn current(&self) -> Option<&Record> {
        self.records.get(self.navigator.position())
    }

    /// Store receiving this session's scores, once a source is loaded.
    #[must_use]
    pub fn store_id(&self) -> Option<StoreId> {
        self.source_name
            .as_deref()
            .map(|source| StoreId::new(source, self.rater.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordId;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record {
                id: RecordId::positional(i),
                video_ref: format!("v{i}.mp4"),
                prompt: String::new(),
                answer: String::new(),
            })
            .collect()
    }

    #[test]
    fn handlers_leave_the_input_state_untouched() {
        let state = SessionState::new("jy").with_source("a.jsonl", records(3));
        let moved = state.next().next();
        assert_eq!(state.navigator().position(), 0);
        assert_eq!(moved.navigator().position(), 2);
        assert_eq!(moved.current().map(|r| r.video_ref.as_str()), Some("v2.mp4"));
    }

    #[test]
    fn new_source_resets_position() {
        let state = SessionState::new("jy").with_source("a.jsonl", records(5)).jump_to(4);
        let switched = state.with_source("b.jsonl", records(2));
        assert_eq!(switched.navigator().position(), 0);
        assert_eq!(switched.navigator().len(), 2);
        assert_eq!(switched.rater().as_str(), "jy");
    }

    #[test]
    fn store_id_follows_source_and_rater() {
        let state = SessionState::new("").with_source("run.jsonl", records(1));
        let id = state.store_id().expect("store id");
        assert_eq!(id.file_name(), "run_anonymous.csv");
        assert!(SessionState::new("x").store_id().is_none());
    }
}
