//! Durable store: one CSV per `(source, rater)` under a results directory.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;

use super::layout::{RaterColumn, read_snapshot, write_snapshot};
use super::{ScoreStore, StoreId, UpsertOutcome, validated_entry};
use crate::error::{AnnotateError, Result};
use crate::lock::FileLock;
use crate::types::{AnnotatorConfig, LockSettings, Rater, RecordId, ScoreSnapshot};

/// Staged replacement of a store file; readers see either the old or the new
/// file, never a partial write.
struct CommitStaging {
    atomic: AtomicWriteFile,
}

impl CommitStaging {
    fn prepare(path: &Path) -> Result<Self> {
        let atomic = AtomicWriteFile::options().open(path)?;
        Ok(Self { atomic })
    }

    fn write(&mut self, snapshot: &ScoreSnapshot) -> Result<()> {
        write_snapshot(&mut self.atomic, snapshot, RaterColumn::Auto)?;
        self.atomic.flush()?;
        self.atomic.as_file().sync_all()?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.atomic.commit().map_err(Into::into)
    }

    fn discard(self) -> Result<()> {
        self.atomic.discard().map_err(Into::into)
    }
}

/// File-backed score store guarded by `<file>.lock`.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    root: PathBuf,
    lock: LockSettings,
}

impl FileScoreStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: LockSettings::default(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AnnotatorConfig) -> Self {
        Self {
            root: config.results_dir.clone(),
            lock: config.lock,
        }
    }

    #[must_use]
    pub fn with_lock_settings(mut self, lock: LockSettings) -> Self {
        self.lock = lock;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, store: &StoreId) -> PathBuf {
        self.root.join(store.file_name())
    }

    /// Current contents; missing files are empty and malformed ones are
    /// treated as empty so a corrupt table never blocks scoring.
    fn load(path: &Path, rater: &Rater) -> Result<ScoreSnapshot> {
        let file = match fs_err::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ScoreSnapshot::new()),
            Err(err) => return Err(err.into()),
        };
        match read_snapshot(file, rater) {
            Ok(snapshot) => Ok(snapshot),
            Err(err) if err.is_io() => Err(err),
            Err(err) => {
                tracing::warn!(store.path = %path.display(), "ignoring malformed score table: {err}");
                Ok(ScoreSnapshot::new())
            }
        }
    }

    fn persist(path: &Path, snapshot: &ScoreSnapshot) -> Result<()> {
        let mut staging = CommitStaging::prepare(path)?;
        if let Err(err) = staging.write(snapshot) {
            if let Err(discard_err) = staging.discard() {
                tracing::warn!(store.path = %path.display(), "failed to discard staged write: {discard_err}");
            }
            return Err(err);
        }
        staging.commit().map_err(|err| AnnotateError::StoreWrite {
            path: path.to_path_buf(),
            reason: err.to_string().into(),
        })
    }
}

impl ScoreStore for FileScoreStore {
    fn upsert(
        &self,
        store: &StoreId,
        record_id: &RecordId,
        video_name: &str,
        score: i64,
    ) -> Result<UpsertOutcome> {
        // Invalid scores never touch the file. A missing store reads as empty;
        // any other read failure is still reported since the outcome carries
        // the current snapshot.
        let Some(entry) = validated_entry(store, record_id, video_name, score) else {
            return Ok(UpsertOutcome::Skipped {
                snapshot: self.read(store)?,
            });
        };

        let path = self.path_for(store);
        fs_err::create_dir_all(&self.root)?;
        let _lock = FileLock::acquire(&path, &self.lock)?;

        let mut snapshot = Self::load(&path, store.rater())?;
        let effect = snapshot.upsert(entry);
        Self::persist(&path, &snapshot)?;

        tracing::debug!(
            store.path = %path.display(),
            record.id = %record_id,
            score,
            effect = ?effect,
            "score upserted"
        );
        Ok(UpsertOutcome::Applied { snapshot, effect })
    }

    fn read(&self, store: &StoreId) -> Result<ScoreSnapshot> {
        Self::load(&self.path_for(store), store.rater())
    }
}
