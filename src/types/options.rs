//! Configuration for stores, locks, and video resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DERIVED_SUFFIX, DEFAULT_LOCK_POLL_MS, DEFAULT_LOCK_TIMEOUT_MS};
use crate::error::Result;

fn default_results_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join("mos-annotate").join("results"))
        .unwrap_or_else(|| PathBuf::from("mos_results"))
}

fn default_derived_suffix() -> String {
    DEFAULT_DERIVED_SUFFIX.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

fn default_lock_poll_ms() -> u64 {
    DEFAULT_LOCK_POLL_MS
}

/// How long a writer waits for a store lock and how often it retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSettings {
    #[serde(default = "default_lock_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_lock_poll_ms")]
    pub poll_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            poll_ms: DEFAULT_LOCK_POLL_MS,
        }
    }
}

/// Deployment settings for an annotation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Directory holding one score file per `(source, rater)`.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Local directory probed for videos after the mapping table and folder index.
    #[serde(default)]
    pub video_root: Option<PathBuf>,
    /// Suffix naming the reprocessed variant of a video (`clip01__cv2.mp4`).
    #[serde(default = "default_derived_suffix")]
    pub derived_suffix: String,
    #[serde(default)]
    pub lock: LockSettings,
    /// Always write a `rater` column in exports, even for single-rater stores.
    #[serde(default)]
    pub include_rater_column: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            video_root: None,
            derived_suffix: default_derived_suffix(),
            lock: LockSettings::default(),
            include_rater_column: false,
        }
    }
}

impl AnnotatorConfig {
    /// Start a fluent builder for `AnnotatorConfig`.
    #[must_use]
    pub fn builder() -> AnnotatorConfigBuilder {
        AnnotatorConfigBuilder::default()
    }

    /// Read a JSON config file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs_err::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotatorConfigBuilder {
    inner: AnnotatorConfig,
}

impl AnnotatorConfigBuilder {
    #[must_use]
    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.results_dir = dir.into();
        self
    }

    #[must_use]
    pub fn video_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.video_root = Some(dir.into());
        self
    }

    #[must_use]
    pub fn derived_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.inner.derived_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.inner.lock.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn lock_poll_ms(mut self, poll_ms: u64) -> Self {
        self.inner.lock.poll_ms = poll_ms;
        self
    }

    #[must_use]
    pub fn include_rater_column(mut self, include: bool) -> Self {
        self.inner.include_rater_column = include;
        self
    }

    #[must_use]
    pub fn build(self) -> AnnotatorConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_json_takes_defaults() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("annotator.json");
        std::fs::write(&path, br#"{"results_dir": "/data/mos", "lock": {"timeout_ms": 500}}"#)
            .expect("write config");

        let config = AnnotatorConfig::from_json_file(&path).expect("config");
        assert_eq!(config.results_dir, PathBuf::from("/data/mos"));
        assert_eq!(config.lock.timeout_ms, 500);
        assert_eq!(config.lock.poll_ms, DEFAULT_LOCK_POLL_MS);
        assert_eq!(config.derived_suffix, DEFAULT_DERIVED_SUFFIX);
        assert!(config.video_root.is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = AnnotatorConfig::builder()
            .results_dir("/tmp/r")
            .video_root("/videos")
            .derived_suffix("_h264")
            .lock_timeout_ms(42)
            .include_rater_column(true)
            .build();
        assert_eq!(config.results_dir, PathBuf::from("/tmp/r"));
        assert_eq!(config.video_root, Some(PathBuf::from("/videos")));
        assert_eq!(config.derived_suffix, "_h264");
        assert_eq!(config.lock.timeout_ms, 42);
        assert!(config.include_rater_column);
    }
}
