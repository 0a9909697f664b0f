//! Video resolution: turn a raw record reference into something playable.
//!
//! Rules are tried in a fixed order and the first match wins:
//! 1. an `http(s)` reference is played as-is;
//! 2. the mapping table, trying the derived variant name before the literal name;
//! 3. the remote folder index, same candidate order;
//! 4. the local video root, same candidate order.
//!
//! Anything else is unresolved, but still carries its display name.

pub mod folder;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use folder::{FolderIndex, FolderLister, RemoteFile, StaticFolderLister};

use crate::constants::{CLOUD_PREVIEW_TEMPLATE, DEFAULT_DERIVED_SUFFIX};
use crate::types::{AnnotatorConfig, MappingTable};

/// A reference a player can consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayableRef {
    /// Streamable URL for a native player.
    DirectUrl { url: String },
    /// Opaque cloud file id; must be shown through an embedded preview.
    CloudPreview { file_id: String },
    /// File on local disk.
    LocalFile { path: PathBuf },
}

impl PlayableRef {
    /// URL for an iframe-style preview, only for cloud references.
    #[must_use]
    pub fn embed_url(&self) -> Option<String> {
        match self {
            Self::CloudPreview { file_id } => Some(CLOUD_PREVIEW_TEMPLATE.replace("{id}", file_id)),
            _ => None,
        }
    }

    #[must_use]
    pub fn needs_embed(&self) -> bool {
        matches!(self, Self::CloudPreview { .. })
    }
}

/// Outcome of resolving one reference. `playable` is `None` when unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub playable: Option<PlayableRef>,
    pub display_name: String,
}

impl Resolution {
    fn unresolved(display_name: String) -> Self {
        Self {
            playable: None,
            display_name,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.playable.is_some()
    }

    /// What the rater can do about an unresolved video.
    #[must_use]
    pub fn guidance(&self) -> Option<String> {
        if self.is_resolved() {
            return None;
        }
        if self.display_name.is_empty() {
            return Some("this record has no video reference".to_string());
        }
        Some(format!(
            "could not find a playable source for '{}': add a mapping row with this name and a url or file_id, \
             upload it to the shared folder, or place it under the local video root",
            self.display_name
        ))
    }
}

/// Resolves raw references against optional lookup sources.
#[derive(Debug, Clone)]
pub struct VideoLocator {
    mapping: Option<Arc<MappingTable>>,
    folder: Option<Arc<FolderIndex>>,
    video_root: Option<PathBuf>,
    derived_suffix: String,
}

impl Default for VideoLocator {
    fn default() -> Self {
        Self {
            mapping: None,
            folder: None,
            video_root: None,
            derived_suffix: DEFAULT_DERIVED_SUFFIX.to_string(),
        }
    }
}

impl VideoLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator configured with the derived suffix and video root of `config`.
    #[must_use]
    pub fn from_config(config: &AnnotatorConfig) -> Self {
        Self {
            video_root: config.video_root.clone(),
            derived_suffix: config.derived_suffix.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: impl Into<Arc<MappingTable>>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    #[must_use]
    pub fn with_folder_index(mut self, folder: impl Into<Arc<FolderIndex>>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    #[must_use]
    pub fn with_video_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.video_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_derived_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.derived_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn mapping(&self) -> Option<&MappingTable> {
        self.mapping.as_deref()
    }

    #[must_use]
    pub fn resolve(&self, raw_ref: &str) -> Resolution {
        let raw_ref = raw_ref.trim();
        if raw_ref.is_empty() {
            return Resolution::unresolved(String::new());
        }
        let display_name = display_name(raw_ref);

        if is_http_url(raw_ref) {
            return Resolution {
                playable: Some(PlayableRef::DirectUrl {
                    url: raw_ref.to_string(),
                }),
                display_name,
            };
        }

        let derived = derived_name(&display_name, &self.derived_suffix);
        let candidates: Vec<&str> = derived
            .as_deref()
            .into_iter()
            .chain(std::iter::once(display_name.as_str()))
            .filter(|name| !name.is_empty())
            .collect();

        let playable = self
            .from_mapping(&candidates)
            .or_else(|| self.from_folder(&candidates))
            .or_else(|| self.from_video_root(&candidates));

        if playable.is_none() {
            tracing::debug!(video.name = %display_name, "video reference unresolved");
        }
        Resolution {
            playable,
            display_name,
        }
    }

    fn from_mapping(&self, candidates: &[&str]) -> Option<PlayableRef> {
        let mapping = self.mapping.as_deref().filter(|table| !table.is_empty())?;
        let row = mapping.find_video(candidates)?;
        match (&row.url, &row.file_id) {
            (Some(url), _) => Some(PlayableRef::DirectUrl { url: url.clone() }),
            (None, Some(file_id)) => Some(PlayableRef::CloudPreview {
                file_id: file_id.clone(),
            }),
            (None, None) => None,
        }
    }

    fn from_folder(&self, candidates: &[&str]) -> Option<PlayableRef> {
        let folder = self.folder.as_deref()?;
        candidates.iter().find_map(|name| {
            folder.file_id(name).map(|file_id| PlayableRef::CloudPreview {
                file_id: file_id.to_string(),
            })
        })
    }

    fn from_video_root(&self, candidates: &[&str]) -> Option<PlayableRef> {
        let root = self.video_root.as_deref()?;
        candidates
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .map(|path| PlayableRef::LocalFile { path })
    }
}

/// Resolve with only a mapping table and the default derived suffix.
#[must_use]
pub fn resolve(raw_ref: &str, mapping: Option<&MappingTable>) -> Resolution {
    let mut locator = VideoLocator::new();
    if let Some(mapping) = mapping {
        locator = locator.with_mapping(mapping.clone());
    }
    locator.resolve(raw_ref)
}

fn is_http_url(raw_ref: &str) -> bool {
    let lower = raw_ref.get(..8).unwrap_or(raw_ref).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Final path segment of a file path or URL, without query or fragment.
#[must_use]
pub fn display_name(raw_ref: &str) -> String {
    let raw_ref = raw_ref.trim();
    let path = if is_http_url(raw_ref) {
        raw_ref.split(['?', '#']).next().unwrap_or(raw_ref)
    } else {
        raw_ref
    };
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .trim()
        .to_string()
}

/// Name of the reprocessed variant: the suffix goes before the extension.
/// `None` when the name is empty or already names the variant.
#[must_use]
pub fn derived_name(display_name: &str, suffix: &str) -> Option<String> {
    if display_name.is_empty() || suffix.is_empty() {
        return None;
    }
    let path = Path::new(display_name);
    let stem = path.file_stem()?.to_str()?;
    if stem.ends_with(suffix) {
        return None;
    }
    Some(match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}{suffix}.{ext}"),
        None => format!("{stem}{suffix}"),
    })
}
