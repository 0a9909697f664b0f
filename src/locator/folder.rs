//! Remote folder listings used as a fallback name → file id index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One file in a remote folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    pub file_id: String,
}

impl RemoteFile {
    pub fn new(name: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_id: file_id.into(),
        }
    }
}

/// Lists the files of a remote folder. Crawling and authentication belong to
/// the implementor.
pub trait FolderLister {
    fn list(&self) -> Result<Vec<RemoteFile>>;
}

/// A listing captured ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticFolderLister {
    files: Vec<RemoteFile>,
}

impl StaticFolderLister {
    #[must_use]
    pub fn new(files: Vec<RemoteFile>) -> Self {
        Self { files }
    }
}

impl FolderLister for StaticFolderLister {
    fn list(&self) -> Result<Vec<RemoteFile>> {
        Ok(self.files.clone())
    }
}

/// Exact-name index over a folder listing; the first file listed under a name wins.
#[derive(Debug, Clone, Default)]
pub struct FolderIndex {
    by_name: HashMap<String, String>,
}

impl FolderIndex {
    pub fn from_lister(lister: &dyn FolderLister) -> Result<Self> {
        let files = lister.list()?;
        let index = Self::from_files(files);
        tracing::debug!(folder.files = index.len(), "indexed remote folder");
        Ok(index)
    }

    pub fn from_files<I>(files: I) -> Self
    where
        I: IntoIterator<Item = RemoteFile>,
    {
        let mut by_name = HashMap::new();
        for file in files {
            let name = file.name.trim().to_string();
            if name.is_empty() || file.file_id.trim().is_empty() {
                continue;
            }
            by_name.entry(name).or_insert_with(|| file.file_id.trim().to_string());
        }
        Self { by_name }
    }

    #[must_use]
    pub fn file_id(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
