//! Name → video lookup table rows.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::VIDEO_KIND;
use crate::error::{AnnotateError, Result};

/// One row of a mapping table. `name` is the join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl MappingRow {
    /// Build a row, trimming every cell and dropping blank optional cells.
    pub fn new(
        name: impl AsRef<str>,
        kind: Option<&str>,
        url: Option<&str>,
        file_id: Option<&str>,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            kind: non_blank(kind),
            url: non_blank(url),
            file_id: non_blank(file_id),
        }
    }

    /// Rows without a `type` are treated as videos.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind
            .as_deref()
            .is_none_or(|kind| kind.trim().eq_ignore_ascii_case(VIDEO_KIND))
    }

    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.url.is_some() || self.file_id.is_some()
    }
}

fn non_blank(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Ordered mapping table, static once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    rows: Vec<MappingRow>,
    duplicates: Vec<String>,
}

impl MappingTable {
    /// Keep rows in table order. Rows with an empty name are dropped; video
    /// names that repeat are kept (first one wins at lookup) and reported.
    #[must_use]
    pub fn from_rows(rows: Vec<MappingRow>) -> Self {
        let rows: Vec<MappingRow> = rows.into_iter().filter(|row| !row.name.is_empty()).collect();
        let duplicates = duplicate_names(&rows);
        if !duplicates.is_empty() {
            tracing::warn!(
                mapping.duplicates = duplicates.len(),
                "mapping table repeats names; first row wins: {}",
                duplicates.join(", ")
            );
        }
        Self { rows, duplicates }
    }

    /// Like [`MappingTable::from_rows`] but repeated names are an error.
    pub fn strict_from_rows(rows: Vec<MappingRow>) -> Result<Self> {
        let table = Self::from_rows(rows);
        if table.duplicates.is_empty() {
            Ok(table)
        } else {
            Err(AnnotateError::InvalidMapping {
                reason: format!("duplicate names: {}", table.duplicates.join(", ")).into(),
            })
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn duplicate_names(&self) -> &[String] {
        &self.duplicates
    }

    /// First playable video row matching a candidate, trying candidates in order.
    #[must_use]
    pub fn find_video(&self, candidates: &[&str]) -> Option<&MappingRow> {
        candidates.iter().find_map(|candidate| {
            self.rows
                .iter()
                .filter(|row| row.is_video() && row.is_playable())
                .find(|row| row.name == *candidate)
        })
    }
}

/// Names repeated among video rows. A video and, say, a thumbnail may share a name.
fn duplicate_names(rows: &[MappingRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for row in rows.iter().filter(|row| row.is_video()) {
        if !seen.insert(row.name.as_str()) && reported.insert(row.name.as_str()) {
            duplicates.push(row.name.clone());
        }
    }
    duplicates
}
