//! Tabular layout shared by persisted score files and exports:
//! `id,video,score` plus a `rater` column when several raters share a table.

use std::io::{Read, Write};
use std::path::Path;

use atomic_write_file::AtomicWriteFile;

use crate::constants::{COLUMN_ID, COLUMN_RATER, COLUMN_SCORE, COLUMN_VIDEO};
use crate::error::{AnnotateError, Result};
use crate::types::{Rater, RecordId, Score, ScoreEntry, ScoreSnapshot};

/// Whether the `rater` column is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaterColumn {
    /// Only when the snapshot holds more than one rater.
    #[default]
    Auto,
    Always,
    Never,
}

impl RaterColumn {
    fn include(self, snapshot: &ScoreSnapshot) -> bool {
        match self {
            Self::Auto => snapshot.raters().len() > 1,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

pub fn write_snapshot<W: Write>(writer: W, snapshot: &ScoreSnapshot, column: RaterColumn) -> Result<()> {
    let with_rater = column.include(snapshot);
    let mut out = csv::Writer::from_writer(writer);
    if with_rater {
        out.write_record([COLUMN_ID, COLUMN_VIDEO, COLUMN_SCORE, COLUMN_RATER])?;
    } else {
        out.write_record([COLUMN_ID, COLUMN_VIDEO, COLUMN_SCORE])?;
    }
    for entry in snapshot {
        let score = entry.score.to_string();
        if with_rater {
            out.write_record([
                entry.record_id.as_str(),
                entry.video_name.as_str(),
                score.as_str(),
                entry.rater.as_str(),
            ])?;
        } else {
            out.write_record([entry.record_id.as_str(), entry.video_name.as_str(), score.as_str()])?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Parse a score table. Rows without a readable id or with an invalid score
/// are dropped; rows without a `rater` cell belong to `default_rater`. Video
/// names that are not UTF-8 are decoded lossily. I/O failures of `reader` are
/// errors, never dropped rows.
pub fn read_snapshot<R: Read>(reader: R, default_rater: &Rater) -> Result<ScoreSnapshot> {
    let mut input = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = input
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let (Some(id_col), Some(score_col)) = (position(COLUMN_ID), position(COLUMN_SCORE)) else {
        return Err(AnnotateError::MalformedStore {
            reason: format!("expected `{COLUMN_ID}` and `{COLUMN_SCORE}` columns, found {headers:?}").into(),
        });
    };
    let video_col = position(COLUMN_VIDEO);
    let rater_col = position(COLUMN_RATER);

    let mut entries = Vec::new();
    let mut dropped = 0usize;
    for row in input.byte_records() {
        let row = row?;
        let id = text(&row, id_col).unwrap_or_default();
        let score = text(&row, score_col)
            .and_then(parse_stored_score)
            .filter(|_| !id.is_empty());
        let Some(score) = score else {
            dropped += 1;
            continue;
        };
        let rater = rater_col
            .and_then(|col| text(&row, col))
            .filter(|cell| !cell.is_empty())
            .map_or_else(|| default_rater.clone(), Rater::new);
        let video_name = video_col
            .and_then(|col| row.get(col))
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .unwrap_or_default();
        entries.push(ScoreEntry {
            record_id: RecordId::new(id),
            rater,
            video_name,
            score,
        });
    }
    if dropped > 0 {
        tracing::warn!(store.dropped_rows = dropped, "dropped unreadable score rows");
    }
    Ok(ScoreSnapshot::from_entries(entries))
}

fn text(row: &csv::ByteRecord, col: usize) -> Option<&str> {
    row.get(col).and_then(|cell| std::str::from_utf8(cell).ok())
}

/// Integers, or floats with no fractional part as written by some spreadsheet tools.
fn parse_stored_score(cell: &str) -> Option<Score> {
    if let Ok(score) = cell.parse::<Score>() {
        return Some(score);
    }
    let value = cell.parse::<f64>().ok().filter(|v| v.fract() == 0.0)?;
    Score::new(value as i64)
}

/// Write a downloadable export of `snapshot`, replacing `path` atomically.
pub fn export_snapshot(path: impl AsRef<Path>, snapshot: &ScoreSnapshot, column: RaterColumn) -> Result<()> {
    let path = path.as_ref();
    let mut file = AtomicWriteFile::open(path)?;
    write_snapshot(&mut file, snapshot, column)?;
    file.commit()?;
    tracing::info!(export.path = %path.display(), export.rows = snapshot.len(), "exported scores");
    Ok(())
}

/// Load an export (or any persisted score table) back into a snapshot.
pub fn load_export(path: impl AsRef<Path>, default_rater: &Rater) -> Result<ScoreSnapshot> {
    let file = fs_err::File::open(path.as_ref())?;
    read_snapshot(file, default_rater)
}
