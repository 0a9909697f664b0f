//! Record and mapping-table sources.
//!
//! A source is a local file, an HTTP(S) URL (feature `remote`), or an uploaded
//! blob. Loading is all-or-nothing at the source level: fetch or parse errors
//! surface as [`AnnotateError::SourceLoad`] and no partial state is returned.
//! Within a JSONL source individual malformed lines are dropped.

mod csv_table;
mod jsonl;
mod remote;
mod xlsx_table;

use std::path::{Path, PathBuf};

pub use csv_table::CsvMappingReader;
pub use jsonl::{LoadReport, parse_jsonl, parse_jsonl_report, parse_record};
pub use xlsx_table::XlsxMappingReader;

use crate::constants::RECORD_SOURCE_EXTENSION;
use crate::error::{AnnotateError, Result};
use crate::types::{MappingRow, MappingTable, Record};

/// Where a sequence of records or a mapping table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
    Blob { name: String, bytes: Vec<u8> },
}

impl SourceLocation {
    /// Display name: the final path segment of the file or URL, or the blob name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Url(url) => url
                .split(['?', '#'])
                .next()
                .unwrap_or(url)
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(url)
                .to_string(),
            Self::Blob { name, .. } => name.clone(),
        }
    }

    /// Raw bytes of the source. Errors are reported against the source name.
    pub fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => {
                fs_err::read(path).map_err(|err| AnnotateError::source_load(self.name(), err.to_string()))
            }
            Self::Url(url) => remote::fetch(&self.name(), url),
            Self::Blob { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

/// Ordered annotation records loaded from one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSource {
    location: SourceLocation,
}

impl RecordSource {
    #[must_use]
    pub fn new(location: SourceLocation) -> Self {
        Self { location }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(SourceLocation::File(path.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(SourceLocation::Url(url.into()))
    }

    pub fn blob(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(SourceLocation::Blob {
            name: name.into(),
            bytes: bytes.into(),
        })
    }

    #[must_use]
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.location.name()
    }

    /// Fetch and parse the whole source.
    pub fn load(&self) -> Result<Vec<Record>> {
        Ok(self.load_report()?.records)
    }

    /// Like [`RecordSource::load`] but also reports how many lines were dropped.
    pub fn load_report(&self) -> Result<LoadReport> {
        let bytes = self.location.fetch()?;
        let report = parse_jsonl_report(&bytes);
        tracing::info!(
            source.name = %self.name(),
            source.records = report.records.len(),
            source.skipped = report.skipped_lines,
            "loaded record source"
        );
        Ok(report)
    }
}

/// List the record sources in `dir`, sorted by file name.
pub fn discover_sources(dir: impl AsRef<Path>) -> Result<Vec<RecordSource>> {
    let mut paths = Vec::new();
    for entry in fs_err::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_source = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(RECORD_SOURCE_EXTENSION));
        if is_source {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths.into_iter().map(RecordSource::file).collect())
}

/// Table formats understood by the mapping readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Guess the format from a file name extension.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("xlsx") {
            Some(Self::Xlsx)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else {
            None
        }
    }
}

/// Hint provided to mapping readers before parsing.
#[derive(Debug, Clone, Copy)]
pub struct TableHint<'a> {
    pub format: Option<TableFormat>,
    pub magic_bytes: Option<&'a [u8]>,
}

impl<'a> TableHint<'a> {
    #[must_use]
    pub fn new(format: Option<TableFormat>) -> Self {
        Self {
            format,
            magic_bytes: None,
        }
    }

    #[must_use]
    pub fn with_magic(mut self, magic: Option<&'a [u8]>) -> Self {
        self.magic_bytes = magic;
        self
    }
}

/// Trait implemented by readers that turn tabular bytes into mapping rows.
pub trait MappingReader: Send + Sync {
    /// Human-readable name used for diagnostics.
    fn name(&self) -> &'static str;

    /// Return true if this reader is a good match for the provided hint.
    fn supports(&self, hint: &TableHint<'_>) -> bool;

    /// Parse rows in table order.
    fn read(&self, bytes: &[u8]) -> Result<Vec<MappingRow>>;
}

/// Registry of mapping readers, consulted in registration order.
pub struct MappingReaderRegistry {
    readers: Vec<Box<dyn MappingReader>>,
}

impl MappingReaderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    pub fn register<R>(&mut self, reader: R)
    where
        R: MappingReader + 'static,
    {
        self.readers.push(Box::new(reader));
    }

    pub fn find_reader<'a>(&'a self, hint: &TableHint<'_>) -> Option<&'a dyn MappingReader> {
        self.readers
            .iter()
            .map(std::convert::AsRef::as_ref)
            .find(|reader| reader.supports(hint))
    }
}

impl Default for MappingReaderRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(XlsxMappingReader);
        registry.register(CsvMappingReader);
        registry
    }
}

/// A mapping table loaded from one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSource {
    location: SourceLocation,
    strict: bool,
}

impl MappingSource {
    #[must_use]
    pub fn new(location: SourceLocation) -> Self {
        Self {
            location,
            strict: false,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(SourceLocation::File(path.into()))
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(SourceLocation::Url(url.into()))
    }

    pub fn blob(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(SourceLocation::Blob {
            name: name.into(),
            bytes: bytes.into(),
        })
    }

    /// Reject tables that repeat a name instead of letting the first row win.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn load(&self) -> Result<MappingTable> {
        self.load_with(&MappingReaderRegistry::default())
    }

    pub fn load_with(&self, registry: &MappingReaderRegistry) -> Result<MappingTable> {
        let name = self.location.name();
        let bytes = self.location.fetch()?;
        let hint = TableHint::new(TableFormat::from_name(&name))
            .with_magic(Some(&bytes[..bytes.len().min(4)]));
        let reader = registry.find_reader(&hint).ok_or_else(|| {
            AnnotateError::source_load(name.clone(), "no mapping reader accepts this table")
        })?;
        let rows = reader.read(&bytes).map_err(|err| match err {
            AnnotateError::InvalidMapping { .. } => err,
            other => AnnotateError::source_load(name.clone(), other.to_string()),
        })?;
        let table = if self.strict {
            MappingTable::strict_from_rows(rows)?
        } else {
            MappingTable::from_rows(rows)
        };
        tracing::info!(
            mapping.name = %name,
            mapping.reader = reader.name(),
            mapping.rows = table.len(),
            "loaded mapping table"
        );
        Ok(table)
    }
}

/// Resolve a header row into column positions, lowercasing and trimming names.
pub(crate) fn mapping_columns<'a, I>(headers: I) -> Result<MappingColumns>
where
    I: IntoIterator<Item = &'a str>,
{
    use crate::constants::{MAPPING_FILE_ID, MAPPING_NAME, MAPPING_TYPE, MAPPING_URL};

    let mut columns = MappingColumns::default();
    let mut name = None;
    for (index, header) in headers.into_iter().enumerate() {
        let header = header.trim().trim_start_matches('\u{feff}').to_ascii_lowercase();
        let slot = match header.as_str() {
            MAPPING_NAME => &mut name,
            MAPPING_TYPE => &mut columns.kind,
            MAPPING_URL => &mut columns.url,
            MAPPING_FILE_ID => &mut columns.file_id,
            _ => continue,
        };
        slot.get_or_insert(index);
    }
    columns.name = name.ok_or_else(|| AnnotateError::InvalidMapping {
        reason: "missing mandatory `name` column".into(),
    })?;
    Ok(columns)
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MappingColumns {
    pub name: usize,
    pub kind: Option<usize>,
    pub url: Option<usize>,
    pub file_id: Option<usize>,
}

impl MappingColumns {
    pub(crate) fn row<'a>(&self, cell: impl Fn(usize) -> Option<&'a str>) -> MappingRow {
        MappingRow::new(
            cell(self.name).unwrap_or_default(),
            self.kind.and_then(&cell),
            self.url.and_then(&cell),
            self.file_id.and_then(&cell),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn source_names() {
        assert_eq!(
            SourceLocation::File(PathBuf::from("/data/mos/run_a.jsonl")).name(),
            "run_a.jsonl"
        );
        assert_eq!(
            SourceLocation::Url("https://host/x/run_b.jsonl?dl=1".into()).name(),
            "run_b.jsonl"
        );
        assert_eq!(
            SourceLocation::Blob {
                name: "upload.jsonl".into(),
                bytes: Vec::new()
            }
            .name(),
            "upload.jsonl"
        );
    }

    #[test]
    fn missing_file_is_a_source_load_error() {
        let dir = tempdir().expect("tmp");
        let err = RecordSource::file(dir.path().join("absent.jsonl"))
            .load()
            .expect_err("missing file");
        assert!(matches!(err, AnnotateError::SourceLoad { ref source_name, .. } if source_name == "absent.jsonl"));
    }

    #[test]
    fn discover_lists_sorted_jsonl_only() {
        let dir = tempdir().expect("tmp");
        for name in ["b.jsonl", "a.jsonl", "notes.txt", "c.JSONL"] {
            std::fs::write(dir.path().join(name), b"{}\n").expect("write");
        }
        let names: Vec<String> = discover_sources(dir.path())
            .expect("discover")
            .iter()
            .map(RecordSource::name)
            .collect();
        assert_eq!(names, ["a.jsonl", "b.jsonl", "c.JSONL"]);
    }

    #[test]
    fn mapping_headers_are_case_normalized() {
        let columns = mapping_columns([" Name ", "TYPE", "Url", "File_ID"]).expect("columns");
        assert_eq!(columns.name, 0);
        assert_eq!(columns.kind, Some(1));
        assert_eq!(columns.url, Some(2));
        assert_eq!(columns.file_id, Some(3));

        assert!(matches!(
            mapping_columns(["url", "file_id"]),
            Err(AnnotateError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn blob_mapping_uses_csv_reader() {
        let csv = b"name,type,url,file_id\nclip01__cv2.mp4,video,https://x/y.mp4,\nclip02.mp4,video,,abc123\n";
        let table = MappingSource::blob("map.csv", csv.to_vec()).load().expect("load");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].file_id.as_deref(), Some("abc123"));
    }
}
