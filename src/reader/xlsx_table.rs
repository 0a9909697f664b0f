use std::io::Cursor;

use calamine::{DataType, Reader as CalamineReader, Xlsx};

use super::{MappingReader, TableFormat, TableHint, mapping_columns};
use crate::error::{AnnotateError, Result};
use crate::types::MappingRow;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Reads mapping tables from the first worksheet of an XLSX workbook.
pub struct XlsxMappingReader;

impl XlsxMappingReader {
    /// Rows of the first non-empty sheet as trimmed strings.
    fn build_grid(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
        let cursor = Cursor::new(bytes);
        let mut workbook = Xlsx::new(cursor).map_err(|err| AnnotateError::InvalidMapping {
            reason: format!("failed to read xlsx workbook: {err}").into(),
        })?;

        for sheet_name in workbook.sheet_names().clone() {
            let Some(Ok(range)) = workbook.worksheet_range(&sheet_name) else {
                continue;
            };
            if range.is_empty() {
                continue;
            }
            let grid = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            return Ok(grid);
        }
        Err(AnnotateError::InvalidMapping {
            reason: "workbook has no readable sheet".into(),
        })
    }
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        // Whole numbers come back as floats; keep ids like `123` intact.
        DataType::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        DataType::Float(v) => format!("{v}"),
        DataType::Int(v) => format!("{v}"),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(v) | DataType::Duration(v) => format!("{v}"),
        DataType::DateTimeIso(s) | DataType::DurationIso(s) => s.clone(),
        DataType::Error(_) | DataType::Empty => String::new(),
    }
}

impl MappingReader for XlsxMappingReader {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn supports(&self, hint: &TableHint<'_>) -> bool {
        matches!(hint.format, Some(TableFormat::Xlsx))
            || (hint.format.is_none() && hint.magic_bytes.is_some_and(|m| m.starts_with(ZIP_MAGIC)))
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<MappingRow>> {
        let grid = Self::build_grid(bytes)?;
        let mut rows = grid.iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        let columns = mapping_columns(header.iter().map(String::as_str))?;
        Ok(rows
            .map(|row| columns.row(|index| row.get(index).map(String::as_str)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_by_format_or_zip_magic() {
        assert!(XlsxMappingReader.supports(&TableHint::new(Some(TableFormat::Xlsx))));
        assert!(XlsxMappingReader.supports(&TableHint::new(None).with_magic(Some(ZIP_MAGIC))));
        assert!(!XlsxMappingReader.supports(&TableHint::new(None).with_magic(Some(b"name"))));
        assert!(!XlsxMappingReader.supports(&TableHint::new(Some(TableFormat::Csv))));
    }

    #[test]
    fn garbage_is_an_invalid_mapping() {
        let err = XlsxMappingReader.read(b"not a workbook").expect_err("garbage");
        assert!(matches!(err, AnnotateError::InvalidMapping { .. }));
    }

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(cell_text(&DataType::Float(123.0)), "123");
        assert_eq!(cell_text(&DataType::Float(1.5)), "1.5");
        assert_eq!(cell_text(&DataType::Empty), "");
    }
}
