use super::{MappingReader, TableFormat, TableHint, mapping_columns};
use crate::error::Result;
use crate::types::MappingRow;

/// Reads comma-separated mapping tables. Also the fallback for unknown formats.
pub struct CsvMappingReader;

impl MappingReader for CsvMappingReader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn supports(&self, hint: &TableHint<'_>) -> bool {
        !matches!(hint.format, Some(TableFormat::Xlsx))
    }

    fn read(&self, bytes: &[u8]) -> Result<Vec<MappingRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);
        let columns = mapping_columns(reader.headers()?.iter())?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(columns.row(|index| record.get(index)));
        }
        Ok(rows)
    }
}
