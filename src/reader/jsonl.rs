use serde_json::{Map, Value};

use crate::constants::{ANSWER_FIELDS, ID_FIELDS, PROMPT_FIELDS, VIDEO_FIELDS};
use crate::types::{Record, RecordId, normalize_text};

/// Records parsed from a JSONL payload plus the number of dropped lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub skipped_lines: usize,
}

/// Parse line-delimited JSON, dropping lines that are not JSON objects.
#[must_use]
pub fn parse_jsonl(bytes: &[u8]) -> Vec<Record> {
    parse_jsonl_report(bytes).records
}

#[must_use]
pub fn parse_jsonl_report(bytes: &[u8]) -> LoadReport {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut report = LoadReport::default();

    for (line_no, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let Ok(line) = std::str::from_utf8(raw) else {
            tracing::debug!(line = line_no + 1, "skipping non-utf8 line");
            report.skipped_lines += 1;
            continue;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(object)) => {
                let position = report.records.len();
                report.records.push(parse_record(&object, position));
            }
            Ok(_) => {
                tracing::debug!(line = line_no + 1, "skipping non-object line");
                report.skipped_lines += 1;
            }
            Err(err) => {
                tracing::debug!(line = line_no + 1, "skipping malformed line: {err}");
                report.skipped_lines += 1;
            }
        }
    }
    report
}

/// Build a record from one JSON object, resolving field aliases in priority
/// order. `position` is used as the id when the object carries none.
#[must_use]
pub fn parse_record(object: &Map<String, Value>, position: usize) -> Record {
    let id = first_present(object, ID_FIELDS)
        .and_then(RecordId::from_json)
        .unwrap_or_else(|| RecordId::positional(position));
    let text = |fields: &[&str]| first_present(object, fields).map(normalize_text).unwrap_or_default();

    Record {
        id,
        video_ref: text(VIDEO_FIELDS).trim().to_string(),
        prompt: text(PROMPT_FIELDS),
        answer: text(ANSWER_FIELDS),
    }
}

fn first_present<'a>(object: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| object.get(*field))
        .find(|value| !value.is_null())
}
