//! Shared constants for record parsing, scoring, and resolution.

/// Lowest accepted score.
pub const MIN_SCORE: u8 = 1;
/// Highest accepted score.
pub const MAX_SCORE: u8 = 5;
/// Score shown for an item that has not been rated yet.
pub const DEFAULT_SCORE: u8 = 3;

/// Rater recorded when no name was supplied.
pub const ANONYMOUS_RATER: &str = "anonymous";

/// Suffix inserted before the extension to name a reprocessed video variant.
pub const DEFAULT_DERIVED_SUFFIX: &str = "__cv2";

/// Mapping `type` value that marks a row as a video.
pub const VIDEO_KIND: &str = "video";

/// Extension of record source files.
pub const RECORD_SOURCE_EXTENSION: &str = "jsonl";
/// Extension of per-rater score files.
pub const SCORE_FILE_EXTENSION: &str = "csv";
/// Suffix appended to a store path to name its lock file.
pub const LOCK_FILE_SUFFIX: &str = ".lock";

/// Accepted JSON keys per record attribute, in priority order.
pub const ID_FIELDS: &[&str] = &["id", "idx"];
pub const VIDEO_FIELDS: &[&str] = &["video", "video_path", "path"];
pub const PROMPT_FIELDS: &[&str] = &["prompt", "instruction", "question"];
// "anwser" is a misspelling some upstream producers still emit.
pub const ANSWER_FIELDS: &[&str] = &["answer", "anwser", "caption", "response", "text"];

/// Column headers of persisted score tables.
pub const COLUMN_ID: &str = "id";
pub const COLUMN_VIDEO: &str = "video";
pub const COLUMN_SCORE: &str = "score";
pub const COLUMN_RATER: &str = "rater";

/// Column headers of mapping tables (after case normalization).
pub const MAPPING_NAME: &str = "name";
pub const MAPPING_TYPE: &str = "type";
pub const MAPPING_URL: &str = "url";
pub const MAPPING_FILE_ID: &str = "file_id";

/// Template for cloud preview embeds; `{id}` is replaced by the file id.
pub const CLOUD_PREVIEW_TEMPLATE: &str = "https://drive.google.com/file/d/{id}/preview";

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOCK_POLL_MS: u64 = 25;
