//! Public types exposed by the `mos-annotate` crate.

pub mod mapping;
pub mod options;
pub mod record;
pub mod score;

pub use mapping::{MappingRow, MappingTable};
pub use options::{AnnotatorConfig, AnnotatorConfigBuilder, LockSettings};
pub use record::{Record, RecordId, normalize_text};
pub use score::{InvalidScore, Rater, Score, ScoreEntry, ScoreSnapshot, UpsertEffect};
