#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation,
        clippy::float_cmp
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal helpers are self-describing; public APIs carry docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Spreadsheet cells arrive as f64; scores and row counts are bounded well inside i64.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
//
// Pattern matching
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::items_after_statements)]
//
#![allow(clippy::needless_pass_by_value)] // builders take owned values
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::case_sensitive_file_extension_comparisons)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::should_implement_trait)] // `Navigator::next` is not an iterator
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::unnecessary_wraps)]

//! Score persistence and video source resolution for MOS annotation.
//!
//! A rater walks an ordered sequence of [`Record`]s, watches the video each one
//! references, and assigns a 1–5 score. This crate provides the parts with real
//! invariants:
//!
//! - [`store`]: insert-or-update score stores keyed by `(record_id, rater)`; the
//!   file-backed store serializes writers with a lock file and replaces its CSV
//!   atomically.
//! - [`locator`]: deterministic resolution of a raw video reference through a
//!   direct URL, a mapping table, a remote folder listing, or a local root.
//! - [`session`]: bounded navigation and an owned [`SessionState`] threaded
//!   through explicit event handlers.
//! - [`reader`]: JSONL record sources and CSV/XLSX mapping tables.

/// The mos-annotate crate version (matches `Cargo.toml`).
pub const MOS_ANNOTATE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod constants;
pub mod error;
pub mod locator;
mod lock;
pub mod reader;
pub mod session;
pub mod store;
pub mod types;

pub use constants::*;
pub use error::{AnnotateError, Result};
pub use lock::FileLock;
pub use locator::{
    FolderIndex, FolderLister, PlayableRef, RemoteFile, Resolution, StaticFolderLister,
    VideoLocator, derived_name, display_name, resolve,
};
pub use reader::{
    CsvMappingReader, LoadReport, MappingReader, MappingReaderRegistry, MappingSource,
    RecordSource, SourceLocation, TableFormat, TableHint, XlsxMappingReader, discover_sources,
    parse_jsonl,
};
pub use session::{AnnotationController, ItemView, Navigator, SessionState, SubmitOutcome};
pub use store::{
    FileScoreStore, MemoryScoreStore, RaterColumn, ScoreStore, StoreId, UpsertOutcome,
    export_snapshot, load_export,
};
pub use types::{
    AnnotatorConfig, AnnotatorConfigBuilder, InvalidScore, LockSettings, MappingRow, MappingTable,
    Rater, Record, RecordId, Score, ScoreEntry, ScoreSnapshot, UpsertEffect,
};
