//! JavaScript code raking library.
//!
//! This crate removes development-only constructs from JavaScript source (`debugger`
//! statements, `console.*` calls and selected comment categories) by cutting byte ranges out of
//! the original text. Everything that is not removed is copied verbatim, so the output maps 1:1
//! onto the input and a precise sourcemap can be emitted for it.
//!
//! Entry points:
//!
//! - [`rake`] runs the tree-sitter driven passes (`transform`, `render_chunk`, `rake_all`).
//! - [`raker`] holds the [`Raker`] engine for callers that bring their own AST.
//! - [`options`] resolves user-facing options and presets into a [`Config`].
//!
//! Internals:
//!
//! - [`scan`] finds comments in raw source text.
//! - [`classify`] labels comments as license, documentation, annotation or meaningless.
//! - [`range`] pads removal requests and merges them into disjoint ranges.
//! - [`map`] builds sourcemaps from the retained segments.
//! - [`parse`] contains the tree-sitter parsing logic.
//! - [`utf16`] provides UTF-16 column conversion for sourcemaps.

pub mod classify;
pub mod map;
pub mod options;
pub mod parse;
pub mod rake;
pub mod range;
pub mod raker;
pub mod scan;
pub mod utf16;

pub use classify::{CommentCategory, classify};
pub use options::{Config, Options, Preset};
pub use range::{NodeKind, NodeSpan, ParentKind, Range};
pub use raker::{CommentReport, Raker};

/// Errors that can occur during raking.
#[derive(thiserror::Error, Debug)]
pub enum RakeError {
    #[error("tree-sitter failed to parse input")]
    ParseFailed,

    #[error("invalid range [{start},{end}) for source of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("raker is finalized; no further marks can be added")]
    InvalidState,

    #[error("unterminated block comment starting at byte {start}")]
    MalformedComment { start: usize },

    #[error("Invalid value for \"{name}\" option.")]
    InvalidOption { name: String },

    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid sourcemap: {0}")]
    SourceMap(#[from] sourcemap::Error),
}
