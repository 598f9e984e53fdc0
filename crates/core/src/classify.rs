//! Comment classification.
//!
//! [`classify`] labels a comment by its raw text (delimiters included). It never decides whether
//! the comment is removed; that is the caller's policy (see [`crate::options::Config`]).

use once_cell::sync::Lazy;
use regex::Regex;

/// `/*!` followed by a space or a line terminator.
static LICENSE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\*![ \r\n\x{2028}\x{2029}]").expect("valid license regex"));

/// `/**` followed by a space or a line terminator.
static DOC_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\*\*[ \r\n\x{2028}\x{2029}]").expect("valid doc regex"));

/// An `@license` tag inside a doc comment.
static DOC_LICENSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s@license\b").expect("valid license tag regex"));

/// Pure-call and no-side-effects annotations understood by bundlers and minifiers.
static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[@#]__(?:PURE|NO_SIDE_EFFECTS)__").expect("valid annotation regex")
});

/// The category of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentCategory {
    /// `/*! ... */`, or a doc comment carrying an `@license` tag.
    License,
    /// `/** ... */` (JSDoc / TSDoc).
    Documentation,
    /// Contains `@__PURE__`, `#__PURE__`, `@__NO_SIDE_EFFECTS__` or `#__NO_SIDE_EFFECTS__`.
    Annotation,
    /// Everything else.
    Meaningless,
}

/// Classify a comment from its raw text. First match wins, in declaration order of
/// [`CommentCategory`].
pub fn classify(raw: &str) -> CommentCategory {
    if LICENSE_START.is_match(raw) {
        CommentCategory::License
    } else if DOC_START.is_match(raw) {
        if DOC_LICENSE_TAG.is_match(raw) {
            CommentCategory::License
        } else {
            CommentCategory::Documentation
        }
    } else if ANNOTATION.is_match(raw) {
        CommentCategory::Annotation
    } else {
        CommentCategory::Meaningless
    }
}
