//! Removal ranges, padding policy and merging.
//!
//! A removal request arrives as a bare range (an AST node or a comment). Before it is recorded
//! it is *padded*: widened over the surrounding whitespace and punctuation that would otherwise
//! be left dangling (a statement terminator, the indentation and line break of a line that
//! becomes empty). Padding never reaches a non-whitespace byte that belongs to anything other
//! than the removed construct.
//!
//! Marks are kept in insertion order and reduced to a sorted, disjoint set by [`merge_ranges`]
//! before the text is rebuilt. Merging is idempotent and order-independent, so nested or
//! repeated removal requests over the same region are harmless. Marks padded one at a time can
//! still empty a line together (`debugger; // why`), so the merged set is padded once more by
//! [`absorb_stranded_whitespace`].
//!
//! Every byte padding may consume is ASCII, so padded ranges stay on UTF-8 boundaries when the
//! unpadded range does.

use crate::{RakeError, scan::Comment};

/// A half-open byte range `[start, end)` into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    /// Build a range over `source`, rejecting empty, reversed, out-of-bounds or
    /// non-char-boundary ranges.
    pub fn checked(start: usize, end: usize, source: &str) -> Result<Self, RakeError> {
        if start >= end
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            return Err(RakeError::InvalidRange {
                start,
                end,
                len: source.len(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// The syntactic kind of an excised AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A complete statement (e.g. `debugger;`).
    Statement,
    /// An expression (e.g. a call).
    Expression,
}

/// An AST node handed to the engine for excision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpan {
    pub start: usize,
    pub end: usize,
    pub kind: NodeKind,
}

/// The role of an excised node's immediate parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    /// A list of statements: program body, block, switch case.
    StatementList,
    /// An expression statement whose expression is the node.
    ExpressionStatement,
    /// Anything else; the node is removed verbatim.
    Other,
}

/// How a mark's range was padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Node,
    Comment,
}

/// A recorded removal request. `range` is already padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalMark {
    pub range: Range,
    pub padding: Padding,
}

/// The set of marks collected by one raker.
#[derive(Debug, Clone, Default)]
pub struct RangeRegistry {
    marks: Vec<RemovalMark>,
}

impl RangeRegistry {
    pub fn push(&mut self, mark: RemovalMark) {
        self.marks.push(mark);
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Number of marks padded as `padding`.
    pub fn count(&self, padding: Padding) -> usize {
        self.marks.iter().filter(|m| m.padding == padding).count()
    }

    /// Reduce all marks to sorted, disjoint ranges, none of which leaves a whitespace-only line
    /// behind in `source`.
    pub fn merge_all(&self, source: &str) -> Vec<Range> {
        let merged = merge_ranges(self.marks.iter().map(|m| m.range));
        merge_ranges(absorb_stranded_whitespace(source, merged))
    }
}

/// Sort `ranges` and coalesce any that overlap or touch.
pub fn merge_ranges(ranges: impl IntoIterator<Item = Range>) -> Vec<Range> {
    let mut ranges: Vec<Range> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
    ranges.sort_unstable();

    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

/// Widen merged ranges over the whitespace they strand. A range left alone on its line takes
/// the line's indentation and one line terminator; a range ending its line takes the whitespace
/// on both sides of it up to the terminator; a range starting its line takes the whitespace
/// after it and leaves the indentation. Ranges that already end
/// in a terminator are left alone, so blank lines next to them survive.
///
/// The result may overlap; pass it through [`merge_ranges`] again.
pub fn absorb_stranded_whitespace(source: &str, ranges: Vec<Range>) -> Vec<Range> {
    let bytes = source.as_bytes();
    ranges
        .into_iter()
        .map(|r| {
            if r.is_empty() || is_eol(bytes[r.end - 1]) {
                return r;
            }
            let before = skip_hspace_backward(bytes, r.start);
            let after = skip_hspace_forward(bytes, r.end);
            let at_line_start = before == 0 || is_eol(bytes[before - 1]);
            let at_line_end = after == bytes.len() || is_eol(bytes[after]);
            match (at_line_start, at_line_end) {
                (true, true) => Range {
                    start: before,
                    end: after + terminator_len(bytes, after),
                },
                (false, true) => Range {
                    start: before,
                    end: after,
                },
                (true, false) => Range {
                    start: r.start,
                    end: after,
                },
                (false, false) => r,
            }
        })
        .collect()
}

/// Pad an AST node range.
///
/// - A full statement (a `Statement` node, or any node whose parent is an expression statement)
///   takes its trailing `;` when the node does not already end with one and the `;` is on the
///   same line.
/// - If the statement is then alone on its line, the whole line goes, terminator included.
/// - Otherwise the horizontal whitespace separating it from the code sharing its line goes.
/// - Nodes under any other parent are removed verbatim.
pub fn pad_node(source: &str, node: Range, kind: NodeKind, parent: ParentKind) -> Range {
    let full_statement = match parent {
        ParentKind::Other => return node,
        ParentKind::ExpressionStatement => true,
        ParentKind::StatementList => kind == NodeKind::Statement,
    };
    if !full_statement {
        return node;
    }

    let bytes = source.as_bytes();
    let mut end = node.end;
    if bytes[end - 1] != b';' {
        let next = skip_hspace_forward(bytes, end);
        if bytes.get(next) == Some(&b';') {
            end = next + 1;
        }
    }

    pad_line(bytes, Range { start: node.start, end })
}

/// Pad a comment range. Returns `None` when removing the comment would change how the
/// surrounding code tokenizes.
///
/// - Alone on its line(s): the whole line goes, terminator included.
/// - Trailing code (`f();  // x`): the whitespace before it goes.
/// - Leading code (`/* x */ f();` at line start): the whitespace after it goes.
/// - Embedded between code on both sides: the comment goes, plus the whitespace after it when
///   there is whitespace on both sides. Nothing goes if that would glue two tokens together or
///   drop a line break between them.
pub fn pad_comment(source: &str, comment: &Comment<'_>) -> Option<Range> {
    let bytes = source.as_bytes();
    let range = comment.range;
    let before = skip_hspace_backward(bytes, range.start);
    let after = skip_hspace_forward(bytes, range.end);
    let at_line_start = before == 0 || is_eol(bytes[before - 1]);
    let at_line_end = after == bytes.len() || is_eol(bytes[after]);

    match (at_line_start, at_line_end) {
        (true, true) => Some(Range {
            start: before,
            end: after + terminator_len(bytes, after),
        }),
        (false, true) => Some(Range {
            start: before,
            end: range.end,
        }),
        (true, false) => Some(Range {
            start: range.start,
            end: after,
        }),
        (false, false) => {
            if comment.is_multiline() {
                return None;
            }
            let glued = before == range.start && after == range.end;
            if glued && can_merge(bytes[range.start - 1], bytes[range.end]) {
                return None;
            }
            if before < range.start && after > range.end {
                // Keep the whitespace on the left as the separator.
                return Some(Range {
                    start: range.start,
                    end: after,
                });
            }
            Some(range)
        }
    }
}

/// Widen a statement range over its line, or over the whitespace separating it from code
/// sharing that line.
fn pad_line(bytes: &[u8], range: Range) -> Range {
    let before = skip_hspace_backward(bytes, range.start);
    let after = skip_hspace_forward(bytes, range.end);
    let at_line_start = before == 0 || is_eol(bytes[before - 1]);
    let at_line_end = after == bytes.len() || is_eol(bytes[after]);

    if at_line_start && at_line_end {
        Range {
            start: before,
            end: after + terminator_len(bytes, after),
        }
    } else if at_line_end {
        Range {
            start: before,
            end: range.end,
        }
    } else {
        Range {
            start: range.start,
            end: after,
        }
    }
}

/// Two bytes that would lex as one token (or change an operator) if made adjacent.
fn can_merge(left: u8, right: u8) -> bool {
    const OPERATOR: &[u8] = b"+-*/%<>=&|!?.^~";
    let ident = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'\\' | b'#') || b >= 0x80;
    (ident(left) && ident(right)) || (OPERATOR.contains(&left) && OPERATOR.contains(&right))
}

fn is_hspace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0B | 0x0C)
}

fn is_eol(b: u8) -> bool {
    matches!(b, b'\n' | b'\r')
}

fn skip_hspace_backward(bytes: &[u8], mut pos: usize) -> usize {
    while pos > 0 && is_hspace(bytes[pos - 1]) {
        pos -= 1;
    }
    pos
}

fn skip_hspace_forward(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_hspace(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Length of the line terminator at `pos` (`\r\n` = 2, `\n` or `\r` = 1, none = 0).
fn terminator_len(bytes: &[u8], pos: usize) -> usize {
    match (bytes.get(pos), bytes.get(pos + 1)) {
        (Some(b'\r'), Some(b'\n')) => 2,
        (Some(b'\n' | b'\r'), _) => 1,
        _ => 0,
    }
}
