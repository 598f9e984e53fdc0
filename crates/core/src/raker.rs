//! The raking engine.
//!
//! A [`Raker`] owns one source text and accumulates removal marks against it: AST nodes handed
//! in by a walker ([`Raker::rake_ast_node`]) and comments picked by a caller-supplied decision
//! ([`Raker::rake_comments`]). Asking for the output ([`Raker::to_code`]) or the sourcemap
//! ([`Raker::generate_map`]) finalizes it: marks are merged once, the output is built once, and
//! every later mark is rejected with [`RakeError::InvalidState`].
//!
//! All offsets are UTF-8 byte offsets into the source.

use tracing::{debug, trace, warn};

use crate::{
    RakeError,
    map::{create_sourcemap, to_json},
    range::{NodeSpan, Padding, ParentKind, Range, RangeRegistry, RemovalMark, pad_comment, pad_node},
    scan::scan_comments,
};

/// Summary of one [`Raker::rake_comments`] call.
#[derive(Debug, Default)]
pub struct CommentReport {
    /// Comments found in the source.
    pub scanned: usize,
    /// Comments marked for removal.
    pub removed: usize,
    /// Comments selected for removal but kept because removing them would change how the
    /// surrounding code tokenizes.
    pub skipped: usize,
    /// One [`RakeError::MalformedComment`] per unterminated block comment.
    pub malformed: Vec<RakeError>,
}

/// Merged ranges and output text, computed once on finalization.
#[derive(Debug)]
struct Finalized {
    removed: Vec<Range>,
    code: String,
}

impl Finalized {
    fn new(source: &str, registry: &RangeRegistry) -> Self {
        let removed = registry.merge_all(source);
        let code = reconstruct(source, &removed);
        debug!(
            node_marks = registry.count(Padding::Node),
            comment_marks = registry.count(Padding::Comment),
            ranges = removed.len(),
            removed_bytes = source.len() - code.len(),
            "raker finalized"
        );
        Self { removed, code }
    }
}

/// Accumulates removal marks over a source text and produces the raked output and its map.
#[derive(Debug)]
pub struct Raker {
    source: String,
    source_name: String,
    registry: RangeRegistry,
    finalized: Option<Finalized>,
}

impl Raker {
    /// Create a raker over `source`. The source name recorded in maps defaults to the empty
    /// string.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_name: String::new(),
            registry: RangeRegistry::default(),
            finalized: None,
        }
    }

    /// Set the name listed as the single source of generated maps.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether [`to_code`](Self::to_code) or [`generate_map`](Self::generate_map) has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    /// Mark an AST node for removal, padded according to its parent.
    pub fn rake_ast_node(&mut self, node: NodeSpan, parent: ParentKind) -> Result<(), RakeError> {
        self.ensure_accumulating()?;
        let range = Range::checked(node.start, node.end, &self.source)?;
        let padded = pad_node(&self.source, range, node.kind, parent);
        trace!(
            start = range.start,
            end = range.end,
            padded_start = padded.start,
            padded_end = padded.end,
            ?parent,
            "marked node"
        );
        self.registry.push(RemovalMark {
            range: padded,
            padding: Padding::Node,
        });
        Ok(())
    }

    /// Scan the source for comments and mark those `decide` accepts.
    ///
    /// `decide` receives each comment's raw text, delimiters included, and returns `true` to
    /// remove it. Comments inside ranges already marked are still offered.
    pub fn rake_comments(
        &mut self,
        mut decide: impl FnMut(&str) -> bool,
    ) -> Result<CommentReport, RakeError> {
        self.ensure_accumulating()?;

        let mut report = CommentReport::default();
        for comment in scan_comments(&self.source) {
            report.scanned += 1;
            if !comment.terminated {
                warn!(start = comment.range.start, "unterminated block comment");
                report.malformed.push(RakeError::MalformedComment {
                    start: comment.range.start,
                });
            }
            if !decide(comment.text) {
                continue;
            }

            match pad_comment(&self.source, &comment) {
                Some(range) => {
                    trace!(start = range.start, end = range.end, "marked comment");
                    self.registry.push(RemovalMark {
                        range,
                        padding: Padding::Comment,
                    });
                    report.removed += 1;
                }
                None => {
                    debug!(
                        start = comment.range.start,
                        end = comment.range.end,
                        "kept comment whose removal would join tokens"
                    );
                    report.skipped += 1;
                }
            }
        }

        debug!(
            scanned = report.scanned,
            removed = report.removed,
            skipped = report.skipped,
            malformed = report.malformed.len(),
            "raked comments"
        );
        Ok(report)
    }

    /// Whether at least one mark was registered.
    pub fn has_changed(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Finalize and return the output text.
    pub fn to_code(&mut self) -> String {
        finalize(&self.source, &self.registry, &mut self.finalized)
            .code
            .clone()
    }

    /// Finalize and return the merged, sorted, disjoint removed ranges.
    pub fn removed_ranges(&mut self) -> &[Range] {
        &finalize(&self.source, &self.registry, &mut self.finalized).removed
    }

    /// Finalize and build the sourcemap from the output back to the source.
    pub fn generate_map(&mut self) -> sourcemap::SourceMap {
        let finalized = finalize(&self.source, &self.registry, &mut self.finalized);
        create_sourcemap(
            &self.source,
            &finalized.code,
            &self.source_name,
            &finalized.removed,
        )
    }

    /// [`generate_map`](Self::generate_map), serialized to JSON.
    pub fn generate_map_json(&mut self) -> Result<String, RakeError> {
        to_json(&self.generate_map())
    }

    fn ensure_accumulating(&self) -> Result<(), RakeError> {
        if self.finalized.is_some() {
            return Err(RakeError::InvalidState);
        }
        Ok(())
    }
}

fn finalize<'a>(
    source: &str,
    registry: &RangeRegistry,
    slot: &'a mut Option<Finalized>,
) -> &'a Finalized {
    slot.get_or_insert_with(|| Finalized::new(source, registry))
}

/// Copy every byte of `source` not covered by `removed` (sorted, disjoint).
fn reconstruct(source: &str, removed: &[Range]) -> String {
    let removed_len: usize = removed.iter().map(Range::len).sum();
    let mut out = String::with_capacity(source.len() - removed_len);
    let mut cursor = 0usize;
    for r in removed {
        out.push_str(&source[cursor..r.start]);
        cursor = r.end;
    }
    out.push_str(&source[cursor..]);
    out
}
