//! Source map generation for raked output.
//!
//! The output of a raker is the original text with some ranges cut out, so every output byte
//! maps 1:1 to an original byte inside a *retained segment*: a maximal run of original bytes not
//! covered by any removed range. The map gets
//!
//! - one mapping at the start of every retained segment, however short, and
//! - one mapping at the start of every further output line inside a segment, so that consumers
//!   which only look at the first mapping of a line still resolve it. Lines end at `\n`, `\r\n`
//!   or a lone `\r`.
//!
//! Both the generated and the original positions of these mappings are strictly increasing.
//! Columns are UTF-16 code units. The map names a single source and never inlines its content.

use crate::{RakeError, range::Range, utf16::Utf16Cursor};

/// A maximal run of retained bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte offset in the original text.
    pub original: usize,
    /// Byte offset in the output text.
    pub generated: usize,
    pub len: usize,
}

/// Compute the retained segments of a text of `len` bytes once `removed` is cut out.
///
/// `removed` must be sorted and disjoint (see [`crate::range::merge_ranges`]).
pub fn retained_segments(len: usize, removed: &[Range]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(removed.len() + 1);
    let mut cursor = 0usize;
    let mut generated = 0usize;
    for r in removed {
        if r.start > cursor {
            segments.push(Segment {
                original: cursor,
                generated,
                len: r.start - cursor,
            });
            generated += r.start - cursor;
        }
        cursor = cursor.max(r.end);
    }
    if cursor < len {
        segments.push(Segment {
            original: cursor,
            generated,
            len: len - cursor,
        });
    }
    segments
}

/// Byte offsets `(generated, original)` that receive a mapping, in output order.
pub fn anchor_points(output: &str, segments: &[Segment]) -> Vec<(usize, usize)> {
    let out = output.as_bytes();
    let mut anchors = Vec::with_capacity(segments.len());
    for seg in segments {
        anchors.push((seg.generated, seg.original));
        let end = (seg.generated + seg.len).min(out.len());
        for i in seg.generated..end {
            let line_break = match out[i] {
                // A segment starting at the `\n` of a `\r\n` split by a removal is already
                // anchored at that line's start.
                b'\n' => !(i == seg.generated && i > 0 && out[i - 1] == b'\r'),
                b'\r' => out.get(i + 1) != Some(&b'\n'),
                _ => false,
            };
            if line_break && i + 1 < end {
                let offset = i + 1 - seg.generated;
                anchors.push((seg.generated + offset, seg.original + offset));
            }
        }
    }
    anchors
}

/// Build the source map of `output`, which is `input` with `removed` cut out.
pub fn create_sourcemap(
    input: &str,
    output: &str,
    source_name: &str,
    removed: &[Range],
) -> sourcemap::SourceMap {
    let segments = retained_segments(input.len(), removed);

    let mut out_pos = Utf16Cursor::new(output);
    let mut in_pos = Utf16Cursor::new(input);

    let mut builder = sourcemap::SourceMapBuilder::new(None);
    builder.add_source(source_name);

    for (generated, original) in anchor_points(output, &segments) {
        let (dst_line, dst_col) = out_pos.position(generated);
        let (src_line, src_col) = in_pos.position(original);
        builder.add(
            dst_line,
            dst_col,
            src_line,
            src_col,
            Some(source_name),
            None,
            false,
        );
    }

    builder.into_sourcemap()
}

/// Serialize a source map to JSON.
pub fn to_json(map: &sourcemap::SourceMap) -> Result<String, RakeError> {
    let mut buf: Vec<u8> = Vec::new();
    map.to_writer(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
