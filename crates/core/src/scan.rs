//! Lexical comment scanner for JavaScript source.
//!
//! The scanner walks raw source text and yields every `//` and `/* */` comment together with its
//! exact byte range. It does not build a syntax tree; it only tracks enough lexical state to skip
//! string literals, template literals (including nested `${ ... }` substitutions) and regular
//! expression literals, so that comment-like text inside them is never reported.
//!
//! Regex-versus-division is decided from the previous significant token, the same heuristic
//! most JavaScript tokenizers use without a full parser:
//!
//! - after an identifier, a number, a string, a template, `)` or `]`, a `/` divides;
//! - after a punctuator, at the start of input, or after a keyword that expects an expression
//!   (`return`, `typeof`, ...), a `/` starts a regex.
//!
//! All offsets are byte offsets. Every delimiter the scanner looks for is ASCII, so reported
//! ranges always fall on UTF-8 boundaries.

use crate::range::Range;

/// Keywords after which a `/` begins a regular expression rather than a division.
const KEYWORDS_BEFORE_EXPRESSION: &[&str] = &[
    "await",
    "case",
    "delete",
    "do",
    "else",
    "in",
    "instanceof",
    "new",
    "of",
    "return",
    "throw",
    "typeof",
    "void",
    "yield",
];

/// Whether a comment is a line (`//`) or block (`/* */`) comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment token found in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment<'a> {
    /// Byte range of the comment, delimiters included.
    pub range: Range,
    pub kind: CommentKind,
    /// Raw comment text, delimiters included.
    pub text: &'a str,
    /// `false` for a block comment that runs to end of input without `*/`.
    pub terminated: bool,
}

impl Comment<'_> {
    /// Returns true if the comment text spans more than one line.
    pub fn is_multiline(&self) -> bool {
        self.text.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
    }
}

/// Scan `source` for comments.
///
/// The returned iterator is lazy. Calling this again restarts the scan from the beginning.
pub fn scan_comments(source: &str) -> CommentScanner<'_> {
    CommentScanner::new(source)
}

/// Iterator over the comments of a source text, in ascending position order.
#[derive(Debug, Clone)]
pub struct CommentScanner<'a> {
    src: &'a str,
    pos: usize,
    regex_allowed: bool,
    /// The previous punctuator was `.` (or `?.`), so the next word is a property name.
    after_dot: bool,
    brace_depth: usize,
    /// Brace depth recorded when each open `${` substitution started.
    templates: Vec<usize>,
}

impl<'a> CommentScanner<'a> {
    fn new(src: &'a str) -> Self {
        // A hashbang is only valid at offset 0 and is not a comment.
        let pos = if src.starts_with("#!") {
            line_end(src.as_bytes(), 0)
        } else {
            0
        };

        Self {
            src,
            pos,
            regex_allowed: true,
            after_dot: false,
            brace_depth: 0,
            templates: Vec::new(),
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn line_comment(&mut self) -> Comment<'a> {
        let start = self.pos;
        let end = line_end(self.bytes(), start);
        self.pos = end;
        Comment {
            range: Range { start, end },
            kind: CommentKind::Line,
            text: &self.src[start..end],
            terminated: true,
        }
    }

    fn block_comment(&mut self) -> Comment<'a> {
        let start = self.pos;
        let (end, terminated) = match self.src[start + 2..].find("*/") {
            Some(rel) => (start + 2 + rel + 2, true),
            None => (self.src.len(), false),
        };
        self.pos = end;
        Comment {
            range: Range { start, end },
            kind: CommentKind::Block,
            text: &self.src[start..end],
            terminated,
        }
    }

    /// Skip a `'` or `"` string. Stops before an unescaped line break (unterminated string).
    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => {
                    self.pos += 1;
                    // Line continuation: `\` followed by CRLF.
                    if self.peek(0) == Some(b'\r') && self.peek(1) == Some(b'\n') {
                        self.pos += 2;
                    } else if self.peek(0).is_some() {
                        self.pos += 1;
                    }
                }
                b'\n' | b'\r' => return,
                _ if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skip template text up to the closing backtick or the next `${`.
    ///
    /// `self.pos` must be inside the template text (after the opening backtick or after the `}`
    /// closing a substitution).
    fn skip_template_text(&mut self) {
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.src.len()),
                b'`' => {
                    self.pos += 1;
                    return;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.templates.push(self.brace_depth);
                    self.regex_allowed = true;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skip a regular expression literal, including its flags.
    fn skip_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.src.len()),
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    while self.peek(0).is_some_and(is_ident_byte) {
                        self.pos += 1;
                    }
                    return;
                }
                // Not a regex after all; resume at the line break.
                b'\n' | b'\r' => return,
                _ => self.pos += 1,
            }
        }
    }

    fn skip_word(&mut self) {
        let start = self.pos;
        while self.peek(0).is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        let word = &self.bytes()[start..self.pos];
        self.regex_allowed = !self.after_dot
            && KEYWORDS_BEFORE_EXPRESSION
                .iter()
                .any(|kw| kw.as_bytes() == word);
        self.after_dot = false;
    }
}

impl<'a> Iterator for CommentScanner<'a> {
    type Item = Comment<'a>;

    fn next(&mut self) -> Option<Comment<'a>> {
        while let Some(b) = self.peek(0) {
            match b {
                b'/' => match self.peek(1) {
                    Some(b'/') => return Some(self.line_comment()),
                    Some(b'*') => return Some(self.block_comment()),
                    _ if self.regex_allowed => {
                        self.skip_regex();
                        self.regex_allowed = false;
                        self.after_dot = false;
                    }
                    _ => {
                        self.pos += 1;
                        if self.peek(0) == Some(b'=') {
                            self.pos += 1;
                        }
                        self.regex_allowed = true;
                        self.after_dot = false;
                    }
                },
                b'\'' | b'"' => {
                    self.skip_string(b);
                    self.regex_allowed = false;
                    self.after_dot = false;
                }
                b'`' => {
                    self.pos += 1;
                    self.regex_allowed = false;
                    self.after_dot = false;
                    self.skip_template_text();
                }
                b'{' => {
                    self.brace_depth += 1;
                    self.pos += 1;
                    self.regex_allowed = true;
                    self.after_dot = false;
                }
                b'}' => {
                    self.pos += 1;
                    self.after_dot = false;
                    if self.templates.last() == Some(&self.brace_depth) {
                        self.templates.pop();
                        self.regex_allowed = false;
                        self.skip_template_text();
                    } else {
                        self.brace_depth = self.brace_depth.saturating_sub(1);
                        self.regex_allowed = true;
                    }
                }
                b')' | b']' => {
                    self.pos += 1;
                    self.regex_allowed = false;
                    self.after_dot = false;
                }
                b'.' if self.peek(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.pos += 1;
                    self.after_dot = false;
                    self.skip_word();
                    self.regex_allowed = false;
                }
                b'.' => {
                    self.pos += 1;
                    self.after_dot = true;
                    self.regex_allowed = true;
                }
                b'+' | b'-' if self.peek(1) == Some(b) => {
                    // `++`/`--` keep the operand state of whatever they follow.
                    self.pos += 2;
                }
                b'0'..=b'9' => {
                    self.skip_word();
                    self.regex_allowed = false;
                }
                _ if is_ident_byte(b) => self.skip_word(),
                _ if b.is_ascii_whitespace() => self.pos += 1,
                _ => {
                    if b == b'?' && self.peek(1) == Some(b'.') {
                        self.pos += 2;
                        self.after_dot = true;
                    } else {
                        self.pos += 1;
                        self.after_dot = false;
                    }
                    self.regex_allowed = true;
                }
            }
        }
        None
    }
}

/// Identifier bytes. Non-ASCII bytes are treated as identifier parts.
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'\\' | b'#') || b >= 0x80
}

/// Byte offset of the line terminator at or after `from` (or end of input).
///
/// Recognizes `\n`, `\r`, U+2028 and U+2029.
pub(crate) fn line_end(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' | b'\r' => return i,
            0xE2 if bytes.get(i + 1) == Some(&0x80)
                && matches!(bytes.get(i + 2), Some(0xA8 | 0xA9)) =>
            {
                return i;
            }
            _ => i += 1,
        }
    }
    bytes.len()
}
