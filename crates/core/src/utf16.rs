//! Byte offset to `(line, UTF-16 column)` conversion.
//!
//! Source maps consumed by JavaScript tooling measure columns in UTF-16 code units, while the
//! raker works in UTF-8 byte offsets. Mappings are emitted in ascending order for both the
//! generated and the original text, so a forward-only cursor converts each offset by scanning
//! only the bytes since the previous query. The whole map is built in a single linear pass over
//! each text.
//!
//! Lines end at `\n`, `\r\n` or a lone `\r`, the same terminators the scanner and padding use.

/// A forward-only converter from byte offsets to `(line, utf16_col)` pairs.
#[derive(Debug, Clone)]
pub struct Utf16Cursor<'a> {
    s: &'a str,
    byte: usize,
    line: u32,
    col: u32,
    /// The last byte consumed was a `\r`, so a following `\n` does not start another line.
    after_cr: bool,
}

impl<'a> Utf16Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            s,
            byte: 0,
            line: 0,
            col: 0,
            after_cr: false,
        }
    }

    /// Position of `byte` as a 0-based `(line, utf16_col)` pair.
    ///
    /// Queries are expected in non-decreasing order; a smaller offset rewinds to the start of
    /// the text. Offsets past the end clamp to the end, and offsets inside a multi-byte character
    /// clamp to the start of that character.
    pub fn position(&mut self, byte: usize) -> (u32, u32) {
        let mut target = byte.min(self.s.len());
        while !self.s.is_char_boundary(target) {
            target -= 1;
        }
        if target < self.byte {
            *self = Self::new(self.s);
        }

        for ch in self.s[self.byte..target].chars() {
            match ch {
                '\n' if self.after_cr => {}
                '\n' | '\r' => {
                    self.line += 1;
                    self.col = 0;
                }
                _ => self.col += ch.len_utf16() as u32,
            }
            self.after_cr = ch == '\r';
        }
        self.byte = target;
        (self.line, self.col)
    }
}
