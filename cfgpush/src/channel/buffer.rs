//! Output accumulation with tail-only prompt search.
//!
//! Prompts always sit at the end of the output, so only the last
//! `search_depth` bytes are scanned. Long `show` output or a large config
//! echo does not make prompt detection slower.

use bytes::BytesMut;
use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Default number of trailing bytes searched for a prompt.
pub const DEFAULT_SEARCH_DEPTH: usize = 1000;

/// Accumulates device output with terminal escape sequences removed.
pub struct PatternBuffer {
    buffer: BytesMut,
    search_depth: usize,
    // Escape sequences may be split across reads, so parser state persists.
    parser: Parser,
}

impl PatternBuffer {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Append raw device output, dropping ANSI/VT100 control sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = PlainText {
            out: &mut self.buffer,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Search the last `search_depth` bytes for `pattern`.
    ///
    /// Returns the end offset of the match within the whole buffer.
    pub fn search_tail(&self, pattern: &Regex) -> Option<usize> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.find(&self.buffer[start..]).map(|m| start + m.end())
    }

    /// Remove and return everything up to `end`.
    pub fn take_until(&mut self, end: usize) -> Vec<u8> {
        self.buffer.split_to(end.min(self.buffer.len())).to_vec()
    }

    /// Remove and return the whole buffer.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.split().to_vec()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

/// `vte` performer keeping printable text plus line control characters.
struct PlainText<'a> {
    out: &'a mut BytesMut,
}

impl Perform for PlainText<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\r' | b'\t' => self.out.extend_from_slice(&[byte]),
            // IOS pads long lines with backspaces when the terminal is narrow
            0x08 => {
                self.out.truncate(self.out.len().saturating_sub(1));
            }
            _ => {}
        }
    }
}
