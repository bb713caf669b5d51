//! Byte-level cleanup ahead of tokenization.
//!
//! Archives contain stray control characters and other code points the XML
//! grammar forbids, and they use HTML named entities such as `&nbsp;`.
//! [`SanitizingReader`] drops the former and prepends a document type
//! declaration that defines the latter.

use std::io::{self, Read};

/// Declares the HTML entities the tokenizer must resolve.
pub const ENTITY_HEADER: &[u8] = "<!DOCTYPE html [<!ENTITY nbsp '\u{a0}'>]>".as_bytes();

const CHUNK_SIZE: usize = 16 * 1024;

/// Returns `true` for code points that must not reach the tokenizer.
pub fn is_illegal(c: char) -> bool {
    let cp = u32::from(c);
    matches!(
        cp,
        0x00..=0x08 | 0x0B..=0x1F | 0x7F..=0x84 | 0x86..=0x9F | 0xFDD0..=0xFDDF
    ) || cp & 0xFFFE == 0xFFFE
}

/// Removes illegal characters from a string.
pub fn sanitize_str(s: &str) -> String {
    s.chars().filter(|c| !is_illegal(*c)).collect()
}

/// A [`Read`] adapter yielding the entity header followed by clean UTF-8.
///
/// Invalid UTF-8 sequences are replaced by U+FFFD. Multi-byte sequences split
/// across reads of the inner reader are reassembled before filtering.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use fbchat_history::markup::sanitize::{SanitizingReader, ENTITY_HEADER};
///
/// let mut reader = SanitizingReader::new(&b"<p>a\x07b</p>"[..]);
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out).unwrap();
///
/// assert!(out.starts_with(ENTITY_HEADER));
/// assert!(out.ends_with(b"<p>ab</p>"));
/// ```
#[derive(Debug)]
pub struct SanitizingReader<R> {
    inner: R,
    header_pos: usize,
    pending: Vec<u8>,
    out: Vec<u8>,
    out_pos: usize,
    eof: bool,
}

impl<R: Read> SanitizingReader<R> {
    /// Wraps `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            header_pos: 0,
            pending: Vec::new(),
            out: Vec::new(),
            out_pos: 0,
            eof: false,
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn push_clean(out: &mut Vec<u8>, valid: &str) {
        let mut utf8 = [0u8; 4];
        for c in valid.chars().filter(|c| !is_illegal(*c)) {
            out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let mut chunk = [0u8; CHUNK_SIZE];
        let n = loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        };

        self.out.clear();
        self.out_pos = 0;

        if n == 0 {
            self.eof = true;
            if !self.pending.is_empty() {
                Self::push_clean(&mut self.out, "\u{fffd}");
                self.pending.clear();
            }
            return Ok(());
        }

        self.pending.extend_from_slice(&chunk[..n]);
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    Self::push_clean(&mut self.out, valid);
                    start = self.pending.len();
                }
                Err(e) => {
                    let end = start + e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&self.pending[start..end]) {
                        Self::push_clean(&mut self.out, valid);
                    }
                    match e.error_len() {
                        Some(len) => {
                            Self::push_clean(&mut self.out, "\u{fffd}");
                            start = end + len;
                        }
                        // Incomplete sequence at the end; wait for more bytes.
                        None => {
                            start = end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
        Ok(())
    }
}

impl<R: Read> Read for SanitizingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.header_pos < ENTITY_HEADER.len() {
                let rest = &ENTITY_HEADER[self.header_pos..];
                let n = rest.len().min(buf.len());
                buf[..n].copy_from_slice(&rest[..n]);
                self.header_pos += n;
                return Ok(n);
            }
            if self.out_pos < self.out.len() {
                let rest = &self.out[self.out_pos..];
                let n = rest.len().min(buf.len());
                buf[..n].copy_from_slice(&rest[..n]);
                self.out_pos += n;
                return Ok(n);
            }
            if self.eof {
                return Ok(0);
            }
            self.fill()?;
        }
    }
}
