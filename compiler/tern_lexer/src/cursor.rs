//! Zero-cost cursor over a sentinel-terminated buffer.
//!
//! The cursor advances through the buffer byte-by-byte. EOF is detected
//! when the current byte equals the sentinel (`0x00`) and the position
//! has reached or exceeded the source length. No explicit bounds checking
//! is performed in the common case -- the sentinel guarantees safe
//! termination.
//!
//! # Interior Null Bytes
//!
//! If the source contains interior null bytes (U+0000), the cursor
//! distinguishes them from EOF by comparing `pos` against `source_len`.
//! A null at `pos < source_len` is an interior null (scanned as an
//! unrecognized byte); a null at `pos >= source_len` is the sentinel
//! (EOF).

/// Returns the earliest (minimum) of two optional positions.
///
/// Used by the memchr-based scanning methods to combine results from
/// separate memchr calls when we need to search for more bytes than
/// `memchr3` supports (which handles at most 3 needles).
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Zero-cost cursor over a sentinel-terminated byte buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
/// The cursor is [`Copy`], enabling cheap state snapshots.
///
/// # Invariant
///
/// `buf` must be sentinel-terminated: `buf[source_len] == 0x00`, and all
/// bytes after `source_len` are `0x00` (cache-line padding). This is
/// guaranteed by [`SourceBuffer`](crate::SourceBuffer) construction.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Sentinel-terminated buffer (source + sentinel + padding).
    buf: &'a [u8],
    /// Current read position (byte index into `buf`).
    pos: u32,
    /// Length of actual source content (excludes sentinel and padding).
    source_len: u32,
}

/// Size assertion: Cursor should be <= 24 bytes on 64-bit platforms.
/// &[u8] = 16 (fat pointer), u32 = 4, u32 = 4 => 24 bytes.
const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a new cursor at position 0 over a sentinel-terminated buffer.
    ///
    /// # Contract
    ///
    /// `buf[source_len]` must be `0x00` (sentinel). All bytes after the
    /// sentinel must also be `0x00` (padding). This is guaranteed by
    /// `SourceBuffer::new()`.
    pub(crate) fn new(buf: &'a [u8], source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(buf[source_len as usize] == 0, "sentinel byte must be 0x00");
        Self {
            buf,
            pos: 0,
            source_len,
        }
    }

    /// Returns the byte at the current position.
    ///
    /// Returns `0x00` when at EOF (the sentinel byte). Interior null bytes
    /// also return `0x00`; use [`is_eof()`](Self::is_eof) to distinguish.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// Returns the byte immediately before the current position.
    ///
    /// # Contract
    ///
    /// The cursor must have advanced at least once (`pos > 0`). The
    /// scanner only calls this from inside an open mode, which implies
    /// at least one consumed byte.
    #[inline]
    pub fn prev(&self) -> u8 {
        debug_assert!(self.pos > 0, "prev() before any byte was consumed");
        self.buf[self.pos as usize - 1]
    }

    /// Advance the cursor by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Returns `true` if the cursor has reached EOF.
    ///
    /// EOF is when the current byte is the sentinel (`0x00`) and the
    /// position is at or past the source length. This distinguishes
    /// EOF from interior null bytes.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current() == 0 && self.pos >= self.source_len
    }

    /// Current byte offset in the source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the source content (excludes sentinel and padding).
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// The sentinel byte (`0x00`) naturally terminates the loop for all
    /// reasonable predicates, as `pred(0)` should return `false`.
    ///
    /// # Contract
    ///
    /// `pred(0)` must return `false`. This is true for all standard byte
    /// classification predicates (`is_ascii_alphanumeric`,
    /// `is_ascii_whitespace`, etc.). If `pred(0)` returns `true`, the
    /// cursor advances into the zero-filled padding region but will
    /// eventually stop (all padding is `0x00`, and Rust's bounds checking
    /// prevents out-of-bounds access).
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while pred(self.buf[self.pos as usize]) {
            self.pos += 1;
        }
    }

    /// Advance past horizontal whitespace (spaces and tabs).
    ///
    /// A simple byte loop is faster than wider reads for the common case
    /// of short whitespace runs (1-4 bytes typical in source code). The
    /// sentinel byte (`0x00`) naturally terminates scanning since it is
    /// neither space nor tab.
    #[inline]
    pub fn eat_whitespace(&mut self) {
        loop {
            let b = self.buf[self.pos as usize];
            if b == b' ' || b == b'\t' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Advance to the next line terminator (`\n` or `\r`) or EOF using
    /// SIMD-accelerated search.
    ///
    /// Used by the comment sub-scanner to skip comment bodies. Scans only
    /// within source content (not into sentinel/padding). If no
    /// terminator is found, positions the cursor at the EOF sentinel.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn eat_until_newline_or_eof(&mut self) {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        if let Some(offset) = memchr::memchr2(b'\n', b'\r', remaining) {
            self.pos += offset as u32;
        } else {
            self.pos = self.source_len;
        }
    }

    /// Advance past ordinary string content to the next interesting byte.
    /// Returns the byte found, or 0 for EOF.
    ///
    /// "Interesting" bytes for strings: `"`, `\`, `\n`, `\r`.
    /// Uses memchr3 for SIMD-accelerated search of the 3 most common
    /// delimiters (`"`, `\`, `\n`), with a secondary check for `\r`.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_string_delim(&mut self) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        // Find nearest of ", \, or \n (the 3 most common string terminators)
        let primary = memchr::memchr3(b'"', b'\\', b'\n', remaining);
        // Also check for \r (rare but a terminator all the same)
        let cr = memchr::memchr(b'\r', remaining);

        // Take the earliest match
        let offset = earliest_of(primary, cr);

        if let Some(off) = offset {
            self.pos += off as u32;
            self.buf[self.pos as usize]
        } else {
            self.pos = self.source_len;
            0 // EOF sentinel
        }
    }
}
