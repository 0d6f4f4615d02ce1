//! Host-level tokenizer failures.
//!
//! Malformed language input is never an error: bad lexemes surface as
//! [`TokenKind::Invalid`](crate::TokenKind::Invalid) tokens in the
//! output stream and scanning continues. [`LexError`] covers only the
//! host side — a source too large for the `u32` position space, or the
//! host refusing to grow the output buffer. The two categories must
//! never be confused, so they live in different types entirely.

use std::collections::TryReserveError;

/// Resource-exhaustion or internal failure of a tokenization call.
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    /// Source length does not fit the tokenizer's `u32` position space.
    #[error("source is {len} bytes; the tokenizer addresses at most {max} bytes", max = u32::MAX - 1)]
    SourceTooLarge {
        /// Byte length of the rejected source.
        len: usize,
    },

    /// The host could not grow the output token buffer.
    #[error("failed to grow the token buffer")]
    OutOfMemory(#[from] TryReserveError),
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    reason = "test assertions use expect for clarity"
)]
