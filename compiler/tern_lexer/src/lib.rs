//! Hand-written tokenizer for the Tern language.
//!
//! Converts a source string into a complete, ordered [`Token`] list in
//! one forward pass with no backtracking. Classification is ASCII-only;
//! malformed input never aborts the scan — bad lexemes (broken numeric
//! separators, unterminated strings, empty builtins, unrecognized byte
//! runs) surface as [`TokenKind::Invalid`] tokens so a downstream parser
//! can keep going and report positions.
//!
//! # Design
//!
//! The scanner is a deterministic finite-state machine: a mode value
//! records the token class currently accumulating, and each byte
//! either continues the mode, finalizes it and is consumed, or
//! finalizes it and is re-dispatched once from the empty state. The
//! scan walks a sentinel-terminated [`SourceBuffer`] so the hot loop
//! needs no bounds checks, with memchr-accelerated skips through
//! comment and string bodies.
//!
//! # Example
//!
//! ```
//! use tern_lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("-- answer := 42")?;
//! let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::MinusMinus,
//!         TokenKind::Ident,
//!         TokenKind::ColonEq,
//!         TokenKind::Int,
//!     ]
//! );
//! # Ok::<(), tern_lexer::LexError>(())
//! ```

pub mod cursor;
mod lex_error;
pub mod scanner;
pub mod source_buffer;
pub mod token;

pub use cursor::Cursor;
pub use lex_error::LexError;
pub use scanner::Scanner;
pub use source_buffer::SourceBuffer;
pub use token::{Token, TokenKind};

/// Tokenize `source` into a complete, ordered token list.
///
/// Total and infallible with respect to malformed language input: every
/// byte of `source` is covered by exactly one token span or one skipped
/// blank/terminator byte, and bad lexemes come back as
/// [`TokenKind::Invalid`] tokens. The only failure paths are host-level:
/// a source too large for the `u32` position space, or the output
/// buffer failing to grow.
///
/// Token text borrows from `source`, so the returned list is valid for
/// as long as the source string.
#[tracing::instrument(level = "debug", skip_all, fields(source_len = source.len()))]
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    // One slot is reserved for the sentinel, so the largest addressable
    // source is u32::MAX - 1 bytes.
    let fits = u32::try_from(source.len()).is_ok_and(|len| len < u32::MAX);
    if !fits {
        return Err(LexError::SourceTooLarge { len: source.len() });
    }
    let buffer = SourceBuffer::new(source);
    let tokens = Scanner::new(source, buffer.cursor()).scan()?;
    tracing::debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}
