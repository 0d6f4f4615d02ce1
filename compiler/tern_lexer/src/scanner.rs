//! Mode-driven scan loop producing position-carrying [`Token`]s.
//!
//! The scanner walks a sentinel-terminated [`Cursor`] one byte at a
//! time. A `Mode` records which token class is currently accumulating;
//! the scan loop dispatches each byte to the transition method of the
//! current mode, which either consumes the byte (continue, or finalize
//! including it) or finalizes the open token *without* consuming, in
//! which case the loop re-dispatches the same byte from the empty
//! state. Empty-state dispatch always consumes, so every byte is
//! examined at most twice.
//!
//! Error conditions in the language input are encoded as
//! [`TokenKind::Invalid`] tokens, never as `Result::Err` — the only
//! error path is host allocation failure while growing the output
//! buffer.

use crate::cursor::Cursor;
use crate::lex_error::LexError;
use crate::token::{Token, TokenKind};

/// In-progress token class, plus the empty `None` state.
///
/// Each variant has exactly one transition method in [`Scanner`]; the
/// scan loop matches exhaustively. Only the string mode carries state
/// beyond its start offset (whether the previous byte opened an
/// escape).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// No token accumulating; the next byte starts fresh.
    None,
    /// `&` seen; `{` completes the struct-literal opener.
    Amp,
    /// `|` seen; `{` completes the sum-type opener.
    Pipe,
    /// `;` seen; `{` completes the enum-type opener.
    Semi,
    /// `-` seen; `-` completes the declaration marker.
    Minus,
    /// `=` seen; `>` completes the arrow.
    Eq,
    /// `:` seen; `:` or `=` complete the long forms.
    Colon,
    /// `.` seen; `.` completes the range marker.
    Dot,
    /// `_` seen; an identifier byte absorbs it into an identifier.
    Underscore,
    /// Decimal digits; may still switch base after a leading `0`.
    Int,
    /// `0x` seen; hex digits and separators.
    HexInt,
    /// `0o` seen; octal digits and separators.
    OctInt,
    /// `0b` seen; binary digits and separators.
    BinInt,
    /// Inside a `"` string literal.
    Str {
        /// The previous byte was a bare `\`; the next byte is taken
        /// verbatim.
        escaped: bool,
    },
    /// Inside a `'` comment; reclassified as doc-comment at finalize.
    Comment,
    /// Identifier body.
    Ident,
    /// `@` seen; identifier bytes follow.
    Builtin,
    /// `#` seen; still deciding between `#?`, hash-identifier, and
    /// invalid.
    Hash,
    /// `#` plus identifier bytes.
    HashIdent,
    /// Run of unrecognized bytes, coalesced into one token.
    Invalid,
}

/// Single-pass scanner over one source string.
///
/// Created fresh per tokenization call; all line/column bookkeeping and
/// the output buffer live here, never in process-wide state. The
/// borrowed `source` provides token text slices, while the cursor walks
/// the sentinel-terminated copy owned by the caller's
/// [`SourceBuffer`](crate::SourceBuffer).
pub struct Scanner<'src, 'buf> {
    source: &'src str,
    cursor: Cursor<'buf>,
    /// Current mode; `Mode::None` when no token is accumulating.
    mode: Mode,
    /// Start offset of the open mode. Meaningless while `mode` is
    /// `Mode::None`.
    mode_start: u32,
    /// 1-based line of the current position.
    line: u32,
    /// Byte offset of the first byte of the current line.
    line_start: u32,
    tokens: Vec<Token<'src>>,
}

impl<'src, 'buf> Scanner<'src, 'buf> {
    /// Create a scanner over `source`.
    ///
    /// `cursor` must come from a [`SourceBuffer`](crate::SourceBuffer)
    /// built over the same `source`, so that byte offsets agree.
    pub fn new(source: &'src str, cursor: Cursor<'buf>) -> Self {
        debug_assert!(
            source.len() == cursor.source_len() as usize,
            "cursor and source must describe the same text"
        );
        Self {
            source,
            cursor,
            mode: Mode::None,
            mode_start: 0,
            line: 1,
            line_start: 0,
            tokens: Vec::new(),
        }
    }

    /// Run the scan to completion and return the token list.
    ///
    /// Total over language input: malformed lexemes become
    /// [`TokenKind::Invalid`] tokens and scanning continues. The only
    /// error is [`LexError::OutOfMemory`] from growing the output
    /// buffer.
    pub fn scan(mut self) -> Result<Vec<Token<'src>>, LexError> {
        loop {
            let b = self.cursor.current();
            if b == 0 && self.cursor.is_eof() {
                break;
            }
            match self.mode {
                Mode::None => self.begin(b)?,
                Mode::Amp => self.pair(b, b'{', TokenKind::AmpLBrace, TokenKind::Amp)?,
                Mode::Pipe => self.pair(b, b'{', TokenKind::PipeLBrace, TokenKind::Pipe)?,
                Mode::Semi => self.pair(b, b'{', TokenKind::SemiLBrace, TokenKind::Semi)?,
                Mode::Minus => self.pair(b, b'-', TokenKind::MinusMinus, TokenKind::Minus)?,
                Mode::Eq => self.pair(b, b'>', TokenKind::FatArrow, TokenKind::Eq)?,
                Mode::Dot => self.pair(b, b'.', TokenKind::DotDot, TokenKind::Dot)?,
                Mode::Colon => self.colon(b)?,
                Mode::Underscore => self.underscore(b)?,
                Mode::Int => self.dec_digits(b)?,
                Mode::HexInt => self.radix_digits(b, is_hex_digit, TokenKind::HexInt)?,
                Mode::OctInt => self.radix_digits(b, is_oct_digit, TokenKind::OctInt)?,
                Mode::BinInt => self.radix_digits(b, is_bin_digit, TokenKind::BinInt)?,
                Mode::Str { escaped } => self.string(b, escaped)?,
                Mode::Comment => self.comment(b)?,
                Mode::Ident => self.ident_body(b, TokenKind::Ident)?,
                Mode::Builtin => self.builtin(b)?,
                Mode::Hash => self.hash(b)?,
                Mode::HashIdent => self.ident_body(b, TokenKind::HashIdent)?,
                Mode::Invalid => self.invalid_run(b)?,
            }
        }
        self.flush()?;
        Ok(self.tokens)
    }

    // ─── Mode::None dispatch ─────────────────────────────────────────

    /// Dispatch one byte from the empty state. Always consumes at least
    /// one byte, which bounds the whole scan at one re-dispatch per
    /// byte.
    fn begin(&mut self, b: u8) -> Result<(), LexError> {
        match b {
            b' ' | b'\t' => self.cursor.eat_whitespace(),
            b'\n' => {
                self.cursor.advance();
                self.next_line();
            }
            b'\r' => {
                // CRLF counts as a single terminator; lone CR as one.
                self.cursor.advance();
                if self.cursor.current() == b'\n' {
                    self.cursor.advance();
                }
                self.next_line();
            }
            b'`' => self.single(TokenKind::Backtick)?,
            b'~' => self.single(TokenKind::Tilde)?,
            b'!' => self.single(TokenKind::Bang)?,
            b'$' => self.single(TokenKind::Dollar)?,
            b'%' => self.single(TokenKind::Percent)?,
            b'^' => self.single(TokenKind::Caret)?,
            b'*' => self.single(TokenKind::Star)?,
            b'(' => self.single(TokenKind::LParen)?,
            b')' => self.single(TokenKind::RParen)?,
            b'+' => self.single(TokenKind::Plus)?,
            b'[' => self.single(TokenKind::LBracket)?,
            b']' => self.single(TokenKind::RBracket)?,
            b'{' => self.single(TokenKind::LBrace)?,
            b'}' => self.single(TokenKind::RBrace)?,
            b'\\' => self.single(TokenKind::Backslash)?,
            b',' => self.single(TokenKind::Comma)?,
            b'<' => self.single(TokenKind::Lt)?,
            b'>' => self.single(TokenKind::Gt)?,
            b'/' => self.single(TokenKind::Slash)?,
            b'?' => self.single(TokenKind::Question)?,
            b'&' => self.open(Mode::Amp),
            b'|' => self.open(Mode::Pipe),
            b';' => self.open(Mode::Semi),
            b'-' => self.open(Mode::Minus),
            b'=' => self.open(Mode::Eq),
            b':' => self.open(Mode::Colon),
            b'.' => self.open(Mode::Dot),
            b'_' => self.open(Mode::Underscore),
            b'0'..=b'9' => self.open(Mode::Int),
            b'a'..=b'z' | b'A'..=b'Z' => self.open(Mode::Ident),
            b'@' => self.open(Mode::Builtin),
            b'#' => self.open(Mode::Hash),
            b'"' => self.open(Mode::Str { escaped: false }),
            b'\'' => self.open(Mode::Comment),
            // NUL, C0 controls (except \t \n \r), DEL, and all
            // non-ASCII bytes
            _ => self.open(Mode::Invalid),
        }
        Ok(())
    }

    /// Open `mode` at the current byte and consume it.
    fn open(&mut self, mode: Mode) {
        self.mode = mode;
        self.mode_start = self.cursor.pos();
        self.cursor.advance();
    }

    /// Emit a single-byte token at the current position.
    fn single(&mut self, kind: TokenKind) -> Result<(), LexError> {
        let start = self.cursor.pos();
        self.cursor.advance();
        self.emit(kind, start)
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.line_start = self.cursor.pos();
    }

    // ─── One-byte-lookahead operators ────────────────────────────────

    /// Two-byte operator disambiguation: `second` completes `long`;
    /// anything else finalizes `short` and leaves the byte for
    /// re-dispatch.
    fn pair(
        &mut self,
        b: u8,
        second: u8,
        long: TokenKind,
        short: TokenKind,
    ) -> Result<(), LexError> {
        if b == second {
            self.cursor.advance();
            self.finish(long)
        } else {
            self.finish(short)
        }
    }

    /// `:` has two long forms, `::` and `:=`.
    fn colon(&mut self, b: u8) -> Result<(), LexError> {
        match b {
            b':' => {
                self.cursor.advance();
                self.finish(TokenKind::ColonColon)
            }
            b'=' => {
                self.cursor.advance();
                self.finish(TokenKind::ColonEq)
            }
            _ => self.finish(TokenKind::Colon),
        }
    }

    /// `_` followed by an identifier byte is absorbed into an
    /// identifier; otherwise it is the plain underscore token.
    fn underscore(&mut self, b: u8) -> Result<(), LexError> {
        if is_ident_continue(b) {
            self.mode = Mode::Ident;
            self.cursor.advance();
            Ok(())
        } else {
            self.finish(TokenKind::Underscore)
        }
    }

    // ─── Identifier family ───────────────────────────────────────────

    /// Shared body for identifiers and hash-identifiers; both always
    /// finalize successfully once entered.
    fn ident_body(&mut self, b: u8, kind: TokenKind) -> Result<(), LexError> {
        if is_ident_continue(b) {
            self.cursor.advance();
            self.cursor.eat_while(is_ident_continue);
            Ok(())
        } else {
            self.finish(kind)
        }
    }

    /// `@` requires at least one identifier byte after it.
    fn builtin(&mut self, b: u8) -> Result<(), LexError> {
        if is_ident_continue(b) {
            self.cursor.advance();
            self.cursor.eat_while(is_ident_continue);
            Ok(())
        } else {
            self.finish_builtin()
        }
    }

    fn finish_builtin(&mut self) -> Result<(), LexError> {
        let kind = if self.cursor.pos() - self.mode_start >= 2 {
            TokenKind::Builtin
        } else {
            TokenKind::Invalid
        };
        self.finish(kind)
    }

    /// `#` is three-way: `#?` emits immediately, an identifier start
    /// byte continues as a hash-identifier, anything else (EOF
    /// included) makes the bare `#` invalid.
    fn hash(&mut self, b: u8) -> Result<(), LexError> {
        match b {
            b'?' => {
                self.cursor.advance();
                self.finish(TokenKind::HashQuestion)
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.mode = Mode::HashIdent;
                self.cursor.advance();
                Ok(())
            }
            _ => self.finish(TokenKind::Invalid),
        }
    }

    // ─── Numeric literals ────────────────────────────────────────────

    /// Decimal digits. A literal that is exactly `0` so far switches
    /// base when the second byte is `x`, `o`, or `b` — positional
    /// check, so `10x` stays decimal-then-identifier.
    fn dec_digits(&mut self, b: u8) -> Result<(), LexError> {
        match b {
            b'0'..=b'9' => {
                self.cursor.advance();
                self.cursor.eat_while(|b| b.is_ascii_digit());
                Ok(())
            }
            b'x' if self.at_base_switch() => {
                self.mode = Mode::HexInt;
                self.cursor.advance();
                Ok(())
            }
            b'o' if self.at_base_switch() => {
                self.mode = Mode::OctInt;
                self.cursor.advance();
                Ok(())
            }
            b'b' if self.at_base_switch() => {
                self.mode = Mode::BinInt;
                self.cursor.advance();
                Ok(())
            }
            b'_' => self.separator(),
            _ => self.finish_int(),
        }
    }

    /// Base switches only off a literal that is exactly `0` so far.
    fn at_base_switch(&self) -> bool {
        self.cursor.pos() - self.mode_start == 1 && self.cursor.prev() == b'0'
    }

    /// Hex/octal/binary digits after a base prefix.
    fn radix_digits(
        &mut self,
        b: u8,
        is_digit: fn(u8) -> bool,
        kind: TokenKind,
    ) -> Result<(), LexError> {
        if is_digit(b) {
            self.cursor.advance();
            self.cursor.eat_while(is_digit);
            Ok(())
        } else if b == b'_' {
            self.separator()
        } else {
            self.finish_radix(kind)
        }
    }

    /// `_` inside a numeric literal. Legal only between digits: after
    /// another `_`, or directly after the base-prefix letter, the whole
    /// literal is malformed and finalizes immediately with the
    /// offending `_` included in the span. Scanning restarts fresh at
    /// the next byte, so `0x_0` lexes as invalid `0x_` then decimal
    /// `0`.
    fn separator(&mut self) -> Result<(), LexError> {
        let after_prefix = !matches!(self.mode, Mode::Int)
            && self.cursor.pos() - self.mode_start == 2;
        let doubled = self.cursor.prev() == b'_';
        self.cursor.advance();
        if doubled || after_prefix {
            self.finish(TokenKind::Invalid)
        } else {
            Ok(())
        }
    }

    /// A decimal literal is valid unless it ends on a separator.
    fn finish_int(&mut self) -> Result<(), LexError> {
        let kind = if self.cursor.prev() == b'_' {
            TokenKind::Invalid
        } else {
            TokenKind::Int
        };
        self.finish(kind)
    }

    /// A prefixed literal needs at least one digit after the base
    /// letter (minimum span: `0`, base letter, digit) and must not end
    /// on a separator.
    fn finish_radix(&mut self, kind: TokenKind) -> Result<(), LexError> {
        let len = self.cursor.pos() - self.mode_start;
        let kind = if len >= 3 && self.cursor.prev() != b'_' {
            kind
        } else {
            TokenKind::Invalid
        };
        self.finish(kind)
    }

    // ─── String literals ─────────────────────────────────────────────

    /// String body. A line terminator always finalizes the open string
    /// as invalid without being consumed — strings cannot span lines,
    /// not even after a `\`. Ordinary content is skipped with the
    /// SIMD-accelerated delimiter search.
    fn string(&mut self, b: u8, escaped: bool) -> Result<(), LexError> {
        match b {
            b'\n' | b'\r' => self.finish(TokenKind::Invalid),
            _ if escaped => {
                self.mode = Mode::Str { escaped: false };
                self.cursor.advance();
                Ok(())
            }
            b'"' => {
                self.cursor.advance();
                self.finish(TokenKind::Str)
            }
            b'\\' => {
                self.mode = Mode::Str { escaped: true };
                self.cursor.advance();
                Ok(())
            }
            _ => {
                self.cursor.skip_to_string_delim();
                Ok(())
            }
        }
    }

    // ─── Comments ────────────────────────────────────────────────────

    /// Comment body: everything up to (not including) the line
    /// terminator.
    fn comment(&mut self, b: u8) -> Result<(), LexError> {
        match b {
            b'\n' | b'\r' => self.finish_comment(),
            _ => {
                self.cursor.eat_until_newline_or_eof();
                Ok(())
            }
        }
    }

    /// A doubled marker makes a doc-comment. Minimum spans: comment 2
    /// bytes, doc-comment 3 — a bare `'` or `''` is invalid rather
    /// than an empty comment.
    fn finish_comment(&mut self) -> Result<(), LexError> {
        let len = self.cursor.pos() - self.mode_start;
        let doc = len >= 2 && self.source.as_bytes()[self.mode_start as usize + 1] == b'\'';
        let kind = if doc {
            if len >= 3 {
                TokenKind::DocComment
            } else {
                TokenKind::Invalid
            }
        } else if len >= 2 {
            TokenKind::Comment
        } else {
            TokenKind::Invalid
        };
        self.finish(kind)
    }

    // ─── Invalid runs ────────────────────────────────────────────────

    /// Coalesce consecutive unrecognized bytes into one token. The run
    /// closes on the first recognized or ignorable byte, which is then
    /// processed normally.
    fn invalid_run(&mut self, b: u8) -> Result<(), LexError> {
        if is_unrecognized(b) {
            self.cursor.advance();
            Ok(())
        } else {
            self.finish(TokenKind::Invalid)
        }
    }

    // ─── End-of-input flush ──────────────────────────────────────────

    /// Finalize whatever mode is still open once input runs out.
    /// Ambiguous operator prefixes become their short form; literal
    /// modes apply the same validity predicates as mid-stream, with "no
    /// more input" acting as a non-continuing byte.
    fn flush(&mut self) -> Result<(), LexError> {
        match self.mode {
            Mode::None => Ok(()),
            Mode::Amp => self.finish(TokenKind::Amp),
            Mode::Pipe => self.finish(TokenKind::Pipe),
            Mode::Semi => self.finish(TokenKind::Semi),
            Mode::Minus => self.finish(TokenKind::Minus),
            Mode::Eq => self.finish(TokenKind::Eq),
            Mode::Colon => self.finish(TokenKind::Colon),
            Mode::Dot => self.finish(TokenKind::Dot),
            Mode::Underscore => self.finish(TokenKind::Underscore),
            Mode::Int => self.finish_int(),
            Mode::HexInt => self.finish_radix(TokenKind::HexInt),
            Mode::OctInt => self.finish_radix(TokenKind::OctInt),
            Mode::BinInt => self.finish_radix(TokenKind::BinInt),
            Mode::Str { .. } => self.finish(TokenKind::Invalid),
            Mode::Comment => self.finish_comment(),
            Mode::Ident => self.finish(TokenKind::Ident),
            Mode::Builtin => self.finish_builtin(),
            Mode::Hash => self.finish(TokenKind::Invalid),
            Mode::HashIdent => self.finish(TokenKind::HashIdent),
            Mode::Invalid => self.finish(TokenKind::Invalid),
        }
    }

    // ─── Token emission ──────────────────────────────────────────────

    /// Close the open mode and emit its token.
    fn finish(&mut self, kind: TokenKind) -> Result<(), LexError> {
        let start = self.mode_start;
        self.mode = Mode::None;
        self.emit(kind, start)
    }

    /// Materialize the span `start..pos` as a token.
    ///
    /// Token text is sliced from the original source string, so the
    /// returned tokens outlive the scan. No mode consumes a line
    /// terminator, so the line/column of the current position is also
    /// the line/column of the token start.
    fn emit(&mut self, kind: TokenKind, start: u32) -> Result<(), LexError> {
        let end = self.cursor.pos();
        debug_assert!(end > start, "tokens always cover at least one byte");
        let text = &self.source[start as usize..end as usize];
        self.tokens.try_reserve(1)?;
        self.tokens.push(Token {
            kind,
            start,
            len: end - start,
            text,
            line: self.line,
            column: start - self.line_start,
        });
        Ok(())
    }
}

// ─── Byte classification ─────────────────────────────────────────────

/// 256-byte lookup table for identifier continuation bytes.
/// `true` for a-z, A-Z, 0-9, and underscore.
/// Table lookup replaces the multi-range `matches!` with a single
/// indexed read. The sentinel byte (0x00) maps to `false`, naturally
/// terminating loops.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_IDENT_CONTINUE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0u16;
    while i < 256 {
        table[i as usize] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_'
        );
        i += 1;
    }
    table
};

/// Returns `true` if `b` is a valid identifier continuation byte.
#[inline]
fn is_ident_continue(b: u8) -> bool {
    IS_IDENT_CONTINUE_TABLE[b as usize]
}

/// Returns `true` if `b` is a hex digit (`0-9`, `A-F`, `a-f`).
#[inline]
fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// Returns `true` if `b` is an octal digit (`0-7`).
#[inline]
fn is_oct_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

/// Returns `true` if `b` is a binary digit.
#[inline]
fn is_bin_digit(b: u8) -> bool {
    b == b'0' || b == b'1'
}

/// Returns `true` if `b` matches no classification at all: NUL, C0
/// controls other than tab/LF/CR, DEL, and every non-ASCII byte. These
/// feed the invalid-run coalescing.
#[inline]
fn is_unrecognized(b: u8) -> bool {
    matches!(b, 0..=8 | 11..=12 | 14..=31 | 127..=255)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
