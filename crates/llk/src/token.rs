//! The token stream boundary.
//!
//! Lexing happens elsewhere; the runtime only needs a materialised,
//! rewindable sequence of [`Token`]s. [`TokenBuffer`] is the stock
//! implementation of [`TokenStream`].

use facet::Facet;
use std::fmt;

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct Token {
    /// Token kind, e.g. `T_NUMBER`. Terminals match on this.
    pub name: String,
    /// The matched source text.
    pub value: String,
    /// Byte offset of the token in the source.
    pub offset: usize,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            offset,
        }
    }

    /// Offset just past the token's value.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.value.len()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.value, self.name)
    }
}

/// A random-access token sequence with a movable cursor.
///
/// Backtracking steps the cursor back one token at a time, so implementations
/// must keep every token they have handed out.
pub trait TokenStream {
    /// The token under the cursor, `None` at end of input.
    fn current(&self) -> Option<&Token>;

    /// Advances the cursor and returns the new current token.
    fn next(&mut self) -> Option<&Token>;

    /// Moves the cursor back one token. Returns `false` at the start.
    fn previous(&mut self) -> bool;

    /// Whether every token has been consumed.
    fn is_at_end(&self) -> bool;

    /// Offset of the current token, or of the end of input.
    fn offset(&self) -> usize;
}

/// A [`TokenStream`] over an owned vector of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenBuffer {
    /// Wraps `tokens` with the cursor on the first one.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Every token in the buffer, consumed or not.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Index of the current token.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor back to the first token.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Offset just past the last token, or 0 for an empty buffer.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.tokens.last().map_or(0, Token::end)
    }
}

impl From<Vec<Token>> for TokenBuffer {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<Token> for TokenBuffer {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl TokenStream for TokenBuffer {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<&Token> {
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        self.current()
    }

    fn previous(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn offset(&self) -> usize {
        self.current().map_or_else(|| self.end_offset(), |token| token.offset)
    }
}
