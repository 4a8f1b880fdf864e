//! A simple lexical scanner over an in-memory document.
//!
//! The scanner never backtracks: every successful operation advances the cursor,
//! and a failed `expect` produces a [`ParseError`] describing where the document went wrong.
use std::fmt::{self, Display, Formatter};

use failure_derive::Fail;

/// The number of bytes on either side of the cursor included in an error excerpt
const EXCERPT_RADIUS: usize = 3;

/// Check if the character is accepted by [`Scanner::consume_identifier`]
///
/// Besides letters and digits, this accepts the punctuation found in binary names,
/// generics-like decorations (`<init>`) and descriptors,
/// so a whole member name like `get(int,a.Foo)` is captured as one token.
#[inline]
pub fn is_identifier_char(c: char) -> bool {
    match c {
        'A'..='Z' | 'a'..='z' | '0'..='9' => true,
        '/' | '-' | '_' | '$' | ';' | '(' | ')' | '[' | ']' | '<' | '>' | '.' | ',' => true,
        _ => false
    }
}

#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    position: usize
}
impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(text: &'a str) -> Scanner<'a> {
        Scanner { text, position: 0 }
    }
    /// The byte offset of the cursor
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.text[self.position..]
    }
    #[inline]
    pub fn at_end(&self) -> bool {
        self.position >= self.text.len()
    }
    /// The character at the cursor, or `None` if we've reached the end
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }
    /// Consume a single character
    #[inline]
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }
    /// The text consumed since the specified position
    #[inline]
    pub fn consumed_since(&self, start: usize) -> &'a str {
        &self.text[start..self.position]
    }
    /// Peek at the next character, failing if the document ended before we found what we `expected`
    pub fn peek_required(&self, expected: &str) -> Result<char, ParseError> {
        self.peek().ok_or_else(|| self.error(ParseErrorKind::UnexpectedEof {
            expected: expected.into()
        }))
    }
    /// Advance past the next occurrence of the delimiter, returning everything consumed (including the delimiter).
    ///
    /// If the delimiter never occurs, this consumes the rest of the document.
    pub fn consume_until(&mut self, delimiter: &str) -> &'a str {
        let remaining = self.remaining();
        let end = match remaining.find(delimiter) {
            Some(index) => index + delimiter.len(),
            None => remaining.len()
        };
        self.position += end;
        &remaining[..end]
    }
    /// Advance past the literal if it's present at the cursor
    pub fn try_consume(&mut self, literal: &str) -> bool {
        if self.remaining().starts_with(literal) {
            self.position += literal.len();
            true
        } else {
            false
        }
    }
    /// Advance past the literal, failing if it isn't present at the cursor
    pub fn expect(&mut self, literal: &str) -> Result<(), ParseError> {
        if self.try_consume(literal) {
            return Ok(())
        }
        let remaining = self.remaining();
        let kind = if remaining.len() < literal.len() && literal.starts_with(remaining) {
            ParseErrorKind::UnexpectedEof { expected: literal.into() }
        } else {
            ParseErrorKind::Mismatch { expected: literal.into() }
        };
        Err(self.error(kind))
    }
    /// Greedily consume the characters accepted by the predicate.
    ///
    /// The result is empty if the first character doesn't match.
    pub fn consume_while<F: FnMut(char) -> bool>(&mut self, mut predicate: F) -> &'a str {
        let remaining = self.remaining();
        let end = remaining.char_indices()
            .find(|&(_, c)| !predicate(c))
            .map_or(remaining.len(), |(index, _)| index);
        self.position += end;
        &remaining[..end]
    }
    /// Consume an identifier, as determined by [`is_identifier_char`]
    #[inline]
    pub fn consume_identifier(&mut self) -> &'a str {
        self.consume_while(is_identifier_char)
    }
    /// Describe the current location of the cursor
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        let text = self.text;
        let position = self.position.min(text.len());
        let before = &text[..position];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        let line_end = text[position..].find('\n')
            .map_or(text.len(), |index| position + index);
        let column = before[line_start..].chars().count();
        let mut excerpt_start = position.saturating_sub(EXCERPT_RADIUS);
        while !text.is_char_boundary(excerpt_start) {
            excerpt_start -= 1;
        }
        let mut excerpt_end = (position + EXCERPT_RADIUS).min(text.len());
        while !text.is_char_boundary(excerpt_end) {
            excerpt_end += 1;
        }
        ParseError {
            kind, line, column,
            line_text: text[line_start..line_end].into(),
            excerpt: text[excerpt_start..excerpt_end].into()
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedEof {
        expected: String
    },
    Mismatch {
        expected: String
    },
    UnexpectedChar {
        found: char,
        expected: String
    }
}
impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            ParseErrorKind::UnexpectedEof { ref expected } => {
                write!(f, "Unexpected EOF, expected {:?}", expected)
            },
            ParseErrorKind::Mismatch { ref expected } => {
                write!(f, "Expected {:?}", expected)
            },
            ParseErrorKind::UnexpectedChar { found, ref expected } => {
                write!(f, "Unexpected {:?}, expected {}", found, expected)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Fail)]
#[fail(display = "{} on line {}: {:?} (around {:?})", kind, line, line_text, excerpt)]
pub struct ParseError {
    kind: ParseErrorKind,
    line: usize,
    column: usize,
    line_text: String,
    excerpt: String
}
impl ParseError {
    #[inline]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
    /// The zero-based line number where parsing failed
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }
    /// The zero-based column (in characters) where parsing failed
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }
    /// The full text of the line where parsing failed
    #[inline]
    pub fn line_text(&self) -> &str {
        &self.line_text
    }
    /// The text immediately surrounding the failure
    #[inline]
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }
}
