//! Hand-written SGF scanner.
//!
//! Produces [`Token`]s left to right. Whitespace outside brackets is skipped.
//! Inside a bracketed value a backslash escapes the following character, so
//! `\]` and `\\` never terminate the value. The scanner tracks whether it is
//! inside a property (after a key, before the next structural character) so a
//! key without a bracket is reported at the key itself.

use crate::errors::{SgfError, SourceContext};
use crate::syntax::{Span, Token, TokenKind, BYTE_ORDER_MARK};

/// Where the scanner is relative to property syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyState {
    /// Between nodes or properties; `[` is not allowed here.
    Outside,
    /// Just read a key; at least one `[` must follow.
    AwaitingValue { key: Span },
    /// Read one or more values; more `[` may follow.
    InValues,
}

pub struct Lexer<'a> {
    text: &'a str,
    source: &'a SourceContext,
    pos: usize,
    state: PropertyState,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// A leading byte order mark is skipped.
    pub fn new(source: &'a SourceContext) -> Self {
        let pos = if source.content.starts_with(BYTE_ORDER_MARK) {
            BYTE_ORDER_MARK.len_utf8()
        } else {
            0
        };
        Self {
            text: &source.content,
            source,
            pos,
            state: PropertyState::Outside,
            finished: false,
        }
    }

    /// Produce the next token, `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, SgfError> {
        self.skip_whitespace();
        let bytes = self.text.as_bytes();

        let Some(&byte) = bytes.get(self.pos) else {
            if let PropertyState::AwaitingValue { key } = self.state {
                return Err(self.dangling_key(key));
            }
            return Ok(None);
        };

        if let PropertyState::AwaitingValue { key } = self.state {
            if byte != b'[' {
                return Err(self.dangling_key(key));
            }
        }

        let start = self.pos;
        match byte {
            b'(' => Ok(Some(self.single(start, TokenKind::OpenVariation))),
            b')' => Ok(Some(self.single(start, TokenKind::CloseVariation))),
            b';' => Ok(Some(self.single(start, TokenKind::NodeStart))),
            b'[' if self.state == PropertyState::Outside => Err(SgfError::malformed_with_help(
                self.source,
                "property value without a key",
                Span::new(start, start + 1),
                "every bracketed value must follow a key such as C or AB",
            )),
            b'[' => self.value(start).map(Some),
            b'A'..=b'Z' => Ok(Some(self.key(start))),
            _ => {
                let ch = self.text[start..].chars().next().unwrap_or('\u{FFFD}');
                Err(SgfError::malformed(
                    self.source,
                    format!("unexpected character '{}'", ch.escape_debug()),
                    Span::new(start, start + ch.len_utf8()),
                ))
            }
        }
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.text.as_bytes();
        while let Some(b) = bytes.get(self.pos) {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    fn single(&mut self, start: usize, kind: TokenKind<'a>) -> Token<'a> {
        self.pos += 1;
        self.state = PropertyState::Outside;
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn key(&mut self, start: usize) -> Token<'a> {
        let bytes = self.text.as_bytes();
        while bytes.get(self.pos).is_some_and(|b| b.is_ascii_uppercase()) {
            self.pos += 1;
        }
        let span = Span::new(start, self.pos);
        self.state = PropertyState::AwaitingValue { key: span };
        Token {
            kind: TokenKind::PropertyKey(&self.text[start..self.pos]),
            span,
        }
    }

    fn value(&mut self, start: usize) -> Result<Token<'a>, SgfError> {
        let bytes = self.text.as_bytes();
        let content_start = start + 1;
        let mut i = content_start;
        let mut escaped = false;

        // Multi-byte UTF-8 sequences never contain `\` or `]`, so byte scanning is safe.
        while let Some(&b) = bytes.get(i) {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b']' {
                self.pos = i + 1;
                self.state = PropertyState::InValues;
                return Ok(Token {
                    kind: TokenKind::PropertyValue(&self.text[content_start..i]),
                    span: Span::new(start, self.pos),
                });
            }
            i += 1;
        }

        Err(SgfError::malformed_with_help(
            self.source,
            "unterminated property value",
            Span::new(start, self.text.len()),
            "a literal ']' inside a value must be written as '\\]'",
        ))
    }

    fn dangling_key(&self, key: Span) -> SgfError {
        SgfError::malformed(
            self.source,
            format!(
                "property '{}' has no bracketed value",
                &self.text[key.start..key.end]
            ),
            key,
        )
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, SgfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan the whole source into a token vector.
pub fn tokenize(source: &SourceContext) -> Result<Vec<Token<'_>>, SgfError> {
    Lexer::new(source).collect()
}
