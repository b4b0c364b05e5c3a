//! SGF syntax layer
//!
//! Source text is scanned into [`Token`]s by [`lexer::Lexer`] and assembled into a
//! [`Node`](crate::tree::Node) tree by [`parser`]. Nothing here interprets
//! property values; they are carried as raw text.

use serde::{Deserialize, Serialize};

pub mod lexer;
pub mod parser;

pub use parser::{parse, parse_collection, parse_collection_named, parse_named};

/// Byte order mark that editors on Windows prepend to UTF-8 files.
pub const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Represents a byte span in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::from(span.start..span.end)
    }
}

/// Structural token kinds. Keys and values borrow from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `(`
    OpenVariation,
    /// `)`
    CloseVariation,
    /// `;`
    NodeStart,
    /// Uppercase property identifier, e.g. `AB`.
    PropertyKey(&'a str),
    /// Raw text between `[` and `]`, escapes left in place.
    PropertyValue(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}
