//! SGF tree builder.
//!
//! Consumes the scanner's tokens and assembles game trees on an explicit
//! variation stack. Each open `(` owns a [`Frame`] holding the linear sequence
//! of nodes read so far and the finished sub-variations hanging off the last
//! node of that sequence. Closing `)` folds the frame into a single chain and
//! hands it to the enclosing frame, so nesting depth costs heap, not call stack.

use crate::errors::{SgfError, SourceContext};
use crate::syntax::{lexer::Lexer, Span, Token, TokenKind};
use crate::tree::{Node, Property};

/// Property identifiers defined by FF[4] plus common extensions.
/// Anything else is passed through untouched.
const STANDARD_KEYS: &[&str] = &[
    "AB", "AE", "AN", "AP", "AR", "AS", "AW", "B", "BL", "BM", "BR", "BT", "C", "CA", "CP", "CR",
    "DD", "DM", "DO", "DT", "EV", "FF", "FG", "GB", "GC", "GM", "GN", "GW", "HA", "HO", "IP",
    "IT", "IY", "KM", "KO", "LB", "LN", "MA", "MN", "N", "OB", "OH", "ON", "OT", "OW", "PB",
    "PC", "PL", "PM", "PW", "RE", "RO", "RU", "SE", "SL", "SO", "SQ", "ST", "SU", "SZ", "TB",
    "TE", "TM", "TR", "TW", "UC", "US", "V", "VW", "W", "WL", "WR", "WT",
];

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse a document holding exactly one game tree and return its root.
pub fn parse(text: &str) -> Result<Node, SgfError> {
    parse_named("input", text)
}

/// Like [`parse`], with a source name used in diagnostics.
pub fn parse_named(name: &str, text: &str) -> Result<Node, SgfError> {
    let source = SourceContext::from_file(name, text);
    let mut games = build(&source)?;
    if games.len() > 1 {
        let second = second_tree_span(&source);
        return Err(SgfError::malformed_with_help(
            &source,
            format!("expected a single game tree, found {}", games.len()),
            second,
            "use parse_collection to read SGF collections",
        ));
    }
    games.pop().ok_or_else(|| no_game_tree(&source))
}

/// Parse an SGF collection: one or more consecutive game trees.
pub fn parse_collection(text: &str) -> Result<Vec<Node>, SgfError> {
    parse_collection_named("input", text)
}

pub fn parse_collection_named(name: &str, text: &str) -> Result<Vec<Node>, SgfError> {
    let source = SourceContext::from_file(name, text);
    build(&source)
}

// ============================================================================
// TREE BUILDER
// ============================================================================

/// One open variation.
#[derive(Debug)]
struct Frame {
    /// Span of the `(` that opened this variation.
    open: Span,
    sequence: Vec<Node>,
    variations: Vec<Node>,
}

impl Frame {
    fn new(open: Span) -> Self {
        Self {
            open,
            sequence: Vec::new(),
            variations: Vec::new(),
        }
    }

    /// Chain the sequence into one subtree; the variations hang off its last node.
    fn fold(self) -> Option<Node> {
        let mut nodes = self.sequence.into_iter().rev();
        let mut tail = nodes.next()?;
        tail.children = self.variations;
        for mut node in nodes {
            node.children = vec![tail];
            tail = node;
        }
        Some(tail)
    }
}

struct TreeBuilder<'a> {
    source: &'a SourceContext,
    stack: Vec<Frame>,
    games: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a SourceContext) -> Self {
        Self {
            source,
            stack: Vec::new(),
            games: Vec::new(),
        }
    }

    fn accept(&mut self, token: Token<'_>) -> Result<(), SgfError> {
        match token.kind {
            TokenKind::OpenVariation => self.open_variation(token.span),
            TokenKind::CloseVariation => self.close_variation(token.span),
            TokenKind::NodeStart => self.start_node(token.span),
            TokenKind::PropertyKey(key) => self.start_property(key, token.span),
            TokenKind::PropertyValue(value) => self.push_value(value, token.span),
        }
    }

    fn open_variation(&mut self, span: Span) -> Result<(), SgfError> {
        if let Some(parent) = self.stack.last() {
            if parent.sequence.is_empty() {
                return Err(SgfError::malformed(
                    self.source,
                    "variation opened before any node",
                    span,
                ));
            }
        }
        self.stack.push(Frame::new(span));
        Ok(())
    }

    fn close_variation(&mut self, span: Span) -> Result<(), SgfError> {
        let Some(frame) = self.stack.pop() else {
            return Err(SgfError::malformed(
                self.source,
                "unbalanced ')' without a matching '('",
                span,
            ));
        };
        let open = frame.open;
        let Some(subtree) = frame.fold() else {
            return Err(SgfError::malformed(
                self.source,
                "empty variation",
                Span::new(open.start, span.end),
            ));
        };
        match self.stack.last_mut() {
            Some(parent) => parent.variations.push(subtree),
            None => self.games.push(subtree),
        }
        Ok(())
    }

    fn start_node(&mut self, span: Span) -> Result<(), SgfError> {
        let source = self.source;
        let frame = self.current_frame(span, "node")?;
        if !frame.variations.is_empty() {
            return Err(SgfError::malformed_with_help(
                source,
                "node after a variation in the same sequence",
                span,
                "a sequence must end before its variations begin",
            ));
        }
        frame.sequence.push(Node::new());
        Ok(())
    }

    fn start_property(&mut self, key: &str, span: Span) -> Result<(), SgfError> {
        let source = self.source;
        let frame = self.current_frame(span, "property")?;
        if !frame.variations.is_empty() {
            return Err(SgfError::malformed(
                source,
                format!("property '{key}' after a variation"),
                span,
            ));
        }
        let Some(node) = frame.sequence.last_mut() else {
            return Err(SgfError::malformed_with_help(
                source,
                format!("property '{key}' before any node"),
                span,
                "properties belong to a node; start one with ';'",
            ));
        };
        if !STANDARD_KEYS.contains(&key) {
            log::trace!("passing through unrecognized property '{key}'");
        }
        node.properties.push(Property::new(key, Vec::new()));
        Ok(())
    }

    fn push_value(&mut self, value: &str, span: Span) -> Result<(), SgfError> {
        let source = self.source;
        let property = self
            .stack
            .last_mut()
            .and_then(|frame| frame.sequence.last_mut())
            .and_then(|node| node.properties.last_mut());
        match property {
            Some(property) => {
                property.values.push(value.to_string());
                Ok(())
            }
            None => Err(SgfError::malformed(
                source,
                "property value without a key",
                span,
            )),
        }
    }

    fn current_frame(&mut self, span: Span, what: &str) -> Result<&mut Frame, SgfError> {
        let source = self.source;
        self.stack.last_mut().ok_or_else(|| {
            SgfError::malformed_with_help(
                source,
                format!("{what} outside of any game tree"),
                span,
                "an SGF game tree starts with '(;'",
            )
        })
    }

    fn finish(self) -> Result<Vec<Node>, SgfError> {
        if let Some(frame) = self.stack.first() {
            return Err(SgfError::malformed_with_help(
                self.source,
                format!("{} unclosed variation(s) at end of input", self.stack.len()),
                frame.open,
                "every '(' needs a matching ')'",
            ));
        }
        if self.games.is_empty() {
            return Err(no_game_tree(self.source));
        }
        Ok(self.games)
    }
}

fn build(source: &SourceContext) -> Result<Vec<Node>, SgfError> {
    let mut builder = TreeBuilder::new(source);
    for token in Lexer::new(source) {
        builder.accept(token?)?;
    }
    let games = builder.finish()?;
    log::debug!(
        "parsed {} game tree(s) from '{}' ({} bytes)",
        games.len(),
        source.name,
        source.content.len()
    );
    Ok(games)
}

fn no_game_tree(source: &SourceContext) -> SgfError {
    SgfError::malformed_with_help(
        source,
        "no game tree found",
        Span::new(0, source.content.len()),
        "an SGF document looks like (;GM[1]...)",
    )
}

/// Span of the second top-level `(`, for the single-tree error.
fn second_tree_span(source: &SourceContext) -> Span {
    let mut depth = 0usize;
    let mut seen_first = false;
    for token in Lexer::new(source).flatten() {
        match token.kind {
            TokenKind::OpenVariation => {
                if depth == 0 {
                    if seen_first {
                        return token.span;
                    }
                    seen_first = true;
                }
                depth += 1;
            }
            TokenKind::CloseVariation => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Span::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(node: &Node) -> Vec<String> {
        node.walk()
            .flat_map(|n| n.properties.iter())
            .filter(|p| p.key == "B" || p.key == "W")
            .map(|p| format!("{}{}", p.key, p.values[0]))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap_err().is_malformed());
        assert!(parse("   \n").unwrap_err().is_malformed());
    }

    #[test]
    fn test_linear_sequence_chains() {
        let root = parse("(;GM[1];B[aa];W[ab])").unwrap();
        assert_eq!(root.get("GM").unwrap().values, vec!["1"]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].children.len(), 1);
        assert!(root.children[0].children[0].is_leaf());
        assert_eq!(moves(&root), vec!["Baa", "Wab"]);
    }

    #[test]
    fn test_variations_attach_to_branch_point() {
        let root = parse("(;GM[1](;B[aa];W[ab](;B[ac])(;B[ad]))(;B[ae]))").unwrap();
        assert_eq!(root.children.len(), 2);
        let first = &root.children[0];
        assert_eq!(first.get("B").unwrap().values, vec!["aa"]);
        let white = &first.children[0];
        assert_eq!(white.children.len(), 2);
        assert_eq!(moves(&root), vec!["Baa", "Wab", "Bac", "Bad", "Bae"]);
    }

    #[test]
    fn test_unclosed_variation() {
        let err = parse("(;B[aa]").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_stray_close() {
        assert!(parse("(;B[aa]))").unwrap_err().is_malformed());
    }

    #[test]
    fn test_empty_variation() {
        assert!(parse("(;GM[1]())").unwrap_err().is_malformed());
        assert!(parse("()").unwrap_err().is_malformed());
    }

    #[test]
    fn test_variation_before_node() {
        assert!(parse("((;B[aa]))").unwrap_err().is_malformed());
    }

    #[test]
    fn test_node_after_variation() {
        assert!(parse("(;GM[1](;B[aa]);W[bb])").unwrap_err().is_malformed());
    }

    #[test]
    fn test_property_before_node() {
        assert!(parse("(GM[1])").unwrap_err().is_malformed());
    }

    #[test]
    fn test_collection() {
        let games = parse_collection("(;GM[1];B[aa])\n(;GM[1];W[bb])").unwrap();
        assert_eq!(games.len(), 2);
        let err = parse("(;GM[1])(;GM[1])").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_unknown_properties_pass_through() {
        let root = parse("(;GM[1]XYZ[hello][world])").unwrap();
        assert_eq!(root.get("XYZ").unwrap().values, vec!["hello", "world"]);
    }

    #[test]
    fn test_byte_order_mark_before_game_tree() {
        let root = parse("\u{FEFF}(;GM[1];B[aa])").unwrap();
        assert_eq!(root.node_count(), 2);
    }

    #[test]
    fn test_deep_nesting_uses_heap() {
        let depth = 50_000;
        let mut text = String::from("(;GM[1]");
        for _ in 0..depth {
            text.push_str("(;B[aa]");
        }
        for _ in 0..depth {
            text.push(')');
        }
        text.push(')');
        let root = parse(&text).unwrap();
        assert_eq!(root.depth(), depth + 1);
    }
}
