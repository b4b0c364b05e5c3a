//! In-memory game tree.
//!
//! A [`Node`] owns its properties and its child variations outright. There are
//! no parent links; every traversal in this crate runs on an explicit stack so
//! long main lines and deep variation nesting never exhaust the call stack.

use serde::Serialize;

/// The comment property, the only key the pipeline interprets.
pub const COMMENT: &str = "C";

/// One `KEY[value]...` entry. Values are raw SGF text with escapes intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub key: String,
    pub values: Vec<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }

    /// First raw value, if any.
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A move or position record.
///
/// Properties keep their source order, duplicates included, so an untouched
/// node serializes back to exactly the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Node {
    pub properties: Vec<Property>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests and programmatic construction.
    pub fn with_property(mut self, key: &str, values: &[&str]) -> Self {
        self.push_property(key, values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_property(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.properties.push(Property::new(key, values));
    }

    /// First property with the given key.
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.key == key)
    }

    /// Raw first value of the `C` property.
    pub fn comment(&self) -> Option<&str> {
        self.get(COMMENT).and_then(Property::first)
    }

    /// Replace the comment with plain `text`, escaping it for SGF.
    ///
    /// An existing `C` keeps its position and loses any extra values; otherwise
    /// a new `C` is appended after the existing properties.
    pub fn set_comment(&mut self, text: &str) {
        let raw = escape_value(text);
        match self.get_mut(COMMENT) {
            Some(prop) => prop.values = vec![raw],
            None => self.push_property(COMMENT, vec![raw]),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_branch_point(&self) -> bool {
        self.children.len() > 1
    }

    /// Pre-order traversal in document order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    pub fn leaf_count(&self) -> usize {
        self.walk().filter(|n| n.is_leaf()).count()
    }

    /// Number of nodes on the longest root-to-leaf line, this node included.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }
}

impl Drop for Node {
    // The derived drop would recurse once per generation.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Escape plain text for use inside `[...]`.
pub fn escape_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == ']' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Resolve SGF escapes in a raw value.
///
/// `\x` becomes `x`; a backslash before a line break is a soft break and is
/// dropped together with the break.
pub fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('\n') => {
                if chars.peek() == Some(&'\r') {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        // root -> a -> (b1 | b2 -> c)
        Node::new().with_property("GM", &["1"]).with_child(
            Node::new()
                .with_property("B", &["aa"])
                .with_child(Node::new().with_property("W", &["ab"]))
                .with_child(
                    Node::new()
                        .with_property("W", &["ac"])
                        .with_child(Node::new().with_property("B", &["ad"])),
                ),
        )
    }

    #[test]
    fn test_counts_and_depth() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 4);
        assert!(tree.children[0].is_branch_point());
    }

    #[test]
    fn test_walk_is_document_order() {
        let tree = sample();
        let moves: Vec<_> = tree
            .walk()
            .filter_map(|n| n.properties.first())
            .map(|p| p.first().unwrap_or_default().to_string())
            .collect();
        assert_eq!(moves, vec!["1", "aa", "ab", "ac", "ad"]);
    }

    #[test]
    fn test_set_comment_replaces_in_place() {
        let mut node = Node::new()
            .with_property("B", &["aa"])
            .with_property("C", &["first", "second"])
            .with_property("TR", &["bb"]);
        node.set_comment("WRONG");
        assert_eq!(node.properties[1], Property::new("C", vec!["WRONG".into()]));
        assert_eq!(node.properties.len(), 3);
    }

    #[test]
    fn test_set_comment_appends_when_missing() {
        let mut node = Node::new().with_property("W", &["ba"]);
        node.set_comment("a]b");
        assert_eq!(node.properties.last().unwrap().key, "C");
        assert_eq!(node.comment(), Some(r"a\]b"));
    }

    #[test]
    fn test_escape_round_trip() {
        let plain = r"x] \ y";
        assert_eq!(escape_value(plain), r"x\] \\ y");
        assert_eq!(unescape_value(&escape_value(plain)), plain);
        assert_eq!(unescape_value("soft\\\nbreak"), "softbreak");
        assert_eq!(unescape_value(r"\:"), ":");
    }

    #[test]
    fn test_deep_chain_drops_without_overflow() {
        let mut root = Node::new();
        for _ in 0..200_000 {
            let mut parent = Node::new().with_property("B", &["aa"]);
            parent.children.push(root);
            root = parent;
        }
        assert_eq!(root.depth(), 200_001);
        drop(root);
    }
}
