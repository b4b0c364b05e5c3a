//! SGF serializer, the inverse of the tree builder.
//!
//! Emits `(` before the root and before every child of a branch point, `;`
//! per node, and properties in stored order with their raw values. A node
//! with a single child continues the current sequence, so linear lines come
//! out flat inside one pair of parentheses. No whitespace is written.

use std::fmt;

use crate::tree::Node;

enum Step<'a> {
    Variation(&'a Node),
    Node(&'a Node),
    Close,
}

/// Serialize one game tree.
pub fn to_sgf(root: &Node) -> String {
    let mut out = String::new();
    write_tree(&mut out, root);
    out
}

/// Serialize a collection of game trees back to back.
pub fn to_sgf_collection(games: &[Node]) -> String {
    let mut out = String::new();
    for game in games {
        write_tree(&mut out, game);
    }
    out
}

pub fn write_tree(out: &mut String, root: &Node) {
    let mut stack = vec![Step::Variation(root)];
    while let Some(step) = stack.pop() {
        match step {
            Step::Close => out.push(')'),
            Step::Variation(node) => {
                out.push('(');
                stack.push(Step::Close);
                stack.push(Step::Node(node));
            }
            Step::Node(node) => {
                write_node(out, node);
                match node.children.as_slice() {
                    [] => {}
                    [only] => stack.push(Step::Node(only)),
                    many => stack.extend(many.iter().rev().map(Step::Variation)),
                }
            }
        }
    }
}

/// Write a single `;KEY[v]...` node without its children.
pub fn write_node(out: &mut String, node: &Node) {
    out.push(';');
    for property in &node.properties {
        out.push_str(&property.key);
        for value in &property.values {
            out.push('[');
            out.push_str(value);
            out.push(']');
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_sgf(self))
    }
}
