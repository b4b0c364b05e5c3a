//! Comment cleanup for flashcard export.
//!
//! Puzzle sites embed HTML in comments and often repeat the verdict
//! (`CORRECT\n<b>CORRECT!</b>`). These helpers reduce a comment to one line of
//! plain text. They work on text only and never affect tree structure.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    syntax::BYTE_ORDER_MARK,
    tree::{escape_value, unescape_value, Node, COMMENT},
};

static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern"));

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern"));

const VERDICT_WORDS: [&str; 2] = ["CORRECT", "WRONG"];

/// Reduce a comment to a single line.
///
/// `<br>` tags become line breaks, other tags are dropped, blank lines are
/// removed and the rest is joined with `". "`. When the first line is a bare
/// verdict and the second repeats it, the repetition is removed.
pub fn clean_comment(text: &str) -> String {
    let text = LINE_BREAK_TAG.replace_all(text, "\n");
    let text = HTML_TAG.replace_all(&text, "");

    let mut parts: Vec<Cow<'_, str>> = text
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(Cow::Borrowed)
        .collect();

    if parts.len() > 1 {
        if let Some(word) = VERDICT_WORDS
            .iter()
            .find(|w| parts[0].eq_ignore_ascii_case(w))
        {
            if let Some(rest) = strip_keyword(&parts[1], word) {
                let rest = rest.to_string();
                if rest.is_empty() {
                    parts.remove(1);
                } else {
                    parts[1] = Cow::Owned(rest);
                }
            }
        }
    }

    parts.join(". ")
}

/// `Some(remainder)` if `line` starts with `word` (ASCII case-insensitive),
/// with trailing `.`, `!` and whitespace after the word removed.
fn strip_keyword<'t>(line: &'t str, word: &str) -> Option<&'t str> {
    let head = line.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    let rest = &line[word.len()..];
    Some(
        rest.trim_start_matches(|c: char| c == '.' || c == '!' || c.is_whitespace())
            .trim(),
    )
}

/// Clean every comment value in a parsed tree. Returns the number of values changed.
pub fn clean_comments(root: &mut Node) -> usize {
    let mut changed = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for property in node.properties.iter_mut().filter(|p| p.key == COMMENT) {
            for value in property.values.iter_mut() {
                let cleaned = escape_value(&clean_comment(&unescape_value(value)));
                if cleaned != *value {
                    *value = cleaned;
                    changed += 1;
                }
            }
        }
        stack.extend(node.children.iter_mut());
    }
    changed
}

/// Remove line breaks (`\n`, `\r`) from a raw value. A backslash in front of
/// a break is an SGF soft line break and is removed with it; every other
/// escape is kept as written, so the value still ends where it did.
pub fn remove_line_breaks(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' | '\n' => {}
            '\\' => match chars.peek() {
                Some('\r' | '\n') => {}
                Some(_) => {
                    out.push('\\');
                    out.extend(chars.next());
                }
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

/// Remove line breaks from every value in a parsed tree. Returns the number
/// of values changed.
pub fn join_lines(root: &mut Node) -> usize {
    let mut changed = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for value in node.properties.iter_mut().flat_map(|p| p.values.iter_mut()) {
            if value.contains(|c: char| c == '\r' || c == '\n') {
                *value = remove_line_breaks(value);
                changed += 1;
            }
        }
        stack.extend(node.children.iter_mut());
    }
    changed
}

/// Flat-text cleanup of a whole SGF document without building a tree: every
/// `C[...]` value is cleaned and all line breaks are removed.
///
/// Values are delimited escape-aware, so a `C[` inside another value is left
/// alone and adjacent comment properties are each cleaned.
pub fn flatten(sgf: &str) -> String {
    let sgf = sgf.strip_prefix(BYTE_ORDER_MARK).unwrap_or(sgf);
    let mut out = String::with_capacity(sgf.len());
    let mut key = String::new();
    let mut in_key = false;
    let mut rest = sgf;

    while let Some(ch) = rest.chars().next() {
        rest = &rest[ch.len_utf8()..];
        match ch {
            '[' => {
                let (raw, after, closed) = split_value(rest);
                let value = if key == COMMENT {
                    escape_value(&clean_comment(&unescape_value(raw)))
                } else {
                    remove_line_breaks(raw)
                };
                out.push('[');
                out.push_str(&value);
                if closed {
                    out.push(']');
                }
                rest = after;
                in_key = false;
            }
            'A'..='Z' => {
                if !in_key {
                    key.clear();
                    in_key = true;
                }
                key.push(ch);
                out.push(ch);
            }
            '\r' | '\n' => in_key = false,
            other if other.is_whitespace() => {
                in_key = false;
                out.push(other);
            }
            other => {
                in_key = false;
                key.clear();
                out.push(other);
            }
        }
    }
    out
}

/// Split text that follows a `[` at the value's closing `]`:
/// `(value, after, closed)`. An unterminated value runs to the end.
fn split_value(text: &str) -> (&str, &str, bool) {
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate() {
        if escaped {
            escaped = false;
        } else if b == b'\\' {
            escaped = true;
        } else if b == b']' {
            return (&text[..i], &text[i + 1..], true);
        }
    }
    (text, "", false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_comment_basic() {
        assert_eq!(clean_comment("Black to kill"), "Black to kill");
        assert_eq!(
            clean_comment("Black to kill\n\nWhite is dead."),
            "Black to kill. White is dead."
        );
    }

    #[test]
    fn test_clean_comment_html() {
        assert_eq!(
            clean_comment("CORRECT\n\n<b>CORRECT!</b>\n\nWhite is dead"),
            "CORRECT. White is dead"
        );
        assert_eq!(
            clean_comment(
                "WRONG\n\n<b>WRONG!</b>\n\nBlack is dead by <a href=\"https://senseis.xmp.net/?BentFourInTheCorner\">Bent four in the corner</a>"
            ),
            "WRONG. Black is dead by Bent four in the corner"
        );
        assert_eq!(
            clean_comment("This is a comment.<br><br>With line breaks."),
            "This is a comment.. With line breaks."
        );
        assert_eq!(clean_comment("<b></b>"), "");
        assert_eq!(clean_comment("A <b>bold</b> statement."), "A bold statement.");
        assert_eq!(clean_comment("one<BR/>two<br />three"), "one. two. three");
    }

    #[test]
    fn test_duplicate_verdict_removed() {
        assert_eq!(clean_comment("CORRECT\n\n<b>CORRECT!</b>\nTest."), "CORRECT. Test.");
        assert_eq!(clean_comment("WRONG\n\n<b>WRONG!</b>\nTest."), "WRONG. Test.");
        assert_eq!(clean_comment("CORRECT\nCORRECT. Test."), "CORRECT. Test.");
        assert_eq!(clean_comment("CORRECT\nThis is good."), "CORRECT. This is good.");
        assert_eq!(clean_comment("<b>WRONG!</b>. This is bad."), "WRONG!. This is bad.");
        assert_eq!(clean_comment("WRONG. This is bad."), "WRONG. This is bad.");
        assert_eq!(clean_comment("correct\nCorrect!"), "correct");
    }

    #[test]
    fn test_flatten_document() {
        let sgf = "(;FF[4]CA[UTF-8]AP[puzzle2sgf:0.1]GM[1]GN[1 / 900]SZ[19]AB[bc][be][cc][dc][eb][fb]AW[ab][bb][cb][da][db]PL[B]C[Black to kill](;B[ba]TR[aa]TR[ca]C[CORRECT\n\n<b>CORRECT!</b>\n\nWhite is dead\n\nWhite can not make two eyes.])(;B[ca]C[<b>WRONG!</b>];W[ba]TR[aa]TR[ca]C[WRONG\n\n<b>WRONG!</b>\n\nWhite is alive\n\nWhite has two real eyes.]))";
        let expected = "(;FF[4]CA[UTF-8]AP[puzzle2sgf:0.1]GM[1]GN[1 / 900]SZ[19]AB[bc][be][cc][dc][eb][fb]AW[ab][bb][cb][da][db]PL[B]C[Black to kill](;B[ba]TR[aa]TR[ca]C[CORRECT. White is dead. White can not make two eyes.])(;B[ca]C[WRONG!];W[ba]TR[aa]TR[ca]C[WRONG. White is alive. White has two real eyes.]))";
        assert_eq!(flatten(sgf), expected);
    }

    #[test]
    fn test_flatten_without_comments() {
        assert_eq!(flatten("(;FF[4]GM[1]GN[Test])"), "(;FF[4]GM[1]GN[Test])");
        assert_eq!(
            flatten("(;C[First comment.\nNew line.];AB[aa]C[Second comment.\nAnother line.])"),
            "(;C[First comment.. New line.];AB[aa]C[Second comment.. Another line.])"
        );
    }

    #[test]
    fn test_flatten_ignores_other_keys_ending_in_c() {
        assert_eq!(flatten("(;PC[a\nb]GC[x])"), "(;PC[ab]GC[x])");
    }

    #[test]
    fn test_flatten_drops_soft_line_break_with_its_backslash() {
        let flat = flatten("(;GM[1]C[Black to live\\\n];B[aa])");
        assert_eq!(flat, "(;GM[1]C[Black to live];B[aa])");
        assert_eq!(crate::syntax::parse(&flat).unwrap().node_count(), 2);

        let flat = flatten("(;GM[1]GN[Problem 1\\\r\n];B[aa])");
        assert_eq!(flat, "(;GM[1]GN[Problem 1];B[aa])");
        assert_eq!(crate::syntax::parse(&flat).unwrap().node_count(), 2);
    }

    #[test]
    fn test_flatten_strips_carriage_returns() {
        assert_eq!(
            flatten("\u{FEFF}(;GM[1]\r\nGN[Cho Chikun\r\nElementary 12]\r\nC[Black\r\nto live]\r\n;B[aa])"),
            "(;GM[1]GN[Cho ChikunElementary 12]C[Black. to live];B[aa])"
        );
    }

    #[test]
    fn test_flatten_cleans_adjacent_comments() {
        assert_eq!(flatten("(;C[<b>a</b>]C[<i>b</i>])"), "(;C[a]C[b])");
        assert_eq!(flatten("(;C[<b>a</b>] [<i>b</i>])"), "(;C[a] [b])");
    }

    #[test]
    fn test_flatten_keeps_escapes_and_ignores_comment_text_in_other_values() {
        assert_eq!(
            flatten(r"(;GN[x C[<b>y</b>\] z]C[a\]<b>b</b>])"),
            r"(;GN[x C[<b>y</b>\] z]C[a\]b])"
        );
    }

    #[test]
    fn test_remove_line_breaks() {
        assert_eq!(remove_line_breaks("a\nb\r\nc\rd"), "abcd");
        assert_eq!(remove_line_breaks("soft\\\nbreak"), "softbreak");
        assert_eq!(remove_line_breaks("soft\\\r\nbreak"), "softbreak");
        assert_eq!(remove_line_breaks(r"keep\]and\\"), r"keep\]and\\");
    }

    #[test]
    fn test_join_lines_in_tree() {
        let mut root = crate::syntax::parse("(;GN[a\\\nb];B[aa]C[x\r\ny])").unwrap();
        assert_eq!(join_lines(&mut root), 2);
        assert_eq!(root.get("GN").unwrap().values, vec!["ab"]);
        assert_eq!(root.children[0].comment(), Some("xy"));
        assert_eq!(join_lines(&mut root), 0);
    }

    #[test]
    fn test_clean_comments_in_tree() {
        let mut root = crate::syntax::parse("(;C[Black\nto kill](;B[aa]C[<i>+</i>]))").unwrap();
        assert_eq!(clean_comments(&mut root), 2);
        assert_eq!(root.comment(), Some("Black. to kill"));
        assert_eq!(root.children[0].comment(), Some("+"));
        assert_eq!(clean_comments(&mut root), 0);
    }
}
