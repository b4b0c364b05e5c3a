//! Handles all user-facing output for the CLI.
//!
//! Tree outlines, batch summaries and colouring live here so every command
//! prints the same way.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{batch::BatchReport, serialize::write_node, tree::Node};

/// Render a tree as one node per line. Nodes on the same line of play share
/// an indent; each branch point indents its variations one step further.
pub fn outline(root: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, indent)) = stack.pop() {
        let mut line = String::new();
        write_node(&mut line, node);
        out.push_str(&"  ".repeat(indent));
        out.push_str(&line);
        out.push('\n');

        let child_indent = if node.is_branch_point() { indent + 1 } else { indent };
        stack.extend(node.children.iter().rev().map(|c| (c, child_indent)));
    }
    out
}

/// Prints the per-file failures and a coloured one-line summary.
pub fn print_batch_summary(report: &BatchReport, output_file: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    for (path, error) in report.failed() {
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(stderr, "failed");
        let _ = stderr.reset();
        let _ = writeln!(stderr, " {}: {error}", path.display());
    }

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let ok = report.files.len() - report.failure_count();
    let colour = if report.is_clean() { Color::Green } else { Color::Yellow };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(colour)).set_bold(true));
    let _ = write!(stdout, "Successfully created '{output_file}'");
    let _ = stdout.reset();
    let _ = writeln!(
        stdout,
        " with {ok} SGF file(s), {} failed.",
        report.failure_count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn test_outline_indents_variations() {
        let root = parse("(;GM[1](;B[aa];W[ab])(;B[ac]))").unwrap();
        assert_eq!(
            outline(&root),
            ";GM[1]\n  ;B[aa]\n  ;W[ab]\n  ;B[ac]\n"
        );
    }
}
