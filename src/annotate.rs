//! Leaf verdicts for puzzle lines.
//!
//! A leaf whose comment contains the marker is a correct solution; every
//! other leaf is a wrong one. Leaves already carrying exactly one of the two
//! labels are left alone, which makes annotation idempotent. Interior nodes
//! are never touched.

use serde::{Deserialize, Serialize};

use crate::tree::Node;

/// Marker and label texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub marker: String,
    pub correct: String,
    pub wrong: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            marker: "+".into(),
            correct: "CORRECT".into(),
            wrong: "WRONG".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

impl Labels {
    /// Decide the verdict for a leaf comment, `None` when it is already labeled.
    pub fn judge(&self, comment: Option<&str>) -> Option<Verdict> {
        let Some(text) = comment else {
            return Some(Verdict::Wrong);
        };
        if self.is_label(text) {
            return None;
        }
        if text.contains(self.marker.as_str()) {
            Some(Verdict::Correct)
        } else {
            Some(Verdict::Wrong)
        }
    }

    pub fn is_label(&self, text: &str) -> bool {
        let trimmed = text.trim();
        trimmed == self.correct || trimmed == self.wrong
    }

    pub fn text(&self, verdict: Verdict) -> &str {
        match verdict {
            Verdict::Correct => &self.correct,
            Verdict::Wrong => &self.wrong,
        }
    }
}

/// Tally of what one annotation pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub correct: usize,
    pub wrong: usize,
    pub unchanged: usize,
}

impl AnnotationReport {
    pub fn leaves(&self) -> usize {
        self.correct + self.wrong + self.unchanged
    }

    pub fn merge(&mut self, other: AnnotationReport) {
        self.correct += other.correct;
        self.wrong += other.wrong;
        self.unchanged += other.unchanged;
    }
}

#[derive(Debug, Clone, Default)]
pub struct Annotator {
    labels: Labels,
}

impl Annotator {
    pub fn new(labels: Labels) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Label every leaf reachable from `start`, `start` included if it is a leaf.
    pub fn annotate(&self, start: &mut Node) -> AnnotationReport {
        let mut report = AnnotationReport::default();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if !node.is_leaf() {
                stack.extend(node.children.iter_mut().rev());
                continue;
            }
            match self.labels.judge(node.comment()) {
                Some(verdict) => {
                    node.set_comment(self.labels.text(verdict));
                    match verdict {
                        Verdict::Correct => report.correct += 1,
                        Verdict::Wrong => report.wrong += 1,
                    }
                }
                None => report.unchanged += 1,
            }
        }
        report
    }

    /// Annotate each line of a puzzle: every child of `root`. The root itself
    /// is never labeled, even when it has no children.
    pub fn annotate_lines(&self, root: &mut Node) -> AnnotationReport {
        let mut report = AnnotationReport::default();
        for line in root.children.iter_mut() {
            report.merge(self.annotate(line));
        }
        report
    }
}

/// [`Annotator::annotate`] with the default labels.
pub fn annotate(start: &mut Node) -> AnnotationReport {
    Annotator::default().annotate(start)
}

/// [`Annotator::annotate_lines`] with the default labels.
pub fn annotate_lines(root: &mut Node) -> AnnotationReport {
    Annotator::default().annotate_lines(root)
}
