//! The parse → annotate → serialize pipeline.

use std::path::Path;

use crate::{
    annotate::{AnnotationReport, Annotator},
    cleanup,
    config::Config,
    errors::SgfError,
    serialize::to_sgf,
    syntax::parse_named,
    tree::Node,
};

/// Configured pipeline. Holds no per-document state, so one instance can be
/// shared by many workers.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
    annotator: Annotator,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let annotator = Annotator::new(config.labels.clone());
        Self { config, annotator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the configured tree stages in place: comment cleanup, then annotation.
    pub fn process_tree(&self, root: &mut Node) -> AnnotationReport {
        if self.config.pipeline.clean_comments {
            let cleaned = cleanup::clean_comments(root);
            log::trace!("cleaned {cleaned} comment value(s)");
        }
        if self.config.pipeline.annotate {
            self.annotator.annotate_lines(root)
        } else {
            AnnotationReport::default()
        }
    }

    /// Process one SGF document. `name` labels diagnostics. With `flatten` set,
    /// line breaks are removed from every value before serializing, so the
    /// result is a single line.
    pub fn process(&self, name: &str, text: &str) -> Result<String, SgfError> {
        let mut root = parse_named(name, text)?;
        let report = self.process_tree(&mut root);
        log::debug!(
            "{name}: {} correct, {} wrong, {} already labeled",
            report.correct,
            report.wrong,
            report.unchanged
        );

        if self.config.pipeline.flatten {
            let joined = cleanup::join_lines(&mut root);
            log::trace!("removed line breaks from {joined} value(s)");
        }
        Ok(to_sgf(&root))
    }

    pub fn process_file(&self, path: &Path) -> Result<String, SgfError> {
        let text = std::fs::read_to_string(path).map_err(|e| SgfError::io(path, e))?;
        self.process(&path.display().to_string(), &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_default_pipeline_annotates() {
        let out = Pipeline::default()
            .process("t", "(;GM[1](;B[aa]C[+])(;B[ab]))")
            .unwrap();
        assert_eq!(out, "(;GM[1](;B[aa]C[CORRECT])(;B[ab]C[WRONG]))");
    }

    #[test]
    fn test_annotation_can_be_disabled() {
        let pipeline = Pipeline::new(Config {
            pipeline: PipelineConfig {
                annotate: false,
                clean_comments: true,
                flatten: true,
            },
            ..Config::default()
        });
        let out = pipeline
            .process("t", "(;GN[a\nb]C[<b>Black</b>\nto live];B[aa])")
            .unwrap();
        assert_eq!(out, "(;GN[ab]C[Black. to live];B[aa])");
    }

    #[test]
    fn test_cleanup_runs_before_annotation() {
        let pipeline = Pipeline::new(Config {
            pipeline: PipelineConfig {
                annotate: true,
                clean_comments: true,
                flatten: false,
            },
            ..Config::default()
        });
        let out = pipeline
            .process("t", "(;GM[1](;B[aa]C[CORRECT\n<b>CORRECT!</b>]))")
            .unwrap();
        assert_eq!(out, "(;GM[1];B[aa]C[CORRECT])");
    }

    #[test]
    fn test_flatten_removes_soft_line_break_without_losing_nodes() {
        let pipeline = Pipeline::new(Config {
            pipeline: PipelineConfig {
                annotate: true,
                clean_comments: true,
                flatten: true,
            },
            ..Config::default()
        });
        let out = pipeline
            .process("t", "(;GM[1]GN[Problem 1\\\n];B[aa]C[+])")
            .unwrap();
        assert_eq!(out, "(;GM[1]GN[Problem 1];B[aa]C[CORRECT])");
        assert_eq!(crate::syntax::parse(&out).unwrap().node_count(), 2);
    }

    #[test]
    fn test_parse_failure_propagates() {
        let err = Pipeline::default().process("bad.sgf", "(;B[aa]").unwrap_err();
        assert!(err.is_malformed());
    }
}
