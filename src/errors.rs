//! Error handling for the SGF pipeline.
//!
//! Every failure is an [`SgfError`]. Parse failures carry the named source text
//! and a byte span so `miette` can render the offending region; annotation and
//! serialization never fail.

use std::{path::PathBuf, sync::Arc};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Named source text used when building diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> SourceArc {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum SgfError {
    #[error("Malformed SGF: {message}")]
    #[diagnostic(code(tsumego::parse::malformed))]
    MalformedSgf {
        message: String,
        #[source_code]
        src: SourceArc,
        #[label("malformed syntax")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("I/O error on '{}'", path.display())]
    #[diagnostic(code(tsumego::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(tsumego::config))]
    Config { message: String },

    #[error("Failed to render output: {message}")]
    #[diagnostic(code(tsumego::render))]
    Render { message: String },
}

impl SgfError {
    pub fn malformed(source: &SourceContext, message: impl Into<String>, span: Span) -> Self {
        SgfError::MalformedSgf {
            message: message.into(),
            src: source.to_named_source(),
            span: span.into(),
            help: None,
        }
    }

    /// Same as [`SgfError::malformed`] with a help line attached.
    pub fn malformed_with_help(
        source: &SourceContext,
        message: impl Into<String>,
        span: Span,
        help: impl Into<String>,
    ) -> Self {
        SgfError::MalformedSgf {
            message: message.into(),
            src: source.to_named_source(),
            span: span.into(),
            help: Some(help.into()),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SgfError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        SgfError::Config {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        SgfError::Render {
            message: message.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SgfError::MalformedSgf { .. })
    }
}

/// Prints an SgfError with full miette diagnostics.
pub fn print_error(error: SgfError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
