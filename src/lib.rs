pub use crate::annotate::{annotate, annotate_lines, AnnotationReport, Annotator, Labels, Verdict};
pub use crate::config::Config;
pub use crate::errors::SgfError;
pub use crate::pipeline::Pipeline;
pub use crate::serialize::{to_sgf, to_sgf_collection};
pub use crate::syntax::{parse, parse_collection};
pub use crate::tree::{Node, Property};

pub mod annotate;
pub mod batch;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod serialize;
pub mod syntax;
pub mod tree;
