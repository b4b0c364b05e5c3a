//! Defines the command-line arguments and subcommands for the tsumego CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "tsumego",
    version,
    about = "Annotate Go puzzle SGF files with CORRECT/WRONG leaf verdicts."
)]
pub struct TsumegoArgs {
    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse, label every puzzle line, and write the SGF back.
    Annotate {
        /// The SGF file to annotate.
        #[arg(required = true)]
        file: PathBuf,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Clean comments and strip line breaks for flashcard import.
    Flatten {
        /// The SGF file to flatten.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Process a directory of SGF files into a TSV file, one puzzle per line.
    Batch {
        /// Directory containing the SGF files.
        #[arg(required = true)]
        input_dir: PathBuf,
        /// Path to the output TSV file.
        #[arg(required = true)]
        output_file: PathBuf,
        /// Also label leaves before flattening.
        #[arg(long)]
        annotate: bool,
        /// Keep comments as they are.
        #[arg(long)]
        no_clean: bool,
    },
    /// Show the variation tree of an SGF file.
    Tree {
        /// The SGF file to inspect.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON.
        #[arg(long)]
        json: bool,
    },
}
