//! The tsumego command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::{fs, path::Path, process};

use clap::Parser;

use crate::{
    batch,
    cli::args::{Command, TsumegoArgs},
    cleanup,
    config::Config,
    errors::{print_error, SgfError},
    pipeline::Pipeline,
    syntax::parse_named,
};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = TsumegoArgs::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| exit_with(e)),
        None => Config::default(),
    };

    let result = match args.command {
        Command::Annotate { file, output } => handle_annotate(&file, output.as_deref(), config),
        Command::Flatten { file } => handle_flatten(&file),
        Command::Batch {
            input_dir,
            output_file,
            annotate,
            no_clean,
        } => handle_batch(&input_dir, &output_file, annotate, no_clean, config),
        Command::Tree { file, json } => handle_tree(&file, json),
    };

    if let Err(e) = result {
        exit_with(e);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn exit_with(error: SgfError) -> ! {
    print_error(error);
    process::exit(1);
}

fn read_file(path: &Path) -> Result<String, SgfError> {
    fs::read_to_string(path).map_err(|e| SgfError::io(path, e))
}

fn handle_annotate(file: &Path, output: Option<&Path>, config: Config) -> Result<(), SgfError> {
    let mut config = config;
    config.pipeline.annotate = true;
    let sgf = Pipeline::new(config).process_file(file)?;
    match output {
        Some(out) => fs::write(out, sgf + "\n").map_err(|e| SgfError::io(out, e)),
        None => {
            println!("{sgf}");
            Ok(())
        }
    }
}

fn handle_flatten(file: &Path) -> Result<(), SgfError> {
    let text = read_file(file)?;
    // Parse first so malformed input is reported instead of silently mangled.
    parse_named(&file.display().to_string(), &text)?;
    println!("{}", cleanup::flatten(&text));
    Ok(())
}

fn handle_batch(
    input_dir: &Path,
    output_file: &Path,
    annotate: bool,
    no_clean: bool,
    config: Config,
) -> Result<(), SgfError> {
    let mut config = config;
    config.pipeline.annotate = annotate;
    config.pipeline.clean_comments = !no_clean;
    config.pipeline.flatten = true;

    let report = batch::run(input_dir, &Pipeline::new(config))?;
    fs::write(output_file, report.to_tsv()).map_err(|e| SgfError::io(output_file, e))?;
    output::print_batch_summary(&report, &output_file.display().to_string());

    if !report.is_clean() {
        process::exit(1);
    }
    Ok(())
}

fn handle_tree(file: &Path, json: bool) -> Result<(), SgfError> {
    let text = read_file(file)?;
    let root = parse_named(&file.display().to_string(), &text)?;
    if json {
        println!("{}", render_json(&root)?);
    } else {
        print!("{}", output::outline(&root));
        println!(
            "{} node(s), {} leaf line(s), longest line {} node(s)",
            root.node_count(),
            root.leaf_count(),
            root.depth()
        );
    }
    Ok(())
}

fn render_json<T: serde::Serialize>(value: &T) -> Result<String, SgfError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SgfError::render(format!("tree as JSON: {e}")))
}
