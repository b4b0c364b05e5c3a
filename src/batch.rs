//! Directory batch driver.
//!
//! Collects puzzle files in natural order (`2.sgf` before `10.sgf`), runs the
//! pipeline over each on the rayon pool, one tree per task, and keeps going
//! when a file fails. The report preserves discovery order.

use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{config::BatchConfig, errors::SgfError, pipeline::Pipeline};

// ============================================================================
// NATURAL ORDER
// ============================================================================

/// One run of digits or non-digits in a file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Chunk {
    /// Digits with leading zeros removed; ordered by length, then lexically,
    /// which matches numeric order without overflow.
    Number { magnitude: usize, digits: String },
    /// Lowercased text.
    Text(String),
}

/// Sort key that orders embedded numbers numerically and text case-insensitively.
pub fn natural_key(name: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = name;
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        chunks.push(if is_digit {
            let digits = run.trim_start_matches('0').to_string();
            Chunk::Number {
                magnitude: digits.len(),
                digits,
            }
        } else {
            Chunk::Text(run.to_lowercase())
        });
        rest = tail;
    }
    chunks
}

fn compare_paths(a: &Path, b: &Path) -> Ordering {
    let key = |p: &Path| natural_key(&p.file_name().unwrap_or_default().to_string_lossy());
    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// List matching files under `dir` in natural order.
pub fn discover(dir: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, SgfError> {
    if !dir.is_dir() {
        return Err(SgfError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "input directory not found"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(config.max_depth) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            SgfError::io(path, std::io::Error::from(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&config.extension));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| compare_paths(a, b));
    log::debug!("discovered {} file(s) in '{}'", files.len(), dir.display());
    Ok(files)
}

// ============================================================================
// EXECUTION
// ============================================================================

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<String, SgfError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().filter_map(|f| match &f.result {
            Ok(out) => Some((f.path.as_path(), out.as_str())),
            Err(_) => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &SgfError)> {
        self.files.iter().filter_map(|f| match &f.result {
            Ok(_) => None,
            Err(e) => Some((f.path.as_path(), e)),
        })
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_clean(&self) -> bool {
        self.failure_count() == 0
    }

    /// One processed document per line.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for (_, sgf) in self.succeeded() {
            out.push_str(sgf);
            out.push('\n');
        }
        out
    }
}

/// Process every discovered file. Only discovery errors abort the batch.
pub fn run(dir: &Path, pipeline: &Pipeline) -> Result<BatchReport, SgfError> {
    let paths = discover(dir, &pipeline.config().batch)?;
    let files: Vec<FileOutcome> = paths
        .into_par_iter()
        .map(|path| {
            let result = pipeline.process_file(&path);
            if let Err(e) = &result {
                log::warn!("skipping '{}': {e}", path.display());
            }
            FileOutcome { path, result }
        })
        .collect();
    Ok(BatchReport { files })
}
