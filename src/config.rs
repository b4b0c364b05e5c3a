//! Pipeline configuration.
//!
//! Every field has a default, so an empty or partial YAML file is valid.
//!
//! ```yaml
//! labels:
//!   marker: "+"
//!   correct: CORRECT
//!   wrong: WRONG
//! pipeline:
//!   annotate: true
//!   clean_comments: false
//!   flatten: false
//! batch:
//!   extension: sgf
//!   max_depth: 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::annotate::Labels;
use crate::errors::SgfError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub labels: Labels,
    pub pipeline: PipelineConfig,
    pub batch: BatchConfig,
}

/// Which stages run for each document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Label the leaves of every line below the root.
    pub annotate: bool,
    /// Run comment cleanup on the tree before annotation.
    pub clean_comments: bool,
    /// Strip line feeds from the serialized output.
    pub flatten: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            annotate: true,
            clean_comments: false,
            flatten: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// File extension to collect, without the dot. Compared case-insensitively.
    pub extension: String,
    /// Directory depth to descend; 1 means only the given directory.
    pub max_depth: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: "sgf".into(),
            max_depth: 1,
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self, SgfError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config =
            serde_yaml::from_str(text).map_err(|e| SgfError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, SgfError> {
        let text = std::fs::read_to_string(path).map_err(|e| SgfError::io(path, e))?;
        let config = Self::from_yaml_str(&text)?;
        log::debug!("loaded configuration from '{}'", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SgfError> {
        let labels = &self.labels;
        if labels.marker.is_empty() {
            return Err(SgfError::config("labels.marker must not be empty"));
        }
        if labels.correct.trim().is_empty() || labels.wrong.trim().is_empty() {
            return Err(SgfError::config("labels.correct and labels.wrong must not be blank"));
        }
        if labels.correct.trim() == labels.wrong.trim() {
            return Err(SgfError::config("labels.correct and labels.wrong must differ"));
        }
        if labels.correct.contains(labels.marker.as_str()) {
            log::warn!(
                "labels.correct contains the marker '{}'; relabeling relies on the exact-label check",
                labels.marker
            );
        }
        if self.batch.extension.is_empty() {
            return Err(SgfError::config("batch.extension must not be empty"));
        }
        if self.batch.max_depth == 0 {
            return Err(SgfError::config("batch.max_depth must be at least 1"));
        }
        Ok(())
    }
}
