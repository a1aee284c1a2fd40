//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of PipelineScript.
//! The PipelineScript project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PsError, Result};

/// Runtime configuration shared by the compiler, executor and bundled
/// backends. Every field has a default so partial YAML/JSON files are valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsConfig {
    /// Seed used by `split` and the training backends unless a step overrides it.
    pub seed: u64,
    /// Field delimiter for `.csv` files (`.tsv` always uses a tab).
    pub csv_delimiter: char,
    /// Cell spellings treated as missing when loading a dataset.
    pub missing_markers: Vec<String>,
    /// Reject unknown `--option` keys instead of ignoring them with a warning.
    pub strict_options: bool,
    /// Default level for the command-line logger.
    pub log_level: String,
    /// Number of trees for `random_forest` when `--trees` is absent.
    pub default_trees: usize,
}

impl Default for PsConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            csv_delimiter: ',',
            missing_markers: ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "?"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strict_options: true,
            log_level: "info".to_string(),
            default_trees: 100,
        }
    }
}

impl PsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file, choosing JSON or YAML by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PsError::Io(format!("{}: {}", path.display(), e)))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config: PsConfig = match extension.as_str() {
            "json" => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot constrain on its own.
    pub fn validate(&self) -> Result<()> {
        if !self.csv_delimiter.is_ascii() {
            return Err(PsError::validation(
                "config",
                format!("csv_delimiter must be ASCII, got '{}'", self.csv_delimiter),
            ));
        }
        if self.default_trees == 0 {
            return Err(PsError::validation("config", "default_trees must be positive"));
        }
        Ok(())
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn csv_delimiter(mut self, delimiter: char) -> Self {
        self.csv_delimiter = delimiter;
        self
    }

    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn strict_options(mut self, strict: bool) -> Self {
        self.strict_options = strict;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    pub fn default_trees(mut self, trees: usize) -> Self {
        self.default_trees = trees;
        self
    }

    pub(crate) fn is_missing_marker(&self, cell: &str) -> bool {
        let trimmed = cell.trim();
        self.missing_markers.iter().any(|m| m == trimmed)
    }
}
