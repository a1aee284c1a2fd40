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

//! # PipelineScript Error Module
//!
//! This module defines the error type shared by every phase of the language
//! pipeline.
//!
//! ## Phases
//!
//! Errors are raised at three distinct phases and never silently swallowed:
//!
//! - **Syntax**: the parser could not structure a line
//! - **Validation**: the compiler rejected a command or its arguments
//! - **Execution**: a compiled step failed while running; the cause is boxed
//!   inside the variant together with the failing step name
//!
//! Step handlers raise the remaining variants (`Io`, `Precondition`,
//! `Schema`, ...) and the executor wraps them into `Execution`.
//!
//! ## Usage
//!
//! ```rust
//! use pipelinescript::errors::{Result, PsError};
//!
//! fn ratio(text: &str) -> Result<f64> {
//!     text.parse::<f64>()
//!         .map_err(|_| PsError::validation("split", format!("'{text}' is not a number")))
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout PipelineScript.
pub type Result<T> = std::result::Result<T, PsError>;

/// Canonical error enumeration for PipelineScript.
#[derive(Clone, Debug, Error, Serialize, Deserialize)]
pub enum PsError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// A script line could not be structured into a command node.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A command is unknown or its arguments/options are malformed.
    #[error("validation error in '{command}': {message}")]
    Validation { command: String, message: String },

    /// A step ran before the context reached the rung it depends on.
    #[error("precondition failed (requires {requires}): {message}")]
    Precondition { requires: String, message: String },

    /// A compiled step failed during execution.
    #[error("step '{step}' (line {line}) failed: {source}")]
    Execution {
        step: String,
        line: usize,
        source: Box<PsError>,
    },

    /// Malformed data layout, e.g. a missing column or non-numeric feature.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for PsError {
    fn from(err: io::Error) -> Self {
        PsError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PsError {
    fn from(err: serde_json::Error) -> Self {
        PsError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for PsError {
    fn from(err: serde_yaml::Error) -> Self {
        PsError::Serde(err.to_string())
    }
}

impl From<csv::Error> for PsError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            PsError::Io(err.to_string())
        } else {
            PsError::Schema {
                message: format!("csv error: {err}"),
            }
        }
    }
}

impl PsError {
    /// Helper to construct syntax errors.
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        PsError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Helper to construct validation errors.
    pub fn validation(command: impl Into<String>, message: impl Into<String>) -> Self {
        PsError::Validation {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Helper to construct precondition errors naming the missing rung.
    pub fn precondition(requires: impl Into<String>, message: impl Into<String>) -> Self {
        PsError::Precondition {
            requires: requires.into(),
            message: message.into(),
        }
    }

    /// Wraps a handler failure with the step that raised it.
    pub fn execution(step: impl Into<String>, line: usize, source: PsError) -> Self {
        PsError::Execution {
            step: step.into(),
            line,
            source: Box::new(source),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        PsError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        PsError::Internal(message.into())
    }

    /// Short phase/category name, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            PsError::Io(_) => "io",
            PsError::Syntax { .. } => "syntax",
            PsError::Validation { .. } => "validation",
            PsError::Precondition { .. } => "precondition",
            PsError::Execution { .. } => "execution",
            PsError::Schema { .. } => "schema",
            PsError::Serde(_) => "serde",
            PsError::Internal(_) => "internal",
        }
    }

    /// Name of the failing step for execution errors.
    pub fn step(&self) -> Option<&str> {
        match self {
            PsError::Execution { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Innermost cause, unwrapping any execution layers.
    pub fn root_cause(&self) -> &PsError {
        match self {
            PsError::Execution { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
