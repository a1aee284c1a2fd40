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

//! # PipelineScript Command Module
//!
//! This module defines the contract between compiled steps and the code that
//! runs them, plus the registry the compiler resolves command words against.
//!
//! ## Command Design
//!
//! A script line such as `split 80/20 --target species` is turned into a
//! step in two stages:
//!
//! 1. At compile time the registry looks up the [`PsCommandSpec`] for
//!    `split`, checks arity and option schema, then calls the spec's factory
//!    with a [`PsCommandInput`]. The factory parses its arguments into a
//!    typed handler and rejects anything malformed.
//! 2. At run time the executor calls [`PsCommand::execute`] with the shared
//!    [`PsContext`] and the active [`PsBackends`].
//!
//! Handlers compute their result before touching the context, so a failing
//! step leaves the context exactly as it found it.
//!
//! ## Implementing Custom Commands
//!
//! ```rust
//! use pipelinescript::command::{PsCommand, PsCommandInput, PsCommandSpec, PsCommandRegistry};
//! use pipelinescript::backend::PsBackends;
//! use pipelinescript::context::PsContext;
//! use pipelinescript::errors::Result;
//!
//! #[derive(Debug)]
//! struct Note(String);
//!
//! impl PsCommand for Note {
//!     fn name(&self) -> &'static str {
//!         "note"
//!     }
//!
//!     fn execute(&self, _ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
//!         Ok(format!("Note: {}", self.0))
//!     }
//! }
//!
//! fn note_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
//!     Ok(Box::new(Note(input.args.join(" "))))
//! }
//!
//! let mut registry = PsCommandRegistry::with_defaults();
//! registry.register(PsCommandSpec::new("note", "note <text...>", note_factory).args(1, None));
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::backend::PsBackends;
use crate::config::PsConfig;
use crate::context::PsContext;
use crate::errors::{PsError, Result};

/// Contract every compiled step handler fulfills.
pub trait PsCommand: fmt::Debug + Send + Sync {
    /// Command word the handler was compiled from.
    fn name(&self) -> &'static str;

    /// Runs the step against the shared context.
    ///
    /// Returns the human-readable log message for the step. On error the
    /// context must be left untouched.
    fn execute(&self, ctx: &mut PsContext, backends: &PsBackends) -> Result<String>;
}

/// Runs a handler and attaches the step name and source line to failures.
pub fn execute_command(
    command: &dyn PsCommand,
    line: usize,
    ctx: &mut PsContext,
    backends: &PsBackends,
) -> Result<String> {
    command
        .execute(ctx, backends)
        .map_err(|err| PsError::execution(command.name(), line, err))
}

/// Value kind accepted by an option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsOptionKind {
    Text,
    /// Non-negative integer.
    Integer,
    /// Finite floating-point number.
    Number,
}

impl PsOptionKind {
    fn check(&self, value: &str) -> std::result::Result<(), String> {
        match self {
            PsOptionKind::Text if value.trim().is_empty() => Err("expects a non-empty value".to_string()),
            PsOptionKind::Text => Ok(()),
            PsOptionKind::Integer => value
                .parse::<u64>()
                .map(|_| ())
                .map_err(|_| format!("expects a non-negative integer, got '{value}'")),
            PsOptionKind::Number => match value.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(()),
                _ => Err(format!("expects a number, got '{value}'")),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PsOptionSpec {
    pub name: &'static str,
    pub kind: PsOptionKind,
}

impl PsOptionSpec {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: PsOptionKind::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: PsOptionKind::Integer }
    }

    pub const fn number(name: &'static str) -> Self {
        Self { name, kind: PsOptionKind::Number }
    }
}

/// Everything a factory sees when turning a syntax node into a handler.
#[derive(Clone, Copy, Debug)]
pub struct PsCommandInput<'a> {
    pub command: &'a str,
    pub args: &'a [String],
    /// Options that passed the schema check, in source order.
    pub options: &'a IndexMap<String, String>,
    pub config: &'a PsConfig,
    pub line: usize,
}

impl<'a> PsCommandInput<'a> {
    pub fn option(&self, name: &str) -> Option<&'a str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn option_usize(&self, name: &str) -> Result<Option<usize>> {
        self.option(name)
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| self.error(format!("--{name} expects a non-negative integer, got '{v}'")))
            })
            .transpose()
    }

    pub fn option_u64(&self, name: &str) -> Result<Option<u64>> {
        self.option(name)
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| self.error(format!("--{name} expects a non-negative integer, got '{v}'")))
            })
            .transpose()
    }

    pub fn option_f64(&self, name: &str) -> Result<Option<f64>> {
        self.option(name)
            .map(|v| match v.parse::<f64>() {
                Ok(parsed) if parsed.is_finite() => Ok(parsed),
                _ => Err(self.error(format!("--{name} expects a number, got '{v}'"))),
            })
            .transpose()
    }

    /// Validation error for this command, prefixed with its source line.
    pub fn error(&self, message: impl fmt::Display) -> PsError {
        PsError::validation(self.command, format!("line {}: {}", self.line, message))
    }
}

pub type PsCommandFactory = fn(&PsCommandInput<'_>) -> Result<Box<dyn PsCommand>>;

/// Registry entry describing one command word.
#[derive(Clone, Debug)]
pub struct PsCommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub min_args: usize,
    /// `None` accepts any number of trailing arguments.
    pub max_args: Option<usize>,
    pub options: Vec<PsOptionSpec>,
    pub factory: PsCommandFactory,
}

impl PsCommandSpec {
    pub fn new(name: &'static str, usage: &'static str, factory: PsCommandFactory) -> Self {
        Self {
            name,
            usage,
            min_args: 0,
            max_args: Some(0),
            options: Vec::new(),
            factory,
        }
    }

    pub fn args(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_args = min;
        self.max_args = max;
        self
    }

    pub fn option(mut self, option: PsOptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn option_spec(&self, name: &str) -> Option<&PsOptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Checks positional argument count against the spec.
    pub fn check_arity(&self, input: &PsCommandInput<'_>) -> Result<()> {
        let count = input.args.len();
        if count < self.min_args {
            return Err(input.error(format!(
                "expects at least {} argument(s), got {} (usage: {})",
                self.min_args, count, self.usage
            )));
        }
        if let Some(max) = self.max_args {
            if count > max {
                return Err(input.error(format!(
                    "takes at most {} argument(s), got {} (usage: {})",
                    max, count, self.usage
                )));
            }
        }
        Ok(())
    }

    /// Checks one option value against its declared kind.
    pub fn check_option(&self, input: &PsCommandInput<'_>, option: &PsOptionSpec, value: &str) -> Result<()> {
        option
            .kind
            .check(value)
            .map_err(|msg| input.error(format!("--{} {}", option.name, msg)))
    }
}

/// Open mapping from command word to [`PsCommandSpec`].
#[derive(Clone, Debug, Default)]
pub struct PsCommandRegistry {
    specs: IndexMap<String, PsCommandSpec>,
}

impl PsCommandRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::commands::register_defaults(&mut registry);
        registry
    }

    /// Adds or replaces the spec for `spec.name`.
    pub fn register(&mut self, spec: PsCommandSpec) {
        if self.specs.contains_key(spec.name) {
            log::warn!("replacing registered command '{}'", spec.name);
        }
        self.specs.insert(spec.name.to_string(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&PsCommandSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Registered command words in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.keys().map(String::as_str).collect()
    }

    pub fn specs(&self) -> impl Iterator<Item = &PsCommandSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
