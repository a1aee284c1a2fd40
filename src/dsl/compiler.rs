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

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::command::{PsCommand, PsCommandInput, PsCommandRegistry};
use crate::config::PsConfig;
use crate::dsl::ir::{PsProgram, PsSyntaxNode};
use crate::errors::{PsError, Result};

/// A validated, executable unit produced from one syntax node.
#[derive(Clone)]
pub struct PsStep {
    pub name: String,
    pub args: Vec<String>,
    pub options: IndexMap<String, String>,
    pub line: usize,
    pub handler: Arc<dyn PsCommand>,
}

impl PsStep {
    /// The step as a script line.
    pub fn describe(&self) -> String {
        PsSyntaxNode {
            command: self.name.clone(),
            args: self.args.clone(),
            options: self.options.clone(),
            line: self.line,
        }
        .render()
    }
}

impl fmt::Debug for PsStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PsStep")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("options", &self.options)
            .field("line", &self.line)
            .field("handler", &self.handler)
            .finish()
    }
}

// The handler is built from name, args and options, so those decide equality.
impl PartialEq for PsStep {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.args == other.args
            && self.options == other.options
            && self.line == other.line
    }
}

/// Ordered steps, one per program node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PsStepSequence {
    steps: Vec<PsStep>,
}

impl PsStepSequence {
    pub fn new(steps: Vec<PsStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PsStep> {
        self.steps.iter()
    }

    pub fn get(&self, index: usize) -> Option<&PsStep> {
        self.steps.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Index<usize> for PsStepSequence {
    type Output = PsStep;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a PsStepSequence {
    type Item = &'a PsStep;
    type IntoIter = std::slice::Iter<'a, PsStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Resolves program nodes against a command registry.
///
/// Compilation is pure and fails fast: the first invalid node aborts with a
/// validation error naming the command and line, and nothing is returned.
#[derive(Clone, Debug)]
pub struct PsCompiler {
    registry: PsCommandRegistry,
    config: PsConfig,
}

impl Default for PsCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl PsCompiler {
    pub fn new() -> Self {
        Self {
            registry: PsCommandRegistry::with_defaults(),
            config: PsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_registry(mut self, registry: PsCommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &PsCommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PsCommandRegistry {
        &mut self.registry
    }

    pub fn compile(&self, program: &PsProgram) -> Result<PsStepSequence> {
        let mut steps = Vec::with_capacity(program.len());
        for node in program {
            steps.push(self.compile_node(node)?);
        }
        log::debug!("compiled {} step(s)", steps.len());
        Ok(PsStepSequence::new(steps))
    }

    fn compile_node(&self, node: &PsSyntaxNode) -> Result<PsStep> {
        let spec = self.registry.get(&node.command).ok_or_else(|| {
            PsError::validation(
                node.command.as_str(),
                format!(
                    "line {}: unknown command '{}' (known commands: {})",
                    node.line,
                    node.command,
                    self.registry.names().join(", ")
                ),
            )
        })?;

        let mut options = IndexMap::new();
        {
            let raw = PsCommandInput {
                command: spec.name,
                args: &node.args,
                options: &node.options,
                config: &self.config,
                line: node.line,
            };
            spec.check_arity(&raw)?;

            for (key, value) in &node.options {
                match spec.option_spec(key) {
                    Some(option) => {
                        spec.check_option(&raw, option, value)?;
                        options.insert(key.clone(), value.clone());
                    }
                    None if self.config.strict_options => {
                        let allowed: Vec<String> = spec.options.iter().map(|o| format!("--{}", o.name)).collect();
                        let allowed = if allowed.is_empty() {
                            "none".to_string()
                        } else {
                            allowed.join(", ")
                        };
                        return Err(raw.error(format!("unknown option '--{key}' (allowed: {allowed})")));
                    }
                    None => {
                        log::warn!(
                            "line {}: ignoring unknown option '--{}' for '{}'",
                            node.line,
                            key,
                            spec.name
                        );
                    }
                }
            }
        }

        let input = PsCommandInput {
            command: spec.name,
            args: &node.args,
            options: &options,
            config: &self.config,
            line: node.line,
        };
        let handler = (spec.factory)(&input)?;

        Ok(PsStep {
            name: spec.name.to_string(),
            args: node.args.clone(),
            options,
            line: node.line,
            handler: Arc::from(handler),
        })
    }
}

/// Compiles a program with the bundled commands and default configuration.
pub fn compile(program: &PsProgram) -> Result<PsStepSequence> {
    PsCompiler::new().compile(program)
}
