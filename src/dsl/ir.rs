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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dsl::lexer::is_option_word;
use crate::errors::{PsError, Result};

/// One command line of a script: the command word, its positional
/// arguments and its `--key value` options.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PsSyntaxNode {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub options: IndexMap<String, String>,
    /// Source line the node was parsed from; 0 for nodes built in code.
    #[serde(default)]
    pub line: usize,
}

// Source line is bookkeeping, not structure.
impl PartialEq for PsSyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command && self.args == other.args && self.options == other.options
    }
}

impl Eq for PsSyntaxNode {}

impl PsSyntaxNode {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Renders the node as one script line that parses back to an equal node.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len() + self.options.len() * 2);
        parts.push(quote_word(&self.command));
        for arg in &self.args {
            parts.push(quote_word(arg));
        }
        for (key, value) in &self.options {
            parts.push(format!("--{key}"));
            parts.push(quote_word(value));
        }
        parts.join(" ")
    }
}

impl fmt::Display for PsSyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Ordered list of syntax nodes, one per non-empty, non-comment line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsProgram {
    pub nodes: Vec<PsSyntaxNode>,
}

impl PsProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: PsSyntaxNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn push(&mut self, node: PsSyntaxNode) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PsSyntaxNode> {
        self.nodes.iter()
    }

    pub fn commands(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.command.as_str()).collect()
    }

    /// Script text for the program, one line per node, no trailing newline.
    pub fn render(&self) -> String {
        self.nodes
            .iter()
            .map(PsSyntaxNode::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PsError::internal(format!("Failed to serialize program: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PsError::Serde(format!("Invalid program JSON: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| PsError::internal(format!("Failed to serialize program: {}", e)))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| PsError::Serde(format!("Invalid program YAML: {}", e)))
    }
}

impl Index<usize> for PsProgram {
    type Output = PsSyntaxNode;

    fn index(&self, index: usize) -> &Self::Output {
        &self.nodes[index]
    }
}

impl<'a> IntoIterator for &'a PsProgram {
    type Item = &'a PsSyntaxNode;
    type IntoIter = std::slice::Iter<'a, PsSyntaxNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Display for PsProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn needs_quotes(word: &str) -> bool {
    word.is_empty()
        || word.starts_with('#')
        || word.starts_with("//")
        || word.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'')
        || is_option_word(word)
}

fn quote_word(word: &str) -> String {
    if !needs_quotes(word) {
        return word.to_string();
    }
    match (word.contains('"'), word.contains('\'')) {
        (true, true) => mixed_quotes(word),
        (true, false) => format!("'{word}'"),
        _ => format!("\"{word}\""),
    }
}

/// Adjacent quoted segments join into one word, so `a"b'c` renders as
/// `"a"'"'"b'c"`.
fn mixed_quotes(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 8);
    for (i, run) in word.split('"').enumerate() {
        if i > 0 {
            out.push_str("'\"'");
        }
        if !run.is_empty() {
            out.push('"');
            out.push_str(run);
            out.push('"');
        }
    }
    out
}
