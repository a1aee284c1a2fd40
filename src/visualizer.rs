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

//! Read-only renderings of a program: a numbered list, stacked ASCII boxes,
//! or a Mermaid flowchart.

use std::fmt;
use std::str::FromStr;

use crate::dsl::ir::PsProgram;
use crate::errors::PsError;

const EMPTY: &str = "(empty pipeline)";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PsVisualFormat {
    #[default]
    Ascii,
    Text,
    Mermaid,
}

impl PsVisualFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PsVisualFormat::Ascii => "ascii",
            PsVisualFormat::Text => "text",
            PsVisualFormat::Mermaid => "mermaid",
        }
    }
}

impl fmt::Display for PsVisualFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PsVisualFormat {
    type Err = PsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "boxes" => Ok(PsVisualFormat::Ascii),
            "text" | "list" => Ok(PsVisualFormat::Text),
            "mermaid" => Ok(PsVisualFormat::Mermaid),
            other => Err(PsError::validation(
                "visualize",
                format!("unknown format '{other}' (expected ascii, text or mermaid)"),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PsVisualizer {
    format: PsVisualFormat,
}

impl PsVisualizer {
    pub fn new(format: PsVisualFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> PsVisualFormat {
        self.format
    }

    pub fn render(&self, program: &PsProgram) -> String {
        if program.is_empty() {
            return match self.format {
                PsVisualFormat::Mermaid => format!("flowchart TD\n    empty[\"{EMPTY}\"]"),
                _ => EMPTY.to_string(),
            };
        }
        let labels: Vec<String> = program.iter().map(|node| node.render()).collect();
        match self.format {
            PsVisualFormat::Text => render_text(&labels),
            PsVisualFormat::Ascii => render_ascii(&labels),
            PsVisualFormat::Mermaid => render_mermaid(&labels),
        }
    }
}

fn render_text(labels: &[String]) -> String {
    let width = labels.len().to_string().len();
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{:>width$}. {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_ascii(labels: &[String]) -> String {
    let inner = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let border = format!("+{}+", "-".repeat(inner));
    let stem = format!("{}|", " ".repeat(inner / 2 + 1));
    let head = format!("{}v", " ".repeat(inner / 2 + 1));

    let mut lines = Vec::with_capacity(labels.len() * 5);
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            lines.push(stem.clone());
            lines.push(head.clone());
        }
        lines.push(border.clone());
        lines.push(format!("| {:<w$} |", label, w = inner - 2));
        lines.push(border.clone());
    }
    lines.join("\n")
}

fn render_mermaid(labels: &[String]) -> String {
    let mut lines = vec!["flowchart TD".to_string()];
    for (i, label) in labels.iter().enumerate() {
        lines.push(format!("    s{i}[\"{}\"]", label.replace('"', "#quot;")));
    }
    for i in 1..labels.len() {
        lines.push(format!("    s{} --> s{}", i - 1, i));
    }
    lines.join("\n")
}
