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
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PsTokenKind {
    Command,
    Argument,
    OptionKey,
    OptionValue,
    End,
}

impl PsTokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PsTokenKind::Command => "COMMAND",
            PsTokenKind::Argument => "ARGUMENT",
            PsTokenKind::OptionKey => "OPTION_KEY",
            PsTokenKind::OptionValue => "OPTION_VALUE",
            PsTokenKind::End => "END",
        }
    }
}

/// 1-based source location of the first character of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsPosition {
    pub line: usize,
    pub column: usize,
}

impl PsPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for PsPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsToken {
    pub kind: PsTokenKind,
    /// Token text with quotes removed. Option keys carry the bare name
    /// (`target` for `--target`).
    pub value: String,
    pub position: PsPosition,
}

impl PsToken {
    pub fn new(kind: PsTokenKind, value: impl Into<String>, position: PsPosition) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }
}

impl fmt::Display for PsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} @{}", self.kind.as_str(), self.value, self.position)
    }
}

/// A whitespace-delimited word of one line.
#[derive(Debug)]
struct PsWord {
    column: usize,
    text: String,
    quoted: bool,
}

fn option_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^--([A-Za-z_][A-Za-z0-9_-]*)(?:=(.*))?$").expect("option pattern is valid")
    })
}

/// Returns `true` when `word` is spelled like an option key (`--name`).
pub fn is_option_word(word: &str) -> bool {
    option_pattern().is_match(word)
}

/// Total tokenizer for PipelineScript source text.
///
/// The lexer knows nothing about which commands exist; every line is
/// tokenized permissively and structural checks happen in the parser.
#[derive(Clone, Debug, Default)]
pub struct PsLexer;

impl PsLexer {
    pub fn new() -> Self {
        Self
    }

    pub fn tokenize(&self, source: &str) -> Vec<PsToken> {
        let mut tokens = Vec::new();
        let mut line_count = 0;

        for (idx, line) in source.lines().enumerate() {
            let line_no = idx + 1;
            line_count = line_no;

            let words = split_words(line);
            let mut iter = words.into_iter().peekable();

            let Some(first) = iter.next() else {
                continue;
            };
            tokens.push(PsToken::new(
                PsTokenKind::Command,
                first.text,
                PsPosition::new(line_no, first.column),
            ));

            while let Some(word) = iter.next() {
                let position = PsPosition::new(line_no, word.column);
                let captures = if word.quoted {
                    None
                } else {
                    option_pattern().captures(&word.text)
                };

                let Some(captures) = captures else {
                    tokens.push(PsToken::new(PsTokenKind::Argument, word.text, position));
                    continue;
                };

                let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                tokens.push(PsToken::new(PsTokenKind::OptionKey, name, position));

                if let Some(inline) = captures.get(2) {
                    let value_position = PsPosition::new(line_no, word.column + 3 + name.chars().count());
                    tokens.push(PsToken::new(
                        PsTokenKind::OptionValue,
                        inline.as_str(),
                        value_position,
                    ));
                    continue;
                }

                let next_is_value = iter
                    .peek()
                    .map(|next| next.quoted || !is_option_word(&next.text))
                    .unwrap_or(false);
                if next_is_value {
                    if let Some(value) = iter.next() {
                        tokens.push(PsToken::new(
                            PsTokenKind::OptionValue,
                            value.text,
                            PsPosition::new(line_no, value.column),
                        ));
                    }
                }
            }
        }

        tokens.push(PsToken::new(
            PsTokenKind::End,
            "",
            PsPosition::new(line_count + 1, 1),
        ));
        tokens
    }
}

/// Convenience wrapper around [`PsLexer::tokenize`].
pub fn tokenize(source: &str) -> Vec<PsToken> {
    PsLexer::new().tokenize(source)
}

// A comment starts at `#` or `//` at the beginning of a word and runs to
// end of line. Quotes group whitespace; an unterminated quote runs to end of line.
fn split_words(line: &str) -> Vec<PsWord> {
    let chars: Vec<char> = line.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        if chars[i] == '#' || (chars[i] == '/' && chars.get(i + 1) == Some(&'/')) {
            break;
        }

        let column = i + 1;
        let mut text = String::new();
        let mut quoted = false;

        while i < chars.len() && !chars[i].is_whitespace() {
            let c = chars[i];
            if c == '"' || c == '\'' {
                quoted = true;
                i += 1;
                while i < chars.len() && chars[i] != c {
                    text.push(chars[i]);
                    i += 1;
                }
                i += 1;
            } else {
                text.push(c);
                i += 1;
            }
        }

        words.push(PsWord {
            column,
            text,
            quoted,
        });
    }

    words
}
