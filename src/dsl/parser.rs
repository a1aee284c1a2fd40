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

use crate::dsl::ir::{PsProgram, PsSyntaxNode};
use crate::dsl::lexer::{is_option_word, PsLexer, PsToken, PsTokenKind};
use crate::errors::{PsError, Result};

/// Groups a token stream into one [`PsSyntaxNode`] per command line.
///
/// The parser checks structure only. Whether a command exists or its
/// arguments make sense is decided by the compiler.
#[derive(Clone, Debug, Default)]
pub struct PsParser {
    lexer: PsLexer,
}

impl PsParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, source: &str) -> Result<PsProgram> {
        let tokens = self.lexer.tokenize(source);
        self.parse_tokens(&tokens)
    }

    pub fn parse_file(&self, path: &Path) -> Result<PsProgram> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PsError::Io(format!("{}: {}", path.display(), e)))?;
        self.parse(&content)
    }

    pub fn parse_tokens(&self, tokens: &[PsToken]) -> Result<PsProgram> {
        let mut program = PsProgram::new();
        let mut current: Option<PsSyntaxNode> = None;
        let mut pending_key: Option<&PsToken> = None;
        let mut ended = false;

        for token in tokens {
            let line = token.line();
            if ended {
                return Err(PsError::syntax(line, format!("unexpected token after end of input: {}", token)));
            }

            match token.kind {
                PsTokenKind::Command => {
                    if let Some(key) = pending_key.take() {
                        return Err(missing_value(key));
                    }
                    if token.value.is_empty() {
                        return Err(PsError::syntax(line, "empty command word"));
                    }
                    if is_option_word(&token.value) {
                        return Err(PsError::syntax(
                            line,
                            format!("line must start with a command, found option '{}'", token.value),
                        ));
                    }
                    if let Some(node) = current.take() {
                        program.push(node);
                    }
                    current = Some(PsSyntaxNode::new(token.value.clone()).at_line(line));
                }
                PsTokenKind::Argument => {
                    if let Some(key) = pending_key.take() {
                        return Err(missing_value(key));
                    }
                    let node = node_on_line(current.as_mut(), token)?;
                    node.args.push(token.value.clone());
                }
                PsTokenKind::OptionKey => {
                    if let Some(key) = pending_key.take() {
                        return Err(missing_value(key));
                    }
                    node_on_line(current.as_mut(), token)?;
                    pending_key = Some(token);
                }
                PsTokenKind::OptionValue => {
                    let key = pending_key.take().ok_or_else(|| {
                        PsError::syntax(line, format!("option value '{}' has no option key", token.value))
                    })?;
                    let node = node_on_line(current.as_mut(), token)?;
                    node.options.insert(key.value.clone(), token.value.clone());
                }
                PsTokenKind::End => {
                    if let Some(key) = pending_key.take() {
                        return Err(missing_value(key));
                    }
                    ended = true;
                }
            }
        }

        if !ended {
            let line = tokens.last().map(PsToken::line).unwrap_or(1);
            return Err(PsError::syntax(line, "token stream is not terminated by END"));
        }

        if let Some(node) = current.take() {
            program.push(node);
        }
        log::debug!("parsed {} command line(s)", program.len());
        Ok(program)
    }
}

/// Parses script text with a default parser.
pub fn parse(source: &str) -> Result<PsProgram> {
    PsParser::new().parse(source)
}

fn missing_value(key: &PsToken) -> PsError {
    PsError::syntax(key.line(), format!("option '--{}' expects a value", key.value))
}

fn node_on_line<'a>(current: Option<&'a mut PsSyntaxNode>, token: &PsToken) -> Result<&'a mut PsSyntaxNode> {
    match current {
        Some(node) if node.line == token.line() => Ok(node),
        _ => Err(PsError::syntax(
            token.line(),
            format!("'{}' appears before any command on its line", token.value),
        )),
    }
}
