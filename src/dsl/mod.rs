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

//! # PipelineScript Language Front End
//!
//! This module turns script text into executable steps. Each stage is a pure
//! function of its input:
//!
//! - **Lexer** ([lexer.rs](lexer/index.html)): total tokenizer; never fails.
//!   Classifies words as command, argument, option key or option value.
//! - **Parser** ([parser.rs](parser/index.html)): groups tokens into one
//!   syntax node per line and rejects malformed structure.
//! - **IR** ([ir.rs](ir/index.html)): the program of syntax nodes. It can be
//!   rendered back to script text or stored as JSON/YAML.
//! - **Compiler** ([compiler.rs](compiler/index.html)): resolves each node
//!   against the command registry and builds the step sequence.
//!
//! ## Script Syntax
//!
//! ```text
//! # comments start with '#' or '//' at the beginning of a word
//! load data/iris.csv
//! clean missing
//! encode
//! split 80/20 --target species
//! train random_forest --trees 50
//! evaluate
//! ```
//!
//! A line is a command word followed by positional arguments and
//! `--key value` (or `--key=value`) options. Words may be quoted with `"` or
//! `'` to include whitespace.

pub mod lexer;
pub mod parser;
pub mod ir;
pub mod compiler;

pub use lexer::{tokenize, PsLexer, PsPosition, PsToken, PsTokenKind};
pub use parser::{parse, PsParser};
pub use ir::{PsProgram, PsSyntaxNode};
pub use compiler::{compile, PsCompiler, PsStep, PsStepSequence};
