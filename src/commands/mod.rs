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

//! # Commands Module
//!
//! Bundled script commands. Each module exposes a `spec()` describing the
//! command's arguments and options, and a factory that validates them into
//! a typed handler.
//!
//! ## Command Categories
//!
//! - **load**: read a dataset (`load <path>`)
//! - **clean**: handle missing values and duplicates (`clean <strategy>`)
//! - **encode**: categorical to numeric (`encode [columns...] [--method label|onehot]`)
//! - **scale**: feature scaling (`scale <standard|minmax> [columns...] [--exclude cols]`)
//! - **columns**: `drop <columns...>` and `select <columns...>`
//! - **split**: train/test partition (`split <ratio> [--target col] [--seed n]`)
//! - **train**: fit a classifier (`train <algorithm> [--target col] [hyper-parameters]`)
//! - **evaluate**: score the model on the held-out rows
//! - **export**: write the current dataset (`export <path>`)
//! - **save**: write a JSON summary of the model and metrics (`save <path>`)

pub mod load;
pub mod clean;
pub mod encode;
pub mod scale;
pub mod columns;
pub mod split;
pub mod train;
pub mod evaluate;
pub mod export;
pub mod save;

use crate::command::{PsCommandInput, PsCommandRegistry};
use crate::errors::Result;

/// Registers every bundled command.
pub fn register_defaults(registry: &mut PsCommandRegistry) {
    registry.register(load::spec());
    registry.register(clean::spec());
    registry.register(encode::spec());
    registry.register(scale::spec());
    registry.register(columns::drop_spec());
    registry.register(columns::select_spec());
    registry.register(split::spec());
    registry.register(train::spec());
    registry.register(evaluate::spec());
    registry.register(export::spec());
    registry.register(save::spec());
}

/// Splits `a,b c` style column lists from arguments and option values.
pub(crate) fn column_list<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut columns = Vec::new();
    for word in words {
        for name in word.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}

/// Non-empty path argument.
pub(crate) fn path_arg(input: &PsCommandInput<'_>) -> Result<String> {
    match input.args.first().map(|p| p.trim()) {
        Some(path) if !path.is_empty() => Ok(path.to_string()),
        _ => Err(input.error("expects a non-empty path")),
    }
}
