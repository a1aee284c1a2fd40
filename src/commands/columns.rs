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

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec};
use crate::context::PsContext;
use crate::errors::Result;

use super::column_list;

#[derive(Debug)]
pub struct PsDropColumns {
    columns: Vec<String>,
}

impl PsCommand for PsDropColumns {
    fn name(&self) -> &'static str {
        "drop"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let reduced = ctx.require_unsplit_dataset("drop")?.drop_columns(&self.columns)?;
        let message = format!(
            "Dropped {} column(s): {} ({} remaining)",
            self.columns.len(),
            self.columns.join(", "),
            reduced.n_columns()
        );
        for column in &self.columns {
            ctx.encodings.remove(column);
        }
        ctx.dataset = Some(reduced);
        ctx.transforms.push("drop".to_string());
        Ok(message)
    }
}

#[derive(Debug)]
pub struct PsSelectColumns {
    columns: Vec<String>,
}

impl PsCommand for PsSelectColumns {
    fn name(&self) -> &'static str {
        "select"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let reduced = ctx.require_unsplit_dataset("select")?.select_columns(&self.columns)?;
        let message = format!("Selected {} column(s): {}", self.columns.len(), self.columns.join(", "));
        ctx.encodings.retain(|column, _| self.columns.contains(column));
        ctx.dataset = Some(reduced);
        ctx.transforms.push("select".to_string());
        Ok(message)
    }
}

fn columns_arg(input: &PsCommandInput<'_>) -> Result<Vec<String>> {
    let columns = column_list(input.args.iter().map(String::as_str));
    if columns.is_empty() {
        return Err(input.error("expects at least one column name"));
    }
    Ok(columns)
}

pub fn drop_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    Ok(Box::new(PsDropColumns {
        columns: columns_arg(input)?,
    }))
}

pub fn select_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    Ok(Box::new(PsSelectColumns {
        columns: columns_arg(input)?,
    }))
}

pub fn drop_spec() -> PsCommandSpec {
    PsCommandSpec::new("drop", "drop <columns...>", drop_factory).args(1, None)
}

pub fn select_spec() -> PsCommandSpec {
    PsCommandSpec::new("select", "select <columns...>", select_factory).args(1, None)
}
