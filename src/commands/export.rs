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

use std::path::PathBuf;

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec};
use crate::context::PsContext;
use crate::errors::Result;

use super::path_arg;

/// Writes the current (prepared) dataset; the format follows the extension.
#[derive(Debug)]
pub struct PsExport {
    path: PathBuf,
}

impl PsCommand for PsExport {
    fn name(&self) -> &'static str {
        "export"
    }

    fn execute(&self, ctx: &mut PsContext, backends: &PsBackends) -> Result<String> {
        let dataset = ctx.require_dataset()?;
        backends.loader.write(&self.path, dataset)?;
        Ok(format!("Exported {} rows to {}", dataset.n_rows(), self.path.display()))
    }
}

pub fn export_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    Ok(Box::new(PsExport {
        path: PathBuf::from(path_arg(input)?),
    }))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("export", "export <path>", export_factory).args(1, Some(1))
}
