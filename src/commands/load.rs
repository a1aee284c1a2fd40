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

#[derive(Debug)]
pub struct PsLoad {
    path: PathBuf,
}

impl PsLoad {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PsCommand for PsLoad {
    fn name(&self) -> &'static str {
        "load"
    }

    fn execute(&self, ctx: &mut PsContext, backends: &PsBackends) -> Result<String> {
        let dataset = backends.loader.load(&self.path)?;
        let message = format!(
            "Loaded {} rows x {} columns from {}",
            dataset.n_rows(),
            dataset.n_columns(),
            self.path.display()
        );
        ctx.replace_dataset(dataset);
        Ok(message)
    }
}

pub fn load_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    Ok(Box::new(PsLoad::new(path_arg(input)?)))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("load", "load <path>", load_factory).args(1, Some(1))
}
