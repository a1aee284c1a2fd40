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

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::backend::PsBackends;
use crate::command::{PsCommand, PsCommandInput, PsCommandSpec};
use crate::context::PsContext;
use crate::errors::{PsError, Result};

use super::path_arg;

/// Writes a JSON summary of the trained model, its encodings and any metrics.
#[derive(Debug)]
pub struct PsSave {
    path: PathBuf,
}

impl PsCommand for PsSave {
    fn name(&self) -> &'static str {
        "save"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> Result<String> {
        let model = ctx.require_model()?;
        let document = serde_json::json!({
            "saved_at": Utc::now().to_rfc3339(),
            "model": model.summary(),
            "encodings": ctx.encodings,
            "transforms": ctx.transforms,
            "metrics": ctx.metrics,
        });

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PsError::Io(format!("{}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, text).map_err(|e| PsError::Io(format!("{}: {}", self.path.display(), e)))?;
        Ok(format!("Saved {} model summary to {}", model.algorithm, self.path.display()))
    }
}

pub fn save_factory(input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    Ok(Box::new(PsSave {
        path: PathBuf::from(path_arg(input)?),
    }))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("save", "save <path>", save_factory).args(1, Some(1))
}
