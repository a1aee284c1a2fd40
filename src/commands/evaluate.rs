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

#[derive(Debug)]
pub struct PsEvaluate;

impl PsCommand for PsEvaluate {
    fn name(&self) -> &'static str {
        "evaluate"
    }

    fn execute(&self, ctx: &mut PsContext, backends: &PsBackends) -> Result<String> {
        let model = ctx.require_model()?;
        let split = ctx.require_split()?;
        let metrics = backends.evaluator.evaluate(model, &split.test)?;

        let scores: Vec<String> = ["accuracy", "f1"]
            .iter()
            .filter_map(|name| metrics.get(*name).and_then(|m| m.as_f64()).map(|v| format!("{name}={v:.4}")))
            .collect();
        let message = format!(
            "Evaluated {} on {} rows: {}",
            model.algorithm,
            split.test.n_rows(),
            if scores.is_empty() { "no scores".to_string() } else { scores.join(", ") }
        );
        ctx.metrics = metrics;
        Ok(message)
    }
}

pub fn evaluate_factory(_input: &PsCommandInput<'_>) -> Result<Box<dyn PsCommand>> {
    Ok(Box::new(PsEvaluate))
}

pub fn spec() -> PsCommandSpec {
    PsCommandSpec::new("evaluate", "evaluate", evaluate_factory)
}
