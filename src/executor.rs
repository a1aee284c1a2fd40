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

//! # PipelineScript Executor
//!
//! Runs a compiled step sequence in order against a fresh context.
//!
//! - Each successful step appends exactly one message to `context.log`.
//! - The first failing step stops the run; later steps never execute.
//! - Failures are returned inside [`PsRunResult`], never raised, so the
//!   caller can still inspect the partially filled context.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::backend::PsBackends;
use crate::command::execute_command;
use crate::config::PsConfig;
use crate::context::PsContext;
use crate::dsl::compiler::{PsStep, PsStepSequence};
use crate::errors::PsError;

/// Outcome of a single executed step.
#[derive(Clone, Debug, Serialize)]
pub struct PsStepReport {
    pub name: String,
    pub line: usize,
    pub success: bool,
    /// Log message on success, error text on failure.
    pub message: String,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

/// Everything a run produced, successful or not.
#[derive(Clone, Debug)]
pub struct PsRunResult {
    pub success: bool,
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
    pub context: PsContext,
    pub error: Option<PsError>,
    pub steps: Vec<PsStepReport>,
}

impl PsRunResult {
    /// Result for a script that never reached execution.
    pub fn failed(error: PsError) -> Self {
        Self {
            success: false,
            duration: Duration::ZERO,
            started_at: Utc::now(),
            context: PsContext::default(),
            error: Some(error),
            steps: Vec::new(),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    /// Name of the step that failed, if any.
    pub fn failed_step(&self) -> Option<&str> {
        self.error.as_ref().and_then(PsError::step)
    }

    pub fn summary(&self) -> Value {
        serde_json::json!({
            "success": self.success,
            "started_at": self.started_at.to_rfc3339(),
            "duration_secs": self.duration_secs(),
            "error": self.error.as_ref().map(|e| e.to_string()),
            "steps": self.steps,
            "context": self.context.summary(),
        })
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PsExecutor {
    backends: PsBackends,
    config: PsConfig,
}

impl PsExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor with native backends built from `config`.
    pub fn with_config(config: PsConfig) -> Self {
        Self {
            backends: PsBackends::native(&config),
            config,
        }
    }

    pub fn with_backends(mut self, backends: PsBackends) -> Self {
        self.backends = backends;
        self
    }

    pub fn backends(&self) -> &PsBackends {
        &self.backends
    }

    pub fn config(&self) -> &PsConfig {
        &self.config
    }

    /// Fresh context seeded from the configuration.
    pub fn new_context(&self) -> PsContext {
        PsContext::with_seed(self.config.seed)
    }

    pub fn execute(&self, steps: &PsStepSequence) -> PsRunResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut context = self.new_context();
        let mut reports = Vec::with_capacity(steps.len());
        let mut error = None;

        log::info!("running {} step(s)", steps.len());
        for step in steps {
            let (report, outcome) = self.run_step(step, &mut context);
            reports.push(report);
            if let Err(err) = outcome {
                error = Some(err);
                break;
            }
        }

        let duration = clock.elapsed();
        match &error {
            None => log::info!("run finished in {:.3}s", duration.as_secs_f64()),
            Some(err) => log::error!("run failed after {:.3}s: {}", duration.as_secs_f64(), err),
        }

        PsRunResult {
            success: error.is_none(),
            duration,
            started_at,
            context,
            error,
            steps: reports,
        }
    }

    /// Runs one step, appending its message to the log on success.
    pub(crate) fn run_step(&self, step: &PsStep, context: &mut PsContext) -> (PsStepReport, Result<(), PsError>) {
        log::info!("step '{}' (line {})", step.name, step.line);
        let clock = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            execute_command(step.handler.as_ref(), step.line, context, &self.backends)
        }))
        .unwrap_or_else(|panic| {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_string());
            Err(PsError::execution(&step.name, step.line, PsError::internal(detail)))
        });

        let duration = clock.elapsed();
        match outcome {
            Ok(message) => {
                log::info!("{}", message);
                context.log.push(message.clone());
                let report = PsStepReport {
                    name: step.name.clone(),
                    line: step.line,
                    success: true,
                    message,
                    duration,
                };
                (report, Ok(()))
            }
            Err(err) => {
                log::warn!("step '{}' failed: {}", step.name, err);
                let report = PsStepReport {
                    name: step.name.clone(),
                    line: step.line,
                    success: false,
                    message: err.to_string(),
                    duration,
                };
                (report, Err(err))
            }
        }
    }
}
