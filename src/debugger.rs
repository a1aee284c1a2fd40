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

//! # PipelineScript Debugger
//!
//! A stepping executor. It runs a compiled sequence one step at a time and
//! exposes the context between steps. Breakpoints name commands; execution
//! pauses *before* a step whose command is in the breakpoint set.
//!
//! ```rust,ignore
//! let mut dbg = pipelinescript::debug(script)?.break_on("train");
//! dbg.run_to_breakpoint()?;
//! println!("{}", dbg.context().summary());
//! let result = dbg.finish();
//! ```

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::context::PsContext;
use crate::dsl::compiler::{PsStep, PsStepSequence};
use crate::errors::{PsError, Result};
use crate::executor::{PsExecutor, PsRunResult, PsStepReport};

#[derive(Debug)]
pub struct PsDebugger {
    executor: PsExecutor,
    steps: PsStepSequence,
    breakpoints: BTreeSet<String>,
    position: usize,
    context: PsContext,
    reports: Vec<PsStepReport>,
    error: Option<PsError>,
    started_at: DateTime<Utc>,
    elapsed: Duration,
}

impl PsDebugger {
    pub fn new(steps: PsStepSequence) -> Self {
        Self::with_executor(steps, PsExecutor::new())
    }

    pub fn with_executor(steps: PsStepSequence, executor: PsExecutor) -> Self {
        let context = executor.new_context();
        Self {
            executor,
            steps,
            breakpoints: BTreeSet::new(),
            position: 0,
            context,
            reports: Vec::new(),
            error: None,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn break_on(mut self, command: &str) -> Self {
        self.add_breakpoint(command);
        self
    }

    pub fn add_breakpoint(&mut self, command: &str) {
        self.breakpoints.insert(command.to_string());
    }

    pub fn remove_breakpoint(&mut self, command: &str) -> bool {
        self.breakpoints.remove(command)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &str> {
        self.breakpoints.iter().map(String::as_str)
    }

    pub fn context(&self) -> &PsContext {
        &self.context
    }

    /// Index of the next step to run.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn next_step(&self) -> Option<&PsStep> {
        if self.error.is_some() {
            return None;
        }
        self.steps.get(self.position)
    }

    pub fn reports(&self) -> &[PsStepReport] {
        &self.reports
    }

    pub fn error(&self) -> Option<&PsError> {
        self.error.as_ref()
    }

    /// True once every step ran or one of them failed.
    pub fn is_finished(&self) -> bool {
        self.next_step().is_none()
    }

    /// Runs the next step. `Ok(None)` once the sequence is exhausted; a
    /// failing step is returned as the error and halts the debugger.
    pub fn step(&mut self) -> Result<Option<PsStepReport>> {
        let Some(step) = self.next_step().cloned() else {
            return Ok(None);
        };

        let clock = Instant::now();
        let (report, outcome) = self.executor.run_step(&step, &mut self.context);
        self.elapsed += clock.elapsed();
        self.reports.push(report.clone());
        self.position += 1;

        match outcome {
            Ok(()) => Ok(Some(report)),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Runs steps until the next one is a breakpoint, returning that step.
    /// The step the debugger is currently paused on always runs, so repeated
    /// calls advance from one breakpoint to the next.
    pub fn run_to_breakpoint(&mut self) -> Result<Option<&PsStep>> {
        let mut first = true;
        loop {
            let paused = match self.next_step() {
                None => return Ok(None),
                Some(step) => !first && self.breakpoints.contains(&step.name),
            };
            if paused {
                log::debug!("paused before step {} ('{}')", self.position, self.steps[self.position].name);
                return Ok(self.next_step());
            }
            first = false;
            self.step()?;
        }
    }

    /// Runs whatever remains and produces the run result.
    pub fn finish(mut self) -> PsRunResult {
        while !self.is_finished() {
            if self.step().is_err() {
                break;
            }
        }
        PsRunResult {
            success: self.error.is_none(),
            duration: self.elapsed,
            started_at: self.started_at,
            context: self.context,
            error: self.error,
            steps: self.reports,
        }
    }
}
