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

#[path = "../support/mod.rs"]
mod support;

use pipelinescript::{debug, PsReadiness};

#[test]
fn stepping_exposes_the_context_between_steps() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let mut dbg = debug(&support::happy_script(&path)).expect("debugger");

    assert_eq!(dbg.position(), 0);
    assert_eq!(dbg.next_step().map(|s| s.name.as_str()), Some("load"));
    assert_eq!(dbg.context().readiness(), PsReadiness::Empty);

    let report = dbg.step().expect("load runs").expect("a step ran");
    assert_eq!(report.name, "load");
    assert!(report.success);
    assert_eq!(dbg.context().readiness(), PsReadiness::Loaded);
    assert_eq!(dbg.context().log.len(), 1);

    dbg.step().expect("clean runs");
    assert_eq!(dbg.context().dataset.as_ref().map(|d| d.n_rows()), Some(60));
    assert_eq!(dbg.context().readiness(), PsReadiness::Prepared);
}

#[test]
fn breakpoints_pause_before_the_named_command() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let mut dbg = debug(&support::happy_script(&path)).expect("debugger").break_on("train");
    dbg.add_breakpoint("evaluate");

    let paused = dbg.run_to_breakpoint().expect("runs").map(|s| s.name.clone());
    assert_eq!(paused.as_deref(), Some("train"));
    assert_eq!(dbg.position(), 4);
    assert!(dbg.context().split.is_some());
    assert!(dbg.context().model.is_none());

    let paused = dbg.run_to_breakpoint().expect("runs").map(|s| s.name.clone());
    assert_eq!(paused.as_deref(), Some("evaluate"));
    assert!(dbg.context().model.is_some());

    assert!(dbg.run_to_breakpoint().expect("runs").is_none());
    assert!(dbg.is_finished());

    let result = dbg.finish();
    assert!(result.success);
    assert_eq!(result.context.log.len(), 6);
    assert_eq!(result.steps.len(), 6);
}

#[test]
fn finish_matches_a_plain_run() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let script = support::happy_script(&path);

    let stepped = debug(&script).expect("debugger").finish();
    let plain = pipelinescript::run(&script);
    assert_eq!(stepped.context.log, plain.context.log);
    assert_eq!(stepped.context.metric("accuracy"), plain.context.metric("accuracy"));
}

#[test]
fn a_failing_step_halts_the_session() {
    let mut dbg = debug("load missing.csv\nevaluate").expect("debugger");
    let err = dbg.step().unwrap_err();
    assert_eq!(err.step(), Some("load"));
    assert!(dbg.is_finished());
    assert!(dbg.next_step().is_none());
    assert!(dbg.step().expect("no more steps").is_none());

    let result = dbg.finish();
    assert!(!result.success);
    assert_eq!(result.failed_step(), Some("load"));
}

#[test]
fn invalid_scripts_never_produce_a_debugger() {
    assert_eq!(debug("load").unwrap_err().kind(), "validation");
    assert_eq!(debug("split --target").unwrap_err().kind(), "syntax");
}
