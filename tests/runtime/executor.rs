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

use std::path::Path;
use std::sync::Arc;

use pipelinescript::{
    compile, parse, run, run_with_config, PsBackends, PsConfig, PsDataLoader, PsDataset, PsError, PsExecutor,
    PsReadiness,
};

#[test]
fn happy_path_fills_the_context() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let result = run(&support::happy_script(&path));
    assert!(result.success, "run failed: {:?}", result.error);
    assert!(result.error.is_none());
    assert_eq!(result.context.log.len(), 6);
    assert_eq!(result.steps.len(), 6);
    assert!(result.context.log[0].starts_with("Loaded 61 rows x 5 columns"));
    assert!(result.context.log[1].contains("dropped 1 row(s)"));
    assert!(result.context.log[3].starts_with("Split 60 rows into 48 train / 12 test"));

    let model = result.context.model.as_ref().expect("model");
    assert_eq!(model.target, "species");
    assert_eq!(model.classes, vec!["setosa", "versicolor", "virginica"]);
    assert_eq!(model.features.len(), 4);

    let accuracy = result.context.metric("accuracy").expect("accuracy");
    assert!((0.0..=1.0).contains(&accuracy));
    assert!(accuracy > 0.8, "accuracy {accuracy}");
    assert!(result.context.metric("f1").is_some());
    assert_eq!(result.context.metric("test_samples"), Some(12.0));
    assert_eq!(result.context.readiness(), PsReadiness::Evaluated);
}

#[test]
fn runs_are_reproducible_for_a_seed() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let script = support::happy_script(&path);

    let first = run(&script);
    let second = run(&script);
    assert_eq!(first.context.log, second.context.log);
    assert_eq!(first.context.metric("accuracy"), second.context.metric("accuracy"));
}

#[test]
fn missing_file_fails_at_load_and_leaves_no_dataset() {
    let result = run("load nonexistent.csv\nevaluate");
    assert!(!result.success);
    assert!(result.context.dataset.is_none());
    assert!(result.context.log.is_empty());
    assert_eq!(result.steps.len(), 1);

    let err = result.error.expect("error");
    assert_eq!(err.kind(), "execution");
    assert_eq!(err.step(), Some("load"));
    assert_eq!(err.root_cause().kind(), "io");
}

#[test]
fn failure_keeps_prior_mutations() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let script = format!("load \"{}\"\nclean missing\ntrain knn\nevaluate", path.display());

    let result = run(&script);
    assert!(!result.success);
    assert_eq!(result.context.log.len(), 2);
    assert_eq!(result.context.dataset.as_ref().map(PsDataset::n_rows), Some(60));
    assert!(result.context.model.is_none());
    match result.error.expect("error") {
        PsError::Execution { step, line, source } => {
            assert_eq!(step, "train");
            assert_eq!(line, 3);
            assert!(matches!(*source, PsError::Precondition { ref requires, .. } if requires == "split"));
        }
        other => panic!("expected an execution error, got {other:?}"),
    }
}

#[test]
fn transforms_after_split_are_rejected() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let script = format!("load \"{}\"\nsplit 80/20\nclean missing", path.display());

    let result = run(&script);
    assert!(!result.success);
    assert_eq!(result.failed_step(), Some("clean"));
    assert!(result.error.expect("error").to_string().contains("before `split`"));
}

#[test]
fn syntax_and_validation_errors_never_execute() {
    let result = run("load a.csv\nsplit 80/20 --target");
    assert!(!result.success);
    assert_eq!(result.error.as_ref().map(PsError::kind), Some("syntax"));
    assert!(result.steps.is_empty());

    let result = run("load a.csv\ninvalid_command");
    assert_eq!(result.error.as_ref().map(PsError::kind), Some("validation"));
    assert!(result.context.log.is_empty());
}

#[test]
fn comment_only_script_runs_trivially() {
    let result = run("# nothing to do\n\n// still nothing\n");
    assert!(result.success);
    assert!(result.context.log.is_empty());
    assert!(result.context.dataset.is_none());
    assert_eq!(result.context.readiness(), PsReadiness::Empty);
}

#[test]
fn config_seed_drives_split_and_reaches_the_context() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let script = format!("load \"{}\"\nsplit 50/50", path.display());

    let result = run_with_config(&script, &PsConfig::default().seed(7));
    assert!(result.success);
    assert_eq!(result.context.seed, 7);
    assert_eq!(result.context.split.as_ref().map(|s| s.seed), Some(7));
}

#[derive(Debug)]
struct InMemoryLoader;

impl PsDataLoader for InMemoryLoader {
    fn load(&self, _path: &Path) -> pipelinescript::Result<PsDataset> {
        PsDataset::from_rows(vec!["a".into()], vec![vec![serde_json::json!(1)]])
    }

    fn write(&self, _path: &Path, _dataset: &PsDataset) -> pipelinescript::Result<()> {
        Err(PsError::internal("read-only loader"))
    }
}

#[test]
fn backends_can_be_swapped() {
    let steps = compile(&parse("load anything.db\nexport out.csv").expect("parse")).expect("compile");
    let executor = PsExecutor::new().with_backends(PsBackends::default().with_loader(Arc::new(InMemoryLoader)));

    let result = executor.execute(&steps);
    assert!(!result.success);
    assert_eq!(result.context.dataset.as_ref().map(PsDataset::n_rows), Some(1));
    assert_eq!(result.failed_step(), Some("export"));
    assert_eq!(result.error.expect("error").root_cause().kind(), "internal");
}

#[test]
fn summary_reports_steps_and_context() {
    let result = run("load nonexistent.csv");
    let summary = result.summary();
    assert_eq!(summary["success"], false);
    assert_eq!(summary["steps"][0]["name"], "load");
    assert_eq!(summary["steps"][0]["success"], false);
    assert_eq!(summary["context"]["readiness"], "empty");
}
