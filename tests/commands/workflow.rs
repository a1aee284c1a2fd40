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

use serde_json::json;

use pipelinescript::{run, PsConfig, PsDataset, PsError, PsIO, PsReadiness, PsRunResult};

const GAPS: &str = "x,color,y\n1,red,a\nNA,blue,b\n2,NA,a\n9,red,b\n";

fn run_on(path: &Path, body: &str) -> PsRunResult {
    run(&format!("load \"{}\"\n{}", path.display(), body))
}

fn dataset(result: &PsRunResult) -> &PsDataset {
    result.context.dataset.as_ref().expect("dataset")
}

fn column(ds: &PsDataset, name: &str) -> Vec<serde_json::Value> {
    let index = ds.column_index(name).expect("column");
    ds.column(index).cloned().collect()
}

fn precondition(result: PsRunResult) -> String {
    match result.error.as_ref().map(PsError::root_cause) {
        Some(PsError::Precondition { requires, .. }) => requires.clone(),
        other => panic!("expected a precondition failure, got {other:?}"),
    }
}

#[test]
fn clean_missing_drops_incomplete_rows() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "gaps.csv", GAPS);

    let result = run_on(&path, "clean missing");
    assert!(result.success, "{:?}", result.error);
    assert_eq!(dataset(&result).n_rows(), 2);
    assert_eq!(dataset(&result).missing_count(), 0);
    assert_eq!(result.context.transforms, vec!["clean missing"]);
}

#[test]
fn imputation_strategies_fill_in_place() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "gaps.csv", GAPS);

    let mean = run_on(&path, "clean mean");
    assert!(mean.success, "{:?}", mean.error);
    assert_eq!(column(dataset(&mean), "x")[1], json!(4.0));
    assert_eq!(column(dataset(&mean), "color")[2], json!("red"));
    assert!(mean.context.log[1].starts_with("Imputed 2 missing cell(s) using mean"));

    let median = run_on(&path, "clean median");
    assert_eq!(column(dataset(&median), "x")[1], json!(2.0));

    let mode = run_on(&path, "clean mode");
    assert_eq!(column(dataset(&mode), "x")[1], json!(1.0));
    assert_eq!(dataset(&mode).n_rows(), 4);
}

#[test]
fn duplicates_keep_the_first_occurrence() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "dups.csv", "a,b\n1,x\n2,y\n1,x\n1,z\n2,y\n");

    let result = run_on(&path, "clean duplicates");
    assert!(result.success);
    assert_eq!(dataset(&result).n_rows(), 3);
    assert_eq!(column(dataset(&result), "b"), vec![json!("x"), json!("y"), json!("z")]);
    assert!(result.context.log[1].contains("Removed 2 duplicate row(s)"));
}

#[test]
fn label_encoding_is_recorded_and_onehot_expands_columns() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "gaps.csv", GAPS);

    let label = run_on(&path, "clean missing\nencode");
    assert!(label.success);
    assert_eq!(label.context.encodings["color"], vec!["red"]);
    assert_eq!(label.context.encodings["y"], vec!["a", "b"]);
    assert_eq!(column(dataset(&label), "y"), vec![json!(0), json!(1)]);

    let onehot = run_on(&path, "clean missing\nencode color --method onehot");
    assert!(onehot.success);
    assert_eq!(dataset(&onehot).columns(), &["x", "color_red", "y"]);
    assert!(onehot.context.encodings.is_empty());
}

#[test]
fn encoding_an_encoded_column_keeps_its_names() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut csv = String::from("x,label\n");
    for i in 0..24 {
        csv.push_str(&format!("{:.1},c{:02}\n", i as f64 + 0.5, i % 12));
    }
    let path = support::write_file(dir.path(), "levels.csv", &csv);

    let result = run_on(&path, "encode\nencode label\nsplit 100/0 --target label\ntrain knn --k 1");
    assert!(result.success, "{:?}", result.error);

    let names: Vec<String> = (0..12).map(|i| format!("c{i:02}")).collect();
    assert_eq!(result.context.encodings["label"], names);
    assert_eq!(result.context.model.as_ref().expect("model").classes, names);
}

#[test]
fn encode_rejects_unknown_columns() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "gaps.csv", GAPS);

    let result = run_on(&path, "encode shade");
    assert!(!result.success);
    assert_eq!(result.error.as_ref().map(|e| e.root_cause().kind()), Some("schema"));
    assert!(result.error.expect("error").to_string().contains("shade"));
}

#[test]
fn scaling_skips_label_encoded_and_excluded_columns() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let result = run_on(&path, "clean missing\nencode\nscale standard --exclude petal_length");
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.context.log[3], "Scaled 2 column(s) with standard: sepal_length, sepal_width");

    let ds = dataset(&result);
    let scaled = ds.column_stats(ds.column_index("sepal_length").expect("column"));
    assert!(scaled.mean.abs() < 1e-9);
    let untouched = ds.column_stats(ds.column_index("petal_length").expect("column"));
    assert!(untouched.min >= 1.0);

    let minmax = run_on(&path, "clean missing\nscale minmax petal_length");
    let ds = dataset(&minmax);
    let stats = ds.column_stats(ds.column_index("petal_length").expect("column"));
    assert!(stats.min.abs() < 1e-9 && (stats.max - 1.0).abs() < 1e-9);
}

#[test]
fn scaling_leaves_a_numeric_label_intact() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let mut csv = String::from("a,b,label\n");
    for i in 0..20 {
        let class = i % 2;
        csv.push_str(&format!("{:.2},{:.2},{}\n", 1.0 + 3.0 * class as f64 + i as f64 * 0.01, 0.5 + (i % 3) as f64 * 0.1, class));
    }
    let path = support::write_file(dir.path(), "binary.csv", &csv);

    let result = run_on(&path, "scale standard\nsplit 80/20 --target label\ntrain knn --k 3\nevaluate");
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.context.log[1], "Scaled 2 column(s) with standard: a, b");
    assert_eq!(result.context.model.as_ref().expect("model").classes, vec!["0", "1"]);
}

#[test]
fn scaling_a_categorical_column_asks_for_encode() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let result = run_on(&path, "scale standard habitat");
    assert!(!result.success);
    assert!(result.error.expect("error").to_string().contains("encode"));
}

#[test]
fn drop_and_select_reshape_columns() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let dropped = run_on(&path, "drop habitat,sepal_width");
    assert_eq!(dataset(&dropped).columns(), &["sepal_length", "petal_length", "species"]);

    let selected = run_on(&path, "select species petal_length");
    assert_eq!(dataset(&selected).columns(), &["species", "petal_length"]);

    let missing = run_on(&path, "drop nothing_here");
    assert!(!missing.success);
}

#[test]
fn every_algorithm_learns_the_fixture() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    for (spelling, name) in [
        ("decision_tree --max_depth 4", "decision_tree"),
        ("random_forest --trees 10", "random_forest"),
        ("xgboost --trees 20", "boosting"),
        ("knn --k 3", "knn"),
        ("logistic_regression --iterations 400", "logistic_regression"),
        ("naive_bayes", "naive_bayes"),
    ] {
        let script = format!("clean missing\nencode\nscale standard\nsplit 75/25 --target species\ntrain {spelling}\nevaluate");
        let result = run_on(&path, &script);
        assert!(result.success, "{spelling}: {:?}", result.error);

        let model = result.context.model.as_ref().expect("model");
        assert_eq!(model.algorithm, name);
        let accuracy = result.context.metric("accuracy").expect("accuracy");
        assert!(accuracy > 0.7, "{spelling}: accuracy {accuracy}");
        assert!(result.context.log[6].starts_with(&format!("Evaluated {name} on 15 rows")));
    }
}

#[test]
fn training_needs_numeric_features() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let result = run_on(&path, "clean missing\nsplit 80/20 --target species\ntrain knn");
    assert!(!result.success);
    let message = result.error.expect("error").to_string();
    assert!(message.contains("habitat"), "{message}");
    assert!(message.contains("encode"), "{message}");
}

#[test]
fn target_can_come_from_train() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let without = run_on(&path, "clean missing\nencode\nsplit 80/20\ntrain knn");
    assert_eq!(precondition(without), "target");

    let with = run_on(&path, "clean missing\nencode\nsplit 80/20\ntrain knn --target species\nevaluate");
    assert!(with.success, "{:?}", with.error);
    assert_eq!(with.context.target.as_deref(), Some("species"));
}

#[test]
fn readiness_is_enforced_for_each_rung() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    assert_eq!(precondition(run("clean missing")), "dataset");
    assert_eq!(precondition(run_on(&path, "evaluate")), "model");
    assert_eq!(precondition(run_on(&path, "save model.json")), "model");
    assert_eq!(precondition(run_on(&path, "split 100/0 --target species\nencode")), "unsplit dataset");
}

#[test]
fn evaluate_needs_held_out_rows() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let result = run_on(&path, "clean missing\nencode\nsplit 100/0 --target species\ntrain naive_bayes\nevaluate");
    assert!(!result.success);
    assert!(result.context.model.is_some());
    assert_eq!(result.failed_step(), Some("evaluate"));
}

#[test]
fn split_seed_overrides_the_configured_seed() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let a = run_on(&path, "split 50/50 --seed 11");
    let b = run(&format!("load \"{}\"\nsplit 50/50 --seed 11", path.display()));
    let split_a = a.context.split.as_ref().expect("split");
    let split_b = b.context.split.as_ref().expect("split");
    assert_eq!(split_a.seed, 11);
    assert_eq!(split_a.train, split_b.train);
    assert_eq!(split_a.train.n_rows() + split_a.test.n_rows(), 61);
}

#[test]
fn reloading_resets_downstream_state() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let result = run_on(
        &path,
        &format!("encode\nsplit 80/20 --target species\nload \"{}\"", path.display()),
    );
    assert!(result.success);
    assert!(result.context.split.is_none());
    assert!(result.context.target.is_none());
    assert!(result.context.encodings.is_empty());
    assert_eq!(result.context.readiness(), PsReadiness::Loaded);
}

#[test]
fn export_writes_the_prepared_dataset() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let out = dir.path().join("prepared.jsonl");

    let result = run_on(&path, &format!("clean missing\nencode\nexport \"{}\"", out.display()));
    assert!(result.success, "{:?}", result.error);

    let exported = PsIO::load_auto(&out, &PsConfig::default()).expect("reload export");
    assert_eq!(exported.n_rows(), 60);
    assert!(exported.categorical_columns().is_empty());
}
