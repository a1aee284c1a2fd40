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

use pipelinescript::{compile, parse, quick_classification, PsConfig, PsPipeline, PsSyntaxNode, PsVisualFormat, PsVisualizer};

#[test]
fn chained_calls_render_one_line_each() {
    let pipeline = PsPipeline::new()
        .load("data.csv")
        .clean_missing()
        .encode()
        .split(0.8);

    let script = pipeline.get_script();
    assert_eq!(script, "load data.csv\nclean missing\nencode\nsplit 80/20");
    assert_eq!(script.split('\n').count(), 4);
    assert!(!script.ends_with('\n'));
}

#[test]
fn split_with_target_renders_the_option() {
    let script = PsPipeline::new().split_with_target(0.7, "species").get_script();
    assert_eq!(script, "split 70/30 --target species");
}

#[test]
fn rendered_script_parses_to_the_built_program() {
    let pipeline = PsPipeline::new()
        .load("my data/iris.csv")
        .drop_duplicates()
        .clean("median")
        .encode_columns(["habitat"])
        .encode_onehot(["color", "shape"])
        .scale("minmax")
        .drop(["id"])
        .select(["a", "b", "species"])
        .split_with_target(0.75, "species")
        .train_with("boosting", [("trees", "30"), ("learning_rate", "0.5")])
        .evaluate()
        .export("out/prepared.csv")
        .save("out/model.json")
        .step(PsSyntaxNode::new("evaluate"));

    let reparsed = parse(&pipeline.get_script()).expect("parse");
    assert_eq!(&reparsed, pipeline.program());
    assert_eq!(reparsed.len(), pipeline.len());
    assert_eq!(reparsed[0].args, vec!["my data/iris.csv"]);
    assert_eq!(reparsed[4].options["method"], "onehot");
}

#[test]
fn builder_and_parser_compile_to_equal_steps() {
    let pipeline = PsPipeline::new()
        .load("iris.csv")
        .clean_missing()
        .split_with_target(0.8, "species")
        .train("random_forest")
        .evaluate();
    let text = "load iris.csv\nclean missing\nsplit 80/20 --target species\ntrain random_forest\nevaluate";

    let from_builder = pipeline.compile().expect("compile builder");
    let from_text = compile(&parse(text).expect("parse")).expect("compile text");
    assert_eq!(from_builder, from_text);
}

#[test]
fn builder_runs_end_to_end() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());
    let export = dir.path().join("out").join("prepared.csv");
    let summary = dir.path().join("out").join("model.json");

    let result = PsPipeline::new()
        .load(&path)
        .clean_missing()
        .encode()
        .split_with_target(0.8, "species")
        .train_with("decision_tree", [("max_depth", 5)])
        .evaluate()
        .export(&export)
        .save(&summary)
        .run();

    assert!(result.success, "run failed: {:?}", result.error);
    assert_eq!(result.context.log.len(), 8);
    assert!(export.exists());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).expect("read summary")).expect("json");
    assert_eq!(saved["model"]["algorithm"], "decision_tree");
    assert_eq!(saved["model"]["target"], "species");
    assert!(saved["metrics"]["accuracy"].is_number());
    assert_eq!(saved["encodings"]["species"][0], "setosa");
}

#[test]
fn quick_classification_is_the_canonical_workflow() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let pipeline = quick_classification(&path, "species", "naive_bayes");
    assert_eq!(
        pipeline.program().commands(),
        vec!["load", "clean", "encode", "split", "train", "evaluate"]
    );

    let result = pipeline.with_config(PsConfig::default().seed(3)).run();
    assert!(result.success, "run failed: {:?}", result.error);
    assert_eq!(result.context.log.len(), 6);
    assert_eq!(result.context.seed, 3);
    assert!(result.context.metric("accuracy").is_some());
}

#[test]
fn empty_builder_renders_and_runs_as_nothing() {
    let pipeline = PsPipeline::new();
    assert!(pipeline.is_empty());
    assert_eq!(pipeline.get_script(), "");
    assert_eq!(PsVisualizer::new(PsVisualFormat::Text).render(pipeline.program()), "(empty pipeline)");
    assert!(pipeline.run().success);
}
