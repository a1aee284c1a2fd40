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

use pipelinescript::{
    compile, parse, PsBackends, PsCommand, PsCommandInput, PsCommandSpec, PsCompiler, PsConfig, PsContext,
    PsError, PsExecutor, PsOptionSpec,
};

fn validation_message(source: &str) -> String {
    let program = parse(source).expect("parse");
    match compile(&program).unwrap_err() {
        PsError::Validation { message, .. } => message,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn compile_preserves_length_and_order() {
    let program = parse(
        "load iris.csv\nclean missing\nencode\nscale standard\nsplit 80/20 --target species\ntrain knn --k 3\nevaluate\nexport out.csv\nsave model.json",
    )
    .expect("parse");
    let steps = compile(&program).expect("compile");
    assert_eq!(steps.len(), program.len());
    assert_eq!(steps.names(), program.commands());
    assert_eq!(steps[4].options["target"], "species");
    assert_eq!(steps[4].line, 5);
}

#[test]
fn unknown_command_aborts_the_whole_program() {
    let program = parse("load a.csv\ninvalid_command\nevaluate").expect("parse");
    let err = compile(&program).unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("invalid_command"));
}

#[test]
fn algorithm_aliases_compile() {
    for algorithm in ["xgboost", "random_forest", "decision_tree", "knn", "logistic_regression", "naive_bayes"] {
        let program = parse(&format!("train {algorithm}")).expect("parse");
        let steps = compile(&program).unwrap_or_else(|e| panic!("{algorithm}: {e}"));
        assert_eq!(steps[0].name, "train");
    }
}

#[test]
fn arity_is_checked() {
    assert!(validation_message("load").contains("at least 1"));
    assert!(validation_message("load a.csv b.csv").contains("at most 1"));
    assert!(validation_message("evaluate now").contains("at most 0"));
    assert!(validation_message("split").contains("usage"));
}

#[test]
fn argument_and_option_values_are_validated() {
    assert!(validation_message("split 70/20").contains("sum"));
    assert!(validation_message("split eighty").contains("80/20"));
    assert!(validation_message("clean sometimes").contains("unknown strategy"));
    assert!(validation_message("scale cubic").contains("unknown method"));
    assert!(validation_message("encode --method hash").contains("unknown method"));
    assert!(validation_message("train telepathy").contains("unknown algorithm"));
    assert!(validation_message("train knn --k three").contains("--k"));
    assert!(validation_message("train knn --k 0").contains("at least 1"));
    assert!(validation_message("train knn --trees 5").contains("does not apply"));
    assert!(validation_message("train logistic_regression --learning_rate -1").contains("learning_rate"));
    assert!(validation_message("split 80/20 --seed -4").contains("--seed"));
}

#[test]
fn ratio_forms_are_accepted() {
    for ratio in ["80/20", "0.7/0.3", "100/0", "66.5/33.5"] {
        let program = parse(&format!("split {ratio}")).expect("parse");
        assert!(compile(&program).is_ok(), "{ratio}");
    }
}

#[test]
fn strictness_controls_unknown_options() {
    let program = parse("evaluate --verbose yes").expect("parse");
    assert!(validation_message("evaluate --verbose yes").contains("allowed: none"));

    let lenient = PsCompiler::new().with_config(PsConfig::default().strict_options(false));
    let steps = lenient.compile(&program).expect("lenient compile");
    assert!(steps[0].options.is_empty());
}

#[test]
fn compile_is_idempotent() {
    let program = parse("load a.csv\nencode color --method onehot\nsplit 75/25 --target y --seed 3").expect("parse");
    let first = compile(&program).expect("first");
    let second = compile(&program).expect("second");
    assert_eq!(first, second);
    assert_eq!(first[1].describe(), second[1].describe());
}

#[derive(Debug)]
struct Stamp {
    label: String,
}

impl PsCommand for Stamp {
    fn name(&self) -> &'static str {
        "stamp"
    }

    fn execute(&self, ctx: &mut PsContext, _backends: &PsBackends) -> pipelinescript::Result<String> {
        ctx.transforms.push(self.label.clone());
        Ok(format!("stamped {}", self.label))
    }
}

fn stamp_factory(input: &PsCommandInput<'_>) -> pipelinescript::Result<Box<dyn PsCommand>> {
    let label = input.option("label").unwrap_or("default").to_string();
    Ok(Box::new(Stamp { label }))
}

#[test]
fn registry_accepts_custom_commands() {
    let mut compiler = PsCompiler::new();
    compiler.registry_mut().register(
        PsCommandSpec::new("stamp", "stamp [--label text]", stamp_factory).option(PsOptionSpec::text("label")),
    );
    assert!(compiler.registry().contains("stamp"));

    let program = parse("stamp --label first\nstamp").expect("parse");
    let steps = compiler.compile(&program).expect("compile");
    let result = PsExecutor::new().execute(&steps);
    assert!(result.success);
    assert_eq!(result.context.log, vec!["stamped first", "stamped default"]);
    assert_eq!(result.context.transforms, vec!["first", "default"]);

    assert!(compile(&program).is_err());
}
