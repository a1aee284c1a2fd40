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

use proptest::prelude::*;

use pipelinescript::dsl::{PsParser, PsPosition, PsToken, PsTokenKind};
use pipelinescript::{parse, PsError, PsProgram, PsSyntaxNode};

fn syntax_line(err: PsError) -> usize {
    match err {
        PsError::Syntax { line, .. } => line,
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn one_node_per_command_line() {
    let program = parse(
        "# iris workflow\nload iris.csv\n\nclean missing\n// split next\nsplit 80/20 --target species\n",
    )
    .expect("parse");
    assert_eq!(program.len(), 3);
    assert_eq!(program.commands(), vec!["load", "clean", "split"]);
    assert_eq!(program[0].line, 2);
    assert_eq!(program[2].line, 6);
}

#[test]
fn split_line_keeps_ratio_argument_and_target_option() {
    let program = parse("split 80/20 --target species").expect("parse");
    let node = &program[0];
    assert_eq!(node.command, "split");
    assert_eq!(node.args, vec!["80/20"]);
    assert_eq!(node.options.get("target").map(String::as_str), Some("species"));
}

#[test]
fn options_keep_source_order_and_last_duplicate_wins() {
    let program = parse("train random_forest --trees 10 --max_depth=4 --trees 20").expect("parse");
    let keys: Vec<&str> = program[0].options.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["trees", "max_depth"]);
    assert_eq!(program[0].options["trees"], "20");
}

#[test]
fn comment_only_script_is_an_empty_program() {
    let program = parse("# nothing here\n   \n// or here\n").expect("parse");
    assert!(program.is_empty());
}

#[test]
fn option_without_value_is_a_syntax_error() {
    let err = parse("load a.csv\nsplit 80/20 --target").unwrap_err();
    assert_eq!(err.kind(), "syntax");
    assert!(err.to_string().contains("'--target' expects a value"));
    assert_eq!(syntax_line(err), 2);

    let err = parse("train knn --k --seed 3").unwrap_err();
    assert_eq!(syntax_line(err), 1);
}

#[test]
fn line_starting_with_an_option_is_rejected() {
    let err = parse("load a.csv\n--target species").unwrap_err();
    assert!(err.to_string().contains("must start with a command"));
    assert_eq!(syntax_line(err), 2);
}

#[test]
fn malformed_token_streams_are_rejected() {
    let parser = PsParser::new();
    let at = |line, column| PsPosition::new(line, column);

    let orphan_value = vec![
        PsToken::new(PsTokenKind::Command, "split", at(1, 1)),
        PsToken::new(PsTokenKind::OptionValue, "species", at(1, 7)),
        PsToken::new(PsTokenKind::End, "", at(2, 1)),
    ];
    assert!(parser.parse_tokens(&orphan_value).unwrap_err().to_string().contains("no option key"));

    let unterminated = vec![PsToken::new(PsTokenKind::Command, "evaluate", at(1, 1))];
    assert!(parser.parse_tokens(&unterminated).unwrap_err().to_string().contains("END"));

    let trailing = vec![
        PsToken::new(PsTokenKind::End, "", at(1, 1)),
        PsToken::new(PsTokenKind::Command, "evaluate", at(2, 1)),
    ];
    assert_eq!(syntax_line(parser.parse_tokens(&trailing).unwrap_err()), 2);

    let stray_argument = vec![
        PsToken::new(PsTokenKind::Command, "load", at(1, 1)),
        PsToken::new(PsTokenKind::Argument, "a.csv", at(2, 1)),
        PsToken::new(PsTokenKind::End, "", at(3, 1)),
    ];
    assert_eq!(syntax_line(parser.parse_tokens(&stray_argument).unwrap_err()), 2);
}

#[test]
fn parse_file_reads_from_disk() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("flow.ps");
    std::fs::write(&path, "load a.csv\nevaluate\n").expect("write");
    let program = PsParser::new().parse_file(&path).expect("parse file");
    assert_eq!(program.commands(), vec!["load", "evaluate"]);

    let missing = PsParser::new().parse_file(&dir.path().join("absent.ps")).unwrap_err();
    assert_eq!(missing.kind(), "io");
}

#[test]
fn rendered_program_parses_back_equal() {
    let program = PsProgram::new()
        .with_node(PsSyntaxNode::new("load").arg("my data.csv"))
        .with_node(PsSyntaxNode::new("drop").arg("#id").arg("//notes"))
        .with_node(PsSyntaxNode::new("split").arg("80/20").option("target", "--weird"))
        .with_node(PsSyntaxNode::new("save").arg("say \"hi\".json"))
        .with_node(PsSyntaxNode::new("export").arg("it's \"final\".csv"));
    let text = program.render();
    assert_eq!(parse(&text).expect("reparse"), program);
}

fn word() -> impl Strategy<Value = String> {
    r#"[a-zA-Z0-9 _./#="'-]{0,10}"#
}

fn node() -> impl Strategy<Value = PsSyntaxNode> {
    (
        "[a-z][a-z_]{0,8}",
        prop::collection::vec(word(), 0..4),
        prop::collection::vec(("[a-z_][a-z0-9_]{0,6}", word()), 0..3),
    )
        .prop_map(|(command, args, options)| {
            let node = args.into_iter().fold(PsSyntaxNode::new(command), |n, a| n.arg(a));
            options.into_iter().fold(node, |n, (k, v)| n.option(k, v))
        })
}

proptest! {
    #[test]
    fn render_then_parse_is_identity(nodes in prop::collection::vec(node(), 0..6)) {
        let program = PsProgram { nodes };
        let reparsed = parse(&program.render()).expect("rendered program parses");
        prop_assert_eq!(reparsed, program);
    }

    #[test]
    fn node_count_matches_command_lines(commands in prop::collection::vec("[a-z]{1,8}", 0..12)) {
        let source = commands
            .iter()
            .map(|c| format!("{c} x\n# between\n"))
            .collect::<String>();
        let program = parse(&source).expect("parse");
        prop_assert_eq!(program.len(), commands.len());
    }
}
