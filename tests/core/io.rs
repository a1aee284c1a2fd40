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

use std::io::Write;

use serde_json::json;
use tempfile::NamedTempFile;

use pipelinescript::{PsConfig, PsDataFormat, PsDataLoader, PsDataset, PsFileLoader, PsIO};

fn small() -> PsDataset {
    PsDataset::from_rows(
        vec!["x".into(), "label".into()],
        vec![
            vec![json!(1.5), json!("a")],
            vec![json!(null), json!("b b")],
            vec![json!(3.0), json!(null)],
        ],
    )
    .expect("dataset")
}

#[test]
fn csv_fixture_loads_with_types_and_missing_cells() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_iris(dir.path());

    let ds = PsIO::load_auto(&path, &PsConfig::default()).expect("load");
    assert_eq!(ds.n_rows(), 3 * support::PER_CLASS + 1);
    assert_eq!(ds.columns()[4], "species");
    assert_eq!(ds.missing_count(), 1);
    assert_eq!(ds.categorical_columns(), vec!["habitat", "species"]);
    assert_eq!(ds.numeric_columns(), vec!["sepal_length", "sepal_width", "petal_length"]);
}

#[test]
fn custom_delimiter_and_markers_come_from_config() {
    let mut file = NamedTempFile::new().expect("tmp");
    file.write_all(b"a;b\n1;-\n2;x\n").expect("write");
    file.flush().expect("flush");

    let config = PsConfig::default().csv_delimiter(';').missing_markers(["-"]);
    let ds = PsIO::load_auto(file.path(), &config).expect("load");
    assert_eq!(ds.columns(), &["a", "b"]);
    assert!(ds.rows()[0][1].is_null());
    assert_eq!(ds.rows()[1][1], json!("x"));
}

#[test]
fn ragged_csv_is_a_schema_error_naming_the_file() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "ragged.csv", "a,b\n1,2\n3\n");
    let err = PsIO::load_auto(&path, &PsConfig::default()).unwrap_err();
    assert_eq!(err.kind(), "schema");
    assert!(err.to_string().contains("ragged.csv"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = PsFileLoader::default().load(&dir.path().join("nope.csv")).unwrap_err();
    assert_eq!(err.kind(), "io");
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn every_format_survives_write_and_reload() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let loader = PsFileLoader::default();
    let original = small();

    for name in ["out.csv", "nested/out.tsv", "out.jsonl", "out.json"] {
        let path = dir.path().join(name);
        loader.write(&path, &original).expect("write");
        let reloaded = loader.load(&path).expect("reload");
        let x = reloaded.column_index("x").expect("x column");
        let label = reloaded.column_index("label").expect("label column");
        assert_eq!(reloaded.n_rows(), 3, "{name}");
        assert_eq!(reloaded.rows()[0][x], json!(1.5), "{name}");
        assert_eq!(reloaded.rows()[1][label], json!("b b"), "{name}");
        assert!(reloaded.rows()[1][x].is_null(), "{name}");
        assert!(reloaded.rows()[2][label].is_null(), "{name}");
    }
}

#[test]
fn json_documents_must_hold_objects() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = support::write_file(dir.path(), "bad.json", "[1, 2]");
    assert_eq!(PsIO::load_auto(&path, &PsConfig::default()).unwrap_err().kind(), "schema");

    let path = support::write_file(dir.path(), "bad.jsonl", "{\"a\": 1}\n[1]\n");
    let err = PsIO::load_auto(&path, &PsConfig::default()).unwrap_err();
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn format_detection_follows_extension() {
    assert_eq!(PsIO::detect("a.ndjson", b',').0, PsDataFormat::Jsonl);
    assert_eq!(PsIO::detect("a.JSON", b',').0, PsDataFormat::Json);
    assert_eq!(PsIO::detect("a.txt", b';').0, PsDataFormat::Csv { delimiter: b';' });
}

#[cfg(feature = "compression")]
#[test]
fn compressed_files_are_transparent() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let loader = PsFileLoader::default();
    for name in ["out.csv.gz", "out.jsonl.zst"] {
        let path = dir.path().join(name);
        loader.write(&path, &small()).expect("write");
        let reloaded = loader.load(&path).expect("reload");
        assert_eq!(reloaded.n_rows(), 3, "{name}");
        assert_eq!(reloaded.n_columns(), 2, "{name}");
        assert_eq!(reloaded.missing_count(), 2, "{name}");
    }
}
