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

//! Dataset fixtures shared by the integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const SPECIES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Rows per species in [`iris_csv`].
pub const PER_CLASS: usize = 20;

/// Three well separated classes with a categorical feature and exactly one
/// row holding a missing cell (61 rows before cleaning, 60 after).
pub fn iris_csv() -> String {
    let mut out = String::from("sepal_length,sepal_width,petal_length,habitat,species\n");
    for (class, species) in SPECIES.iter().enumerate() {
        for i in 0..PER_CLASS {
            let c = class as f64;
            let sepal_length = 4.0 + 1.5 * c + (i % 5) as f64 * 0.1;
            let sepal_width = 3.5 - 0.5 * c + (i % 4) as f64 * 0.05;
            let petal_length = 1.0 + 2.0 * c + (i % 3) as f64 * 0.1;
            let habitat = if i % 2 == 0 { "meadow" } else { "forest" };
            let _ = writeln!(out, "{sepal_length:.2},{sepal_width:.2},{petal_length:.2},{habitat},{species}");
        }
    }
    out.push_str("5.0,NA,1.4,meadow,setosa\n");
    out
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

pub fn write_iris(dir: &Path) -> PathBuf {
    write_file(dir, "iris.csv", &iris_csv())
}

/// The six-step workflow over `path`.
pub fn happy_script(path: &Path) -> String {
    format!(
        "load \"{}\"\nclean missing\nencode\nsplit 80/20 --target species\ntrain random_forest --trees 15\nevaluate\n",
        path.display()
    )
}
