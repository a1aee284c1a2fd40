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

//! Command-line runner for PipelineScript files.
//!
//! Usage: `pipelinescript [--config FILE] [--log-level LEVEL] <run|check|show|tokens> <script>`

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pipelinescript::dsl::tokenize;
use pipelinescript::{PsCompiler, PsConfig, PsVisualFormat, PsVisualizer};

#[derive(Parser, Debug)]
#[command(name = "pipelinescript", version = pipelinescript::VERSION)]
#[command(about = "Run PipelineScript machine-learning workflows")]
struct Args {
    /// JSON or YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a script and report the outcome
    Run {
        script: PathBuf,
        /// Print the full run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse and compile a script without executing it
    Check { script: PathBuf },
    /// Render the parsed program
    Show {
        script: PathBuf,
        #[arg(long, default_value = "ascii")]
        format: PsVisualFormat,
    },
    /// Print the token stream
    Tokens { script: PathBuf },
}

fn main() {
    let args = Args::parse();
    match dispatch(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("error: {:#}", err);
            process::exit(2);
        }
    }
}

fn dispatch(args: Args) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => PsConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => PsConfig::default(),
    };
    if let Some(level) = &args.log_level {
        config = config.log_level(level);
    }
    config.validate()?;
    init_logging(&config);

    match args.command {
        Command::Run { script, json } => {
            let source = read_script(&script)?;
            let result = pipelinescript::run_with_config(&source, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&result.summary())?);
            } else {
                for line in &result.context.log {
                    println!("{line}");
                }
                match &result.error {
                    None => println!("ok ({:.2}s)", result.duration_secs()),
                    Some(err) => println!("failed: {err}"),
                }
            }
            Ok(result.success)
        }
        Command::Check { script } => {
            let source = read_script(&script)?;
            let program = pipelinescript::parse(&source)?;
            let steps = PsCompiler::new().with_config(config.clone()).compile(&program)?;
            for step in &steps {
                println!("{:>4}  {}", step.line, step.describe());
            }
            println!("{} step(s) ok", steps.len());
            Ok(true)
        }
        Command::Show { script, format } => {
            let source = read_script(&script)?;
            let program = pipelinescript::parse(&source)?;
            println!("{}", PsVisualizer::new(format).render(&program));
            Ok(true)
        }
        Command::Tokens { script } => {
            let source = read_script(&script)?;
            for token in tokenize(&source) {
                println!(
                    "{:>4}:{:<3} {:<12} {}",
                    token.position.line,
                    token.position.column,
                    token.kind.as_str(),
                    token.value
                );
            }
            Ok(true)
        }
    }
}

fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))
}

fn init_logging(config: &PsConfig) {
    let env = env_logger::Env::default().default_filter_or(config.log_level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();
    log::debug!("pipelinescript {} (seed {})", pipelinescript::VERSION, config.seed);
}
