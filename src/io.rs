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

//! # PipelineScript IO Module
//!
//! Dataset loading and export for the `load` and `export` commands.
//!
//! | Extension          | Format                                   |
//! |--------------------|------------------------------------------|
//! | `.csv` (default)   | delimited text with a header row         |
//! | `.tsv`             | tab-delimited text with a header row     |
//! | `.jsonl`, `.ndjson`| one JSON object per line                 |
//! | `.json`            | array of JSON objects                    |
//!
//! With the `compression` feature, a trailing `.gz` or `.zst` is decoded
//! transparently (`iris.csv.gz`). Cells spelled like one of the configured
//! missing markers load as missing.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::backend::PsDataLoader;
use crate::config::PsConfig;
use crate::dataset::{number_cell, PsDataset, PsRow};
use crate::errors::{PsError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsDataFormat {
    Csv { delimiter: u8 },
    Jsonl,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsCompression {
    None,
    Gzip,
    Zstd,
}

/// Static helpers for reading and writing datasets.
pub struct PsIO;

impl PsIO {
    /// Infers format and compression from the file name.
    pub fn detect(path: impl AsRef<Path>, csv_delimiter: u8) -> (PsDataFormat, PsCompression) {
        let name = path
            .as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let (stem, compression) = if let Some(stem) = name.strip_suffix(".gz") {
            (stem.to_string(), PsCompression::Gzip)
        } else if let Some(stem) = name.strip_suffix(".zst") {
            (stem.to_string(), PsCompression::Zstd)
        } else {
            (name, PsCompression::None)
        };

        let extension = Path::new(&stem)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        let format = match extension.as_str() {
            "tsv" | "tab" => PsDataFormat::Csv { delimiter: b'\t' },
            "jsonl" | "ndjson" => PsDataFormat::Jsonl,
            "json" => PsDataFormat::Json,
            _ => PsDataFormat::Csv {
                delimiter: csv_delimiter,
            },
        };
        (format, compression)
    }

    /// Loads a dataset, inferring its layout from the file name.
    pub fn load_auto(path: impl AsRef<Path>, config: &PsConfig) -> Result<PsDataset> {
        let path = path.as_ref();
        let (format, compression) = Self::detect(path, csv_delimiter(config)?);
        let reader = Self::open(path, compression)?;
        let dataset = match format {
            PsDataFormat::Csv { delimiter } => Self::load_csv_reader(reader, delimiter, config),
            PsDataFormat::Jsonl => Self::load_jsonl_reader(BufReader::new(reader), config),
            PsDataFormat::Json => Self::load_json_reader(reader, config),
        }
        .map_err(|err| with_path(path, err))?;

        log::debug!(
            "loaded {} rows x {} columns from {}",
            dataset.n_rows(),
            dataset.n_columns(),
            path.display()
        );
        Ok(dataset)
    }

    fn open(path: &Path, compression: PsCompression) -> Result<Box<dyn Read>> {
        let file = File::open(path).map_err(|e| PsError::Io(format!("{}: {}", path.display(), e)))?;
        match compression {
            PsCompression::None => Ok(Box::new(file)),
            #[cfg(feature = "compression")]
            PsCompression::Gzip => Ok(Box::new(flate2::read::MultiGzDecoder::new(file))),
            #[cfg(feature = "compression")]
            PsCompression::Zstd => Ok(Box::new(zstd::Decoder::new(file)?)),
            #[cfg(not(feature = "compression"))]
            _ => Err(PsError::internal(format!(
                "{}: compressed datasets require the 'compression' feature",
                path.display()
            ))),
        }
    }

    pub fn load_csv_reader<R: Read>(reader: R, delimiter: u8, config: &PsConfig) -> Result<PsDataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(PsError::schema("file has no header row"));
        }
        let mut dataset = PsDataset::from_rows(columns, Vec::new())?;

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|err| PsError::schema(format!("row {}: {}", row_idx + 1, err)))?;
            let row: PsRow = record.iter().map(|cell| parse_cell(cell, config)).collect();
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    pub fn load_jsonl_reader<R: BufRead>(reader: R, config: &PsConfig) -> Result<PsDataset> {
        let mut objects = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line)
                .map_err(|err| PsError::schema(format!("line {}: invalid json ({err})", idx + 1)))?;
            match value {
                Value::Object(map) => objects.push(map),
                other => {
                    return Err(PsError::schema(format!(
                        "line {}: expected a json object, got {other}",
                        idx + 1
                    )))
                }
            }
        }
        objects_to_dataset(objects, config)
    }

    pub fn load_json_reader<R: Read>(reader: R, config: &PsConfig) -> Result<PsDataset> {
        let value: Value = serde_json::from_reader(reader)?;
        let Value::Array(items) = value else {
            return Err(PsError::schema("json dataset must be an array of objects"));
        };
        let objects = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(PsError::schema(format!("item {}: expected an object, got {other}", idx + 1))),
            })
            .collect::<Result<Vec<_>>>()?;
        objects_to_dataset(objects, config)
    }

    /// Writes a dataset, choosing the layout from the file name.
    pub fn write_auto(path: impl AsRef<Path>, dataset: &PsDataset, config: &PsConfig) -> Result<()> {
        let path = path.as_ref();
        let (format, compression) = Self::detect(path, csv_delimiter(config)?);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| with_path(parent, e.into()))?;
        }
        let mut sink = Self::create(path, compression)?;
        match format {
            PsDataFormat::Csv { delimiter } => Self::write_csv_writer(&mut sink, dataset, delimiter),
            PsDataFormat::Jsonl => Self::write_jsonl_writer(&mut sink, dataset),
            PsDataFormat::Json => Self::write_json_writer(&mut sink, dataset),
        }
        .and_then(|()| sink.finish())
        .map_err(|err| with_path(path, err))
    }

    fn create(path: &Path, compression: PsCompression) -> Result<PsSink> {
        let file = File::create(path).map_err(|e| PsError::Io(format!("{}: {}", path.display(), e)))?;
        let file = BufWriter::new(file);
        match compression {
            PsCompression::None => Ok(PsSink::Plain(file)),
            #[cfg(feature = "compression")]
            PsCompression::Gzip => Ok(PsSink::Gzip(flate2::write::GzEncoder::new(
                file,
                flate2::Compression::default(),
            ))),
            #[cfg(feature = "compression")]
            PsCompression::Zstd => Ok(PsSink::Zstd(zstd::Encoder::new(file, 0)?)),
            #[cfg(not(feature = "compression"))]
            _ => Err(PsError::internal(format!(
                "{}: compressed output requires the 'compression' feature",
                path.display()
            ))),
        }
    }

    pub fn write_csv_writer<W: Write>(writer: W, dataset: &PsDataset, delimiter: u8) -> Result<()> {
        let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
        writer.write_record(dataset.columns())?;
        for row in dataset.rows() {
            writer.write_record(row.iter().map(render_cell))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_jsonl_writer<W: Write>(mut writer: W, dataset: &PsDataset) -> Result<()> {
        for row in dataset.rows() {
            serde_json::to_writer(&mut writer, &row_object(dataset, row))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_json_writer<W: Write>(mut writer: W, dataset: &PsDataset) -> Result<()> {
        let items: Vec<Value> = dataset.rows().iter().map(|row| row_object(dataset, row)).collect();
        serde_json::to_writer_pretty(&mut writer, &items)?;
        writer.flush()?;
        Ok(())
    }
}

/// Output file, possibly behind a compressing encoder.
enum PsSink {
    Plain(BufWriter<File>),
    #[cfg(feature = "compression")]
    Gzip(flate2::write::GzEncoder<BufWriter<File>>),
    #[cfg(feature = "compression")]
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl PsSink {
    /// Writes the encoder trailer and flushes the file, reporting any failure.
    fn finish(self) -> Result<()> {
        let mut file = match self {
            PsSink::Plain(file) => file,
            #[cfg(feature = "compression")]
            PsSink::Gzip(encoder) => encoder.finish()?,
            #[cfg(feature = "compression")]
            PsSink::Zstd(encoder) => encoder.finish()?,
        };
        file.flush()?;
        Ok(())
    }
}

impl Write for PsSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            PsSink::Plain(file) => file.write(buf),
            #[cfg(feature = "compression")]
            PsSink::Gzip(encoder) => encoder.write(buf),
            #[cfg(feature = "compression")]
            PsSink::Zstd(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            PsSink::Plain(file) => file.flush(),
            #[cfg(feature = "compression")]
            PsSink::Gzip(encoder) => encoder.flush(),
            #[cfg(feature = "compression")]
            PsSink::Zstd(encoder) => encoder.flush(),
        }
    }
}

/// Default loader backed by [`PsIO`].
#[derive(Clone, Debug, Default)]
pub struct PsFileLoader {
    config: PsConfig,
}

impl PsFileLoader {
    pub fn new(config: PsConfig) -> Self {
        Self { config }
    }
}

impl PsDataLoader for PsFileLoader {
    fn load(&self, path: &Path) -> Result<PsDataset> {
        PsIO::load_auto(path, &self.config)
    }

    fn write(&self, path: &Path, dataset: &PsDataset) -> Result<()> {
        PsIO::write_auto(path, dataset, &self.config)
    }
}

fn csv_delimiter(config: &PsConfig) -> Result<u8> {
    u8::try_from(config.csv_delimiter)
        .map_err(|_| PsError::validation("config", "csv_delimiter must be ASCII"))
}

fn with_path(path: &Path, err: PsError) -> PsError {
    let shown = PathBuf::from(path).display().to_string();
    match err {
        PsError::Io(msg) if msg.starts_with(&shown) => PsError::Io(msg),
        PsError::Io(msg) => PsError::Io(format!("{shown}: {msg}")),
        PsError::Schema { message } => PsError::schema(format!("{shown}: {message}")),
        PsError::Serde(msg) => PsError::schema(format!("{shown}: {msg}")),
        other => other,
    }
}

fn parse_cell(raw: &str, config: &PsConfig) -> Value {
    if config.is_missing_marker(raw) {
        return Value::Null;
    }
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => number_cell(v),
        _ => Value::String(trimmed.to_string()),
    }
}

fn json_cell(value: Value, config: &PsConfig) -> Value {
    match value {
        Value::String(s) if config.is_missing_marker(&s) => Value::Null,
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        other => other,
    }
}

fn objects_to_dataset(objects: Vec<Map<String, Value>>, config: &PsConfig) -> Result<PsDataset> {
    let mut columns: IndexMap<String, ()> = IndexMap::new();
    for object in &objects {
        for key in object.keys() {
            columns.entry(key.clone()).or_insert(());
        }
    }
    let columns: Vec<String> = columns.into_keys().collect();

    let rows = objects
        .into_iter()
        .map(|mut object| {
            columns
                .iter()
                .map(|c| json_cell(object.remove(c).unwrap_or(Value::Null), config))
                .collect()
        })
        .collect();
    PsDataset::from_rows(columns, rows)
}

fn render_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn row_object(dataset: &PsDataset, row: &PsRow) -> Value {
    let map: Map<String, Value> = dataset
        .columns()
        .iter()
        .cloned()
        .zip(row.iter().cloned())
        .collect();
    Value::Object(map)
}
