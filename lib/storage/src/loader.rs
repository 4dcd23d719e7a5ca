//! Corpus loader
//!
//! Reads a JSON table in either layout:
//!
//! ```text
//! rows:    [ {"Model": "Focus", "Price": 11000}, ... ]
//! columns: { "Model": ["Focus", ...], "Price": [11000, ...] }
//! ```
//!
//! Column names and string cells are trimmed. Rows missing any declared
//! column that the table does carry are dropped. A declared column absent
//! from the whole table is left for the schema to reject.

use casebase_core::{ConfigError, Record};
use casebase_schema::FeatureSchema;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CorpusLoader {
    columns: Vec<String>,
}

impl CorpusLoader {
    pub fn new(schema: &FeatureSchema) -> Self {
        Self {
            columns: schema.column_names().map(str::to_string).collect(),
        }
    }

    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Record>, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", path.display(), e)))?;
        let records = self.load_str(&text)?;
        info!("Loaded {} cases from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn load_str(&self, text: &str) -> Result<Vec<Record>, ConfigError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::Unreadable(e.to_string()))?;
        self.load_value(value)
    }

    pub fn load_value(&self, value: Value) -> Result<Vec<Record>, ConfigError> {
        let rows = match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(ConfigError::Unreadable(format!("row {} is not an object: {}", i, other))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Value::Object(columns) => transpose(columns)?,
            other => {
                return Err(ConfigError::Unreadable(format!(
                    "expected an array of rows or an object of columns, found {}",
                    kind(&other)
                )))
            }
        };

        Ok(self.clean(rows))
    }

    fn clean(&self, rows: Vec<Record>) -> Vec<Record> {
        let rows: Vec<Record> = rows.into_iter().map(clean_row).collect();

        let present: HashSet<&str> = rows.iter().flat_map(|r| r.keys().map(String::as_str)).collect();
        let required: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| present.contains(c))
            .collect();

        let total = rows.len();
        let kept: Vec<Record> = rows
            .into_iter()
            .filter(|row| required.iter().all(|c| !is_missing(row.get(*c))))
            .collect();

        if kept.len() < total {
            warn!("Dropped {} of {} rows with missing values", total - kept.len(), total);
        }
        kept
    }
}

fn transpose(columns: serde_json::Map<String, Value>) -> Result<Vec<Record>, ConfigError> {
    let mut height = None;
    let mut table = Vec::with_capacity(columns.len());

    for (name, cells) in columns {
        let cells = match cells {
            Value::Array(cells) => cells,
            other => {
                return Err(ConfigError::Unreadable(format!(
                    "column '{}' is not an array: {}",
                    name,
                    kind(&other)
                )))
            }
        };
        match height {
            None => height = Some(cells.len()),
            Some(h) if h != cells.len() => {
                return Err(ConfigError::Unreadable(format!(
                    "column '{}' has {} cells, expected {}",
                    name,
                    cells.len(),
                    h
                )))
            }
            Some(_) => {}
        }
        table.push((name, cells));
    }

    let mut rows = vec![Record::new(); height.unwrap_or(0)];
    for (name, cells) in table {
        for (row, cell) in rows.iter_mut().zip(cells) {
            row.insert(name.clone(), cell);
        }
    }
    Ok(rows)
}

fn clean_row(row: Record) -> Record {
    row.into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            };
            (name.trim().to_string(), value)
        })
        .collect()
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
