//! Feature schema definitions
//!
//! Declares which attributes are numeric, which are categorical, and which
//! one is the outcome. The schema is also the single boundary where raw
//! records are checked and turned into typed [`Features`].

use casebase_core::{AttributeSlot, Case, ConfigError, Corpus, Features, Record, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Declared attribute layout, fixed for the lifetime of a case base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSchema {
    /// Schema version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Numeric attribute names, in encoding order
    pub numeric: Vec<String>,

    /// Categorical attribute names, in encoding order
    pub categorical: Vec<String>,

    /// Outcome attribute name
    pub target: String,
}

fn default_version() -> u32 {
    1
}

impl FeatureSchema {
    pub fn new<N, C, T>(numeric: N, categorical: C, target: T) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        T: Into<String>,
    {
        Self {
            version: 1,
            numeric: numeric.into_iter().map(Into::into).collect(),
            categorical: categorical.into_iter().map(Into::into).collect(),
            target: target.into(),
        }
    }

    /// The used-car pricing layout the engine ships with
    pub fn car_sales() -> Self {
        Self::new(
            ["Engine size", "Year of manufacture", "Mileage"],
            ["Manufacturer", "Model", "Fuel type"],
            "Price",
        )
    }

    /// Reject layouts that cannot be encoded unambiguously
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.numeric.is_empty() && self.categorical.is_empty() {
            return Err(ConfigError::EmptySchema);
        }

        let mut seen = HashSet::new();
        for name in self.feature_names() {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyAttributeName);
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateAttribute(name.to_string()));
            }
        }

        if self.target.trim().is_empty() {
            return Err(ConfigError::EmptyAttributeName);
        }
        if seen.contains(self.target.as_str()) {
            return Err(ConfigError::TargetIsFeature(self.target.clone()));
        }

        Ok(())
    }

    /// Feature attribute names: numeric first, then categorical
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
    }

    /// Every declared column, target included
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.feature_names().chain(std::iter::once(self.target.as_str()))
    }

    /// Resolve an attribute name to its position in [`Features`]
    pub fn slot(&self, name: &str) -> Option<AttributeSlot> {
        if let Some(i) = self.numeric.iter().position(|n| n == name) {
            return Some(AttributeSlot::Numeric(i));
        }
        self.categorical
            .iter()
            .position(|n| n == name)
            .map(AttributeSlot::Categorical)
    }

    /// Resolve a categorical attribute name to its slot
    pub fn categorical_slot(&self, name: &str) -> Option<usize> {
        self.categorical.iter().position(|n| n == name)
    }

    /// Check a query record once and convert it to typed features.
    ///
    /// Extra keys (including the target) are ignored.
    pub fn parse_query(&self, record: &Record) -> Result<Features, ValidationError> {
        let numeric = self
            .numeric
            .iter()
            .map(|name| coerce_number(name, require(record, name)?))
            .collect::<Result<Vec<_>, _>>()?;

        let categorical = self
            .categorical
            .iter()
            .map(|name| coerce_category(name, require(record, name)?))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Features::new(numeric, categorical))
    }

    /// Check a corpus row: features plus the outcome
    pub fn parse_row(&self, record: &Record) -> Result<(Features, f64), ValidationError> {
        let features = self.parse_query(record)?;
        let target = coerce_number(&self.target, require(record, &self.target)?)?;
        Ok((features, target))
    }

    /// Build a corpus from raw rows.
    ///
    /// A declared column absent from every row is fatal. Individual rows
    /// with a missing or malformed value are dropped.
    pub fn build_corpus<I>(&self, records: I) -> Result<Corpus, ConfigError>
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().collect();
        if records.is_empty() {
            return Err(ConfigError::EmptyCorpus);
        }

        if let Some(missing) = self
            .column_names()
            .find(|name| !records.iter().any(|r| r.contains_key(*name)))
        {
            return Err(ConfigError::MissingColumn(missing.to_string()));
        }

        let total = records.len();
        let mut rows = Vec::with_capacity(total);
        for (line, record) in records.iter().enumerate() {
            match self.parse_row(record) {
                Ok(row) => rows.push(row),
                Err(e) => debug!("Dropping corpus row {}: {}", line, e),
            }
        }

        if rows.len() < total {
            warn!("Dropped {} of {} corpus rows with missing or invalid values", total - rows.len(), total);
        }
        if rows.is_empty() {
            return Err(ConfigError::EmptyCorpus);
        }

        Ok(Corpus::from_rows(rows))
    }

    /// Render a stored case back into a schema-named record
    pub fn to_record(&self, case: &Case) -> Record {
        let mut record = Record::new();
        for (name, value) in self.numeric.iter().zip(case.features.numeric()) {
            record.insert(name.clone(), number_value(*value));
        }
        for (name, value) in self.categorical.iter().zip(case.features.categorical()) {
            record.insert(name.clone(), Value::String(value.clone()));
        }
        record.insert(self.target.clone(), number_value(case.target));
        record
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::car_sales()
    }
}

fn require<'a>(record: &'a Record, name: &str) -> Result<&'a Value, ValidationError> {
    match record.get(name) {
        Some(Value::Null) | None => Err(ValidationError::MissingAttribute(name.to_string())),
        Some(v) => Ok(v),
    }
}

fn number_value(x: f64) -> Value {
    serde_json::Number::from_f64(x)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Coerce a JSON value to a finite number; numeric strings are accepted
pub fn coerce_number(attribute: &str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(ValidationError::NotNumeric {
            attribute: attribute.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Coerce a JSON scalar to a trimmed category label
pub fn coerce_category(attribute: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ValidationError::NotCategorical {
            attribute: attribute.to_string(),
        }),
    }
}
