//! Feature Encoder
//!
//! Fits normalization ranges and categorical vocabularies from a corpus once,
//! then turns any features (corpus case or query) into a fixed-length vector:
//!
//! ```text
//! [ numeric (min-max, schema order) | one-hot attr 0 | one-hot attr 1 | ... ]
//! ```
//!
//! Corpus vectors and query vectors must be encoded with the same
//! [`EncodingStats`] value, otherwise their columns do not line up.

use crate::schema::FeatureSchema;
use ahash::AHashMap;
use casebase_core::{ConfigError, Corpus, Features, Record, ValidationError, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Observed range of one numeric attribute
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    /// `(x - min) / (max - min)`; a constant attribute maps to 0.
    ///
    /// Ranges wider than `f64::MAX` are scaled by half first so the span
    /// stays finite.
    #[inline]
    pub fn normalize(&self, x: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }

        let span = self.max - self.min;
        if span.is_finite() {
            (x - self.min) / span
        } else {
            (x / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

/// Frozen, lexicographically ordered set of labels for one attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    values: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sorted: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        let values: Vec<String> = sorted.into_iter().collect();
        let index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();
        Self { values, index }
    }

    /// Column of `value` inside this attribute's one-hot segment
    #[inline]
    pub fn position(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(values: Vec<String>) -> Self {
        Vocabulary::from_values(values)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.values
    }
}

/// Statistics fitted once from the corpus and never updated afterwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingStats {
    /// One range per numeric attribute, schema order
    pub numeric: Vec<NumericRange>,
    /// One vocabulary per categorical attribute, schema order
    pub vocabularies: Vec<Vocabulary>,
}

impl EncodingStats {
    /// Width of every encoded vector
    pub fn dim(&self) -> usize {
        self.numeric.len() + self.vocabularies.iter().map(Vocabulary::len).sum::<usize>()
    }

    /// Human-readable label for each encoded column
    pub fn column_names(&self, schema: &FeatureSchema) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        names.extend(schema.numeric.iter().cloned());
        for (attribute, vocabulary) in schema.categorical.iter().zip(&self.vocabularies) {
            names.extend(vocabulary.values().iter().map(|v| format!("{}={}", attribute, v)));
        }
        names
    }
}

/// Encodes features into vectors according to a schema
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Fit min/max ranges and vocabularies from the corpus.
    ///
    /// Deterministic: the same corpus always yields equal stats.
    pub fn fit(&self, corpus: &Corpus) -> Result<EncodingStats, ConfigError> {
        if corpus.is_empty() {
            return Err(ConfigError::EmptyCorpus);
        }

        let numeric_width = self.schema.numeric.len();
        let categorical_width = self.schema.categorical.len();

        for case in corpus {
            let features = &case.features;
            check_width(case.id.0, &self.schema.numeric, features.numeric().len())?;
            check_width(case.id.0, &self.schema.categorical, features.categorical().len())?;
        }

        let numeric = (0..numeric_width)
            .map(|slot| {
                corpus.iter().map(|c| c.features.numeric()[slot]).fold(
                    NumericRange { min: f64::INFINITY, max: f64::NEG_INFINITY },
                    |range, x| NumericRange { min: range.min.min(x), max: range.max.max(x) },
                )
            })
            .collect();

        let vocabularies = (0..categorical_width)
            .map(|slot| {
                Vocabulary::from_values(
                    corpus.iter().map(|c| c.features.categorical()[slot].as_str()),
                )
            })
            .collect();

        let stats = EncodingStats { numeric, vocabularies };
        debug!("Fitted encoding stats over {} cases, {} columns", corpus.len(), stats.dim());
        Ok(stats)
    }

    /// Encode validated features with frozen stats.
    ///
    /// A label missing from the vocabulary leaves its segment all zero.
    pub fn encode(&self, features: &Features, stats: &EncodingStats) -> Vector {
        debug_assert_eq!(features.numeric().len(), stats.numeric.len());
        debug_assert_eq!(features.categorical().len(), stats.vocabularies.len());

        let mut components = Vec::with_capacity(stats.dim());

        components.extend(
            features
                .numeric()
                .iter()
                .zip(&stats.numeric)
                .map(|(x, range)| range.normalize(*x)),
        );

        for (value, vocabulary) in features.categorical().iter().zip(&stats.vocabularies) {
            let start = components.len();
            components.resize(start + vocabulary.len(), 0.0);
            if let Some(column) = vocabulary.position(value) {
                components[start + column] = 1.0;
            }
        }

        Vector::new(components)
    }

    /// Validate a raw record and encode it
    pub fn encode_record(&self, record: &Record, stats: &EncodingStats) -> Result<Vector, ValidationError> {
        let features = self.schema.parse_query(record)?;
        Ok(self.encode(&features, stats))
    }
}

/// A case must carry exactly one value per declared attribute
fn check_width(case: usize, declared: &[String], found: usize) -> Result<(), ConfigError> {
    match declared.get(found) {
        Some(name) => Err(ConfigError::MissingColumn(name.clone())),
        None if found > declared.len() => Err(ConfigError::UnexpectedWidth {
            case,
            expected: declared.len(),
            found,
        }),
        None => Ok(()),
    }
}
