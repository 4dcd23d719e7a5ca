//! # casebase Schema
//!
//! Feature schema and encoding for case-based retrieval over tabular records.
//!
//! ## Overview
//!
//! A [`FeatureSchema`] declares numeric attributes, categorical attributes and
//! the outcome attribute. [`FeatureEncoder::fit`] freezes per-attribute
//! statistics ([`EncodingStats`]) from the corpus; [`FeatureEncoder::encode`]
//! then maps corpus cases and later queries to vectors with identical layout.
//!
//! ```rust
//! use casebase_schema::{FeatureSchema, FeatureEncoder};
//! use serde_json::json;
//!
//! let schema = FeatureSchema::new(["Mileage"], ["Manufacturer"], "Price");
//! let rows = vec![
//!     json!({"Mileage": 30000, "Manufacturer": "Ford", "Price": 8000}),
//!     json!({"Mileage": 20000, "Manufacturer": "BMW", "Price": 15000}),
//! ];
//! let corpus = schema
//!     .build_corpus(rows.into_iter().filter_map(|r| r.as_object().cloned()))
//!     .unwrap();
//!
//! let encoder = FeatureEncoder::new(schema);
//! let stats = encoder.fit(&corpus).unwrap();
//! let vector = encoder.encode(&corpus.cases()[0].features, &stats);
//! assert_eq!(vector.as_slice(), &[1.0, 0.0, 1.0]);
//! ```

pub mod encoder;
pub mod schema;

pub use encoder::{EncodingStats, FeatureEncoder, NumericRange, Vocabulary};
pub use schema::{coerce_category, coerce_number, FeatureSchema};
