//! # casebase Core
//!
//! Core types for the casebase case-based-reasoning engine.
//!
//! - [`Case`] / [`Corpus`] - historical records with a known outcome
//! - [`Features`] - validated attribute values in schema order
//! - [`Vector`] - encoded feature vector with Euclidean distance
//! - [`CaseFilter`] - exact-match predicates applied before ranking
//! - [`ConfigError`] / [`ValidationError`] - fit-time and per-request failures

pub mod case;
pub mod error;
pub mod filter;
pub mod vector;

pub use case::{AttributeSlot, Case, CaseId, Corpus, Features, Record};
pub use error::{ConfigError, Error, Result, ValidationError};
pub use filter::{CaseFilter, Filter, FilterCondition};
pub use vector::Vector;
