//! # casebase Similarity
//!
//! Case-based retrieval over tabular records.
//!
//! Given a corpus of historical cases with a known outcome and a new query
//! lacking it, find the k most similar cases and estimate the outcome.
//!
//! ## Example
//!
//! ```rust
//! use casebase_similarity::{CaseBase, RetrieverConfig};
//! use casebase_schema::FeatureSchema;
//! use serde_json::json;
//!
//! let rows = vec![
//!     json!({"Manufacturer": "Ford", "Model": "Fiesta", "Fuel type": "Petrol",
//!            "Engine size": 1.0, "Year of manufacture": 2017, "Mileage": 30000, "Price": 8000}),
//!     json!({"Manufacturer": "Ford", "Model": "Focus", "Fuel type": "Diesel",
//!            "Engine size": 1.6, "Year of manufacture": 2018, "Mileage": 20000, "Price": 11000}),
//! ];
//! let base = CaseBase::from_records(
//!     FeatureSchema::car_sales(),
//!     rows.into_iter().filter_map(|r| r.as_object().cloned()),
//!     RetrieverConfig::default(),
//! )
//! .unwrap();
//!
//! let query = json!({"Manufacturer": "Ford", "Model": "Fiesta", "Fuel type": "Petrol",
//!                    "Engine size": 1.0, "Year of manufacture": 2017, "Mileage": 30000});
//! let retrieval = base.retrieve(query.as_object().unwrap(), Some(1)).unwrap();
//! assert_eq!(retrieval.cases[0].distance, 0.0);
//! assert_eq!(retrieval.estimate.value(), Some(8000.0));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Corpus    │────>│   Encoder   │────>│    Index    │
//! │   (cases)   │     │ (fit stats) │     │  (matrix)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!          query ─────>│  Retriever  │<──────────┘
//!                      │ filter→rank │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  Estimate   │
//!                      │   (mean)    │
//!                      └─────────────┘
//! ```

pub mod engine;
pub mod estimate;
pub mod explain;
pub mod index;
pub mod options;
pub mod retriever;

pub use engine::{CaseBase, RankedCase, Retrieval};
pub use estimate::{Estimate, EstimateAggregator};
pub use explain::{ExplainedCase, RetrievalResponse, RetrievalStats};
pub use index::{Candidates, SimilarityIndex};
pub use retriever::{rank, Neighbor, Ranking, Retriever, RetrieverConfig};
