//! # casebase
//!
//! A case-based-reasoning retrieval engine for tabular records.
//!
//! Given a corpus of historical cases (numeric and categorical attributes
//! plus a known outcome) and a new query lacking the outcome, casebase finds
//! the k most similar cases and estimates the outcome as their mean.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! casebase --corpus data/car_sales.json serve --http-port 6333
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use casebase::prelude::*;
//! use serde_json::json;
//!
//! let base = casebase::open("data/car_sales.json", FeatureSchema::car_sales(), RetrieverConfig::default())?;
//!
//! let query = json!({
//!     "Manufacturer": "Ford", "Model": "Fiesta", "Fuel type": "Petrol",
//!     "Engine size": 1.0, "Year of manufacture": 2017, "Mileage": 30000
//! });
//! let retrieval = base.retrieve(query.as_object().unwrap(), Some(5))?;
//! println!("{:?}", retrieval.estimate.value());
//! # Ok::<(), casebase::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - `casebase-core` - cases, corpus, vectors, filters, errors
//! - `casebase-schema` - feature schema, encoder, encoding stats
//! - `casebase-similarity` - index, retriever, estimates, ready-state case base
//! - `casebase-storage` - JSON corpus loading and cleanup
//! - `casebase-api` - REST API
//!
//! ## Retrieval
//!
//! 1. **Hard filter**: only cases matching the query's filter attribute
//!    (by default `Manufacturer`) are candidates
//! 2. **Encoding**: min-max normalized numerics followed by one-hot segments,
//!    using statistics frozen at fit time
//! 3. **Ranking**: Euclidean distance, ties broken by corpus order
//! 4. **Estimate**: mean outcome of the top k, absent when nothing matched

use std::path::Path;

// Re-export core types
pub use casebase_core::{
    Case, CaseId, Corpus, Features, Record,
    CaseFilter, Filter, FilterCondition,
    ConfigError, ValidationError, Error, Result,
    Vector,
};

pub use casebase_schema::{EncodingStats, FeatureEncoder, FeatureSchema};

pub use casebase_similarity::{
    CaseBase, Estimate, EstimateAggregator, Neighbor, Retrieval, RetrievalResponse,
    Retriever, RetrieverConfig, SimilarityIndex,
};

// Re-export storage
pub use casebase_storage::CorpusLoader;

// Re-export API
pub use casebase_api::RestApi;

/// Load a JSON corpus from `path` and bring it into the ready state
pub fn open<P: AsRef<Path>>(
    path: P,
    schema: FeatureSchema,
    config: RetrieverConfig,
) -> std::result::Result<CaseBase, ConfigError> {
    let records = CorpusLoader::new(&schema).load_path(path)?;
    CaseBase::from_records(schema, records, config)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Case, CaseId, Corpus, Record,
        ConfigError, ValidationError, Error, Result,
        FeatureSchema, FeatureEncoder, EncodingStats,
        CaseBase, Estimate, Retrieval, RetrieverConfig,
        CorpusLoader, RestApi,
    };
}
