//! Ready-state case base
//!
//! [`CaseBase::fit`] runs once at startup: validate schema, fit encoding
//! stats, encode the corpus, resolve the retrieval policy. The result is
//! immutable and can be shared across threads behind an `Arc` without locks.

use crate::estimate::{Estimate, EstimateAggregator};
use crate::explain::{ExplainedCase, RetrievalResponse, RetrievalStats};
use crate::index::SimilarityIndex;
use crate::options::distinct_values;
use crate::retriever::{Neighbor, Retriever, RetrieverConfig};
use casebase_core::{Case, CaseId, ConfigError, Corpus, Record, ValidationError};
use casebase_schema::{EncodingStats, FeatureEncoder, FeatureSchema};
use serde_json::Value;
use tracing::info;

/// A retrieved case with its distance to the query
#[derive(Debug, Clone, Copy)]
pub struct RankedCase<'a> {
    pub case: &'a Case,
    pub distance: f64,
}

/// Outcome of one retrieval: ranked cases plus the estimate
#[derive(Debug, Clone)]
pub struct Retrieval<'a> {
    pub cases: Vec<RankedCase<'a>>,
    pub estimate: Estimate,
    pub candidates_count: usize,
}

impl<'a> Retrieval<'a> {
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn neighbors(&self) -> Vec<Neighbor> {
        self.cases
            .iter()
            .map(|c| Neighbor {
                id: c.case.id,
                distance: c.distance,
            })
            .collect()
    }

    /// Render with schema attribute names for the caller
    pub fn to_response(&self, schema: &FeatureSchema) -> RetrievalResponse {
        RetrievalResponse {
            result: self
                .cases
                .iter()
                .map(|c| ExplainedCase {
                    id: c.case.id,
                    distance: c.distance,
                    record: schema.to_record(c.case),
                })
                .collect(),
            estimate: self.estimate,
            stats: RetrievalStats::compute(&self.neighbors(), self.candidates_count),
        }
    }
}

/// Fitted, read-only retrieval engine over one corpus
#[derive(Debug, Clone)]
pub struct CaseBase {
    retriever: Retriever,
    aggregator: EstimateAggregator,
}

impl CaseBase {
    /// Bring a corpus into the ready state
    pub fn fit(schema: FeatureSchema, corpus: Corpus, config: RetrieverConfig) -> Result<Self, ConfigError> {
        schema.validate()?;

        let encoder = FeatureEncoder::new(schema);
        let stats = encoder.fit(&corpus)?;
        let index = SimilarityIndex::build(corpus, encoder, stats);
        let retriever = Retriever::new(index, config)?;

        info!(
            "Case base ready: {} cases, {} encoded columns, filter {:?}",
            retriever.index().len(),
            retriever.index().dim(),
            retriever.config().filter_attribute
        );

        Ok(Self {
            retriever,
            aggregator: EstimateAggregator,
        })
    }

    /// Build the corpus from raw rows, then fit
    pub fn from_records<I>(schema: FeatureSchema, records: I, config: RetrieverConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Record>,
    {
        schema.validate()?;
        let corpus = schema.build_corpus(records)?;
        Self::fit(schema, corpus, config)
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.retriever.index().encoder().schema()
    }

    pub fn corpus(&self) -> &Corpus {
        self.retriever.index().corpus()
    }

    pub fn stats(&self) -> &EncodingStats {
        self.retriever.index().stats()
    }

    pub fn config(&self) -> &RetrieverConfig {
        self.retriever.config()
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Retrieve up to `k` cases (the configured default when `None`) and
    /// estimate the query's outcome from them
    pub fn retrieve(&self, query: &Record, k: Option<usize>) -> Result<Retrieval<'_>, ValidationError> {
        let k = k.unwrap_or(self.config().default_k);
        let ranking = self.retriever.retrieve(query, k)?;

        let cases: Vec<RankedCase<'_>> = ranking
            .neighbors
            .iter()
            .filter_map(|n| {
                self.corpus().get(n.id).map(|case| RankedCase {
                    case,
                    distance: n.distance,
                })
            })
            .collect();

        let estimate = self.aggregator.aggregate(cases.iter().map(|c| c.case));
        match estimate.value() {
            Some(value) => info!("Estimated {} = {:.2} from {} cases", self.schema().target, value, cases.len()),
            None => info!("No cases retrieved, no estimate available"),
        }

        Ok(Retrieval {
            cases,
            estimate,
            candidates_count: ranking.candidates_count,
        })
    }

    /// Stored record of one case
    pub fn case(&self, id: CaseId) -> Option<Record> {
        self.corpus().get(id).map(|case| self.schema().to_record(case))
    }

    /// Distinct values of `attribute` among cases matching `constraints`
    pub fn options(&self, attribute: &str, constraints: &Record) -> Result<Vec<Value>, ValidationError> {
        distinct_values(self.schema(), self.corpus(), attribute, constraints)
    }
}
