//! k-NN retriever
//!
//! Per query: validate → hard filter → encode → Euclidean distance →
//! stable ranking → top-k. The ranking key is `(distance, case id)`, so ties
//! always resolve to corpus order regardless of how distances were computed.

use crate::index::{Candidates, SimilarityIndex};
use casebase_core::{AttributeSlot, CaseFilter, CaseId, ConfigError, Features, FilterCondition, Record, ValidationError, Vector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Candidate pools at least this large are scored on the rayon pool
const PARALLEL_THRESHOLD: usize = 1024;

/// Relevance policy for retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieverConfig {
    /// Categorical attribute the query must match exactly; `None` disables
    /// the hard filter
    #[serde(default = "default_filter_attribute")]
    pub filter_attribute: Option<String>,

    /// Neighbors returned when the caller does not ask for a specific k
    #[serde(default = "default_k")]
    pub default_k: usize,
}

fn default_filter_attribute() -> Option<String> {
    Some("Manufacturer".to_string())
}

fn default_k() -> usize {
    5
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            filter_attribute: default_filter_attribute(),
            default_k: default_k(),
        }
    }
}

impl RetrieverConfig {
    pub fn unfiltered() -> Self {
        Self {
            filter_attribute: None,
            ..Self::default()
        }
    }

    pub fn with_filter(attribute: impl Into<String>) -> Self {
        Self {
            filter_attribute: Some(attribute.into()),
            ..Self::default()
        }
    }
}

/// One ranked case
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: CaseId,
    pub distance: f64,
}

/// Ranked neighbors plus the size of the pool they were drawn from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ranking {
    pub neighbors: Vec<Neighbor>,
    pub candidates_count: usize,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }
}

/// Retrieves the k most similar cases from a frozen index
#[derive(Debug, Clone)]
pub struct Retriever {
    index: SimilarityIndex,
    filter_slot: Option<usize>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(index: SimilarityIndex, config: RetrieverConfig) -> Result<Self, ConfigError> {
        let filter_slot = match &config.filter_attribute {
            Some(name) => Some(
                index
                    .encoder()
                    .schema()
                    .categorical_slot(name)
                    .ok_or_else(|| ConfigError::UnknownFilterAttribute(name.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            index,
            filter_slot,
            config,
        })
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Exact-match predicate derived from the query's filter attribute
    pub fn hard_filter(&self, query: &Features) -> CaseFilter {
        self.filter_slot
            .and_then(|slot| FilterCondition::equals(AttributeSlot::Categorical(slot), query))
            .map(CaseFilter::new)
            .unwrap_or_else(CaseFilter::any)
    }

    /// Validate a raw query record, then rank.
    ///
    /// Validation failures abort before any filtering or distance work.
    pub fn retrieve(&self, query: &Record, k: usize) -> Result<Ranking, ValidationError> {
        let features = self.index.encoder().schema().parse_query(query)?;
        Ok(self.retrieve_features(&features, k))
    }

    /// Rank already-validated features
    pub fn retrieve_features(&self, query: &Features, k: usize) -> Ranking {
        let filter = self.hard_filter(query);
        let candidates = self.index.filter(&filter);

        match filter.condition() {
            FilterCondition::CategoryEquals { value, .. } => info!(
                "Hard filter {} = '{}' matched {} cases",
                self.config.filter_attribute.as_deref().unwrap_or_default(),
                value,
                candidates.len()
            ),
            _ => debug!("Hard filter disabled, {} candidate cases", candidates.len()),
        }

        if candidates.is_empty() {
            info!("No candidate cases survived the hard filter");
            return Ranking::default();
        }

        let encoded = self.index.encode_query(query);
        let neighbors = rank(&encoded, &candidates, k);
        debug!(
            "Ranked {} of {} candidates, best distance {:?}",
            neighbors.len(),
            candidates.len(),
            neighbors.first().map(|n| n.distance)
        );

        Ranking {
            neighbors,
            candidates_count: candidates.len(),
        }
    }
}

/// Score every candidate and keep the `k` closest
pub fn rank(query: &Vector, candidates: &Candidates<'_>, k: usize) -> Vec<Neighbor> {
    if k == 0 {
        return Vec::new();
    }

    let mut neighbors: Vec<Neighbor> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates
            .entries()
            .par_iter()
            .map(|entry| score(query, entry))
            .collect()
    } else {
        candidates
            .entries()
            .iter()
            .map(|entry| score(query, entry))
            .collect()
    };

    neighbors.sort_by_key(|n| (OrderedFloat(n.distance), n.id));
    neighbors.truncate(k);
    neighbors
}

#[inline]
fn score(query: &Vector, (id, row): &(CaseId, &Vector)) -> Neighbor {
    Neighbor {
        id: *id,
        distance: query.l2_distance(row),
    }
}
