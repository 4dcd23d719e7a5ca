//! Serialisable retrieval results
//!
//! Output structures returned to callers: full case records with their
//! distance, the estimate, and summary statistics for the query.

use crate::estimate::Estimate;
use crate::retriever::Neighbor;
use casebase_core::{CaseId, Record};
use serde::Serialize;

/// A retrieved case rendered with schema attribute names
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedCase {
    pub id: CaseId,
    /// Euclidean distance to the query in encoded space
    pub distance: f64,
    /// Full case record, target included
    pub record: Record,
}

/// Response body for a retrieval
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResponse {
    /// Ranked cases, closest first
    pub result: Vec<ExplainedCase>,
    /// Mean outcome, or `null` when nothing was retrieved
    pub estimate: Estimate,
    pub stats: RetrievalStats,
}

/// Summary statistics for a retrieval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalStats {
    /// Cases that survived the hard filter
    pub candidates_count: usize,
    /// Cases returned
    pub results_count: usize,
    /// Distance of the closest case
    pub best_distance: Option<f64>,
    /// Mean distance over returned cases
    pub mean_distance: Option<f64>,
}

impl RetrievalStats {
    /// Compute stats from ranked neighbors (closest first)
    pub fn compute(neighbors: &[Neighbor], candidates_count: usize) -> Self {
        if neighbors.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                best_distance: None,
                mean_distance: None,
            };
        }

        let total: f64 = neighbors.iter().map(|n| n.distance).sum();

        Self {
            candidates_count,
            results_count: neighbors.len(),
            best_distance: Some(neighbors[0].distance),
            mean_distance: Some(total / neighbors.len() as f64),
        }
    }
}
