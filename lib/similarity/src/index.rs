//! Similarity index
//!
//! Holds the corpus together with its encoded matrix. Row `i` of the matrix
//! is the vector of the case with identity `i`, encoded with the index's own
//! [`EncodingStats`]; queries are encoded through the same stats.

use casebase_core::{Case, CaseId, Corpus, Features, Filter, Vector};
use casebase_schema::{EncodingStats, FeatureEncoder};
use rayon::prelude::*;

/// Candidate pool left after the hard filter
#[derive(Debug, Clone, Default)]
pub struct Candidates<'a> {
    entries: Vec<(CaseId, &'a Vector)>,
}

impl<'a> Candidates<'a> {
    pub(crate) fn from_entries(entries: Vec<(CaseId, &'a Vector)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identities in corpus order
    pub fn ids(&self) -> impl Iterator<Item = CaseId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn entries(&self) -> &[(CaseId, &'a Vector)] {
        &self.entries
    }
}

/// Encoded corpus, built once and read-only afterwards
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    corpus: Corpus,
    encoder: FeatureEncoder,
    stats: EncodingStats,
    matrix: Vec<Vector>,
}

impl SimilarityIndex {
    /// Encode every case in corpus order
    pub fn build(corpus: Corpus, encoder: FeatureEncoder, stats: EncodingStats) -> Self {
        let matrix = corpus
            .cases()
            .par_iter()
            .map(|case| encoder.encode(&case.features, &stats))
            .collect();

        Self {
            corpus,
            encoder,
            stats,
            matrix,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn stats(&self) -> &EncodingStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Width of every row
    pub fn dim(&self) -> usize {
        self.stats.dim()
    }

    pub fn vector(&self, id: CaseId) -> Option<&Vector> {
        self.matrix.get(id.0)
    }

    /// Encode a query with the stats the matrix was built from
    pub fn encode_query(&self, features: &Features) -> Vector {
        self.encoder.encode(features, &self.stats)
    }

    /// Restrict the pool to cases satisfying `predicate`.
    ///
    /// No distance math happens here; an empty pool is a valid outcome.
    pub fn filter(&self, predicate: &dyn Filter) -> Candidates<'_> {
        let entries = self
            .corpus
            .iter()
            .zip(&self.matrix)
            .filter(|(case, _)| predicate.matches(case))
            .map(|(case, row)| (case.id, row))
            .collect();

        Candidates::from_entries(entries)
    }

    pub fn case(&self, id: CaseId) -> Option<&Case> {
        self.corpus.get(id)
    }
}
