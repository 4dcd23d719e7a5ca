use serde::{Deserialize, Serialize};

/// A dense encoded feature vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Compute L2 (Euclidean) distance.
    ///
    /// Every dimension is weighted equally. The summation order is fixed,
    /// so the same pair of vectors always yields bit-identical results.
    #[inline]
    pub fn l2_distance(&self, other: &Vector) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }

        l2_distance_scalar(&self.data, &other.data)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector::new(data)
    }
}

/// Scalar L2 distance, unrolled over 4-wide chunks into two accumulators
fn l2_distance_scalar(a: &[f64], b: &[f64]) -> f64 {
    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];

        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    let tail = a.len() - remainder.len();
    for (x, y) in remainder.iter().zip(&b[tail..]) {
        let diff = x - y;
        sum0 += diff * diff;
    }

    (sum0 + sum1).sqrt()
}
