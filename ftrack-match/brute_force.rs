use ftrack_core::{DMatch, Descriptors};
use rayon::prelude::*;

use crate::distance::{hamming, l2_bytes, l2_squared, push_sorted};

/// Distance used by the brute-force matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Norm {
    Hamming,
    L2,
}

/// Exhaustive matcher: every query row is compared against every train row
pub struct BruteForceMatcher {
    norm: Norm,
}

impl BruteForceMatcher {
    pub fn new(norm: Norm) -> Self {
        Self { norm }
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }

    fn distance(&self, query: &Descriptors, qi: usize, train: &Descriptors, ti: usize) -> f32 {
        match (self.norm, query, train) {
            (Norm::Hamming, Descriptors::Binary { .. }, Descriptors::Binary { .. }) => {
                match (query.binary_row(qi), train.binary_row(ti)) {
                    (Some(a), Some(b)) => hamming(a, b) as f32,
                    _ => f32::INFINITY,
                }
            }
            (_, Descriptors::Binary { .. }, Descriptors::Binary { .. }) => {
                match (query.binary_row(qi), train.binary_row(ti)) {
                    (Some(a), Some(b)) => l2_bytes(a, b),
                    _ => f32::INFINITY,
                }
            }
            _ => match (query.row_as_f32(qi), train.row_as_f32(ti)) {
                (Some(a), Some(b)) => l2_squared(&a, &b).sqrt(),
                _ => f32::INFINITY,
            },
        }
    }

    /// Up to `k` best train rows for each query row, ascending by distance.
    /// Equal distances keep the lower train index first.
    pub fn knn_match(&self, query: &Descriptors, train: &Descriptors, k: usize) -> Vec<Vec<DMatch>> {
        let train_rows = train.rows();
        (0..query.rows())
            .into_par_iter()
            .map(|qi| {
                let mut best = Vec::with_capacity(k + 1);
                for ti in 0..train_rows {
                    push_sorted(&mut best, (self.distance(query, qi, train, ti), ti), k);
                }
                best.into_iter()
                    .map(|(distance, ti)| DMatch {
                        query_idx: qi,
                        train_idx: ti,
                        distance,
                    })
                    .collect()
            })
            .collect()
    }
}
