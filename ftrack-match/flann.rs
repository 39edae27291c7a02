use ftrack_core::{DMatch, Descriptors};
use rayon::prelude::*;

use crate::kdtree::KdTree;

/// Leaf checks per query when none is configured
pub const DEFAULT_CHECKS: usize = 32;

/// Approximate nearest-neighbour matcher. Descriptors of either kind are
/// widened to `f32` and indexed in a kd-tree; distances are L2.
pub struct FlannMatcher {
    checks: usize,
}

impl Default for FlannMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKS)
    }
}

impl FlannMatcher {
    pub fn new(checks: usize) -> Self {
        Self { checks: checks.max(1) }
    }

    pub fn knn_match(&self, query: &Descriptors, train: &Descriptors, k: usize) -> Vec<Vec<DMatch>> {
        let rows: Vec<Vec<f32>> = (0..train.rows()).filter_map(|i| train.row_as_f32(i)).collect();
        let tree = KdTree::build(rows);

        (0..query.rows())
            .into_par_iter()
            .map(|qi| match query.row_as_f32(qi) {
                Some(q) => tree
                    .knn(&q, k, self.checks)
                    .into_iter()
                    .map(|(distance, ti)| DMatch {
                        query_idx: qi,
                        train_idx: ti,
                        distance,
                    })
                    .collect(),
                None => Vec::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_identical_row() {
        let train = Descriptors::from_binary_rows(&[[10u8, 200, 3], [90, 90, 90], [0, 0, 255]]);
        let query = Descriptors::from_binary_rows(&[[90u8, 91, 90]]);
        let matches = FlannMatcher::default().knn_match(&query, &train, 1);
        assert_eq!(matches[0][0].train_idx, 1);
        assert_eq!(matches[0][0].distance, 1.0);
    }

    #[test]
    fn test_float_rows() {
        let train = Descriptors::from_float_rows(&[[0.0f32, 0.0], [5.0, 5.0]]);
        let query = Descriptors::from_float_rows(&[[4.0f32, 5.0], [0.5, 0.0]]);
        let matches = FlannMatcher::default().knn_match(&query, &train, 2);
        assert_eq!(matches[0][0].train_idx, 1);
        assert_eq!(matches[1][0].train_idx, 0);
        assert_eq!(matches[1].len(), 2);
    }
}
