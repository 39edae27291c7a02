//! Kd-tree with best-bin-first search over `f32` rows.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::distance::{l2_squared, push_sorted};

const LEAF_SIZE: usize = 4;

enum Node {
    Leaf(Vec<usize>),
    Split { dim: usize, value: f32, left: usize, right: usize },
}

/// Unexplored branch ordered by its lower distance bound (min-heap)
struct Branch {
    bound: f32,
    node: usize,
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.node.cmp(&self.node))
    }
}

pub struct KdTree {
    points: Vec<Vec<f32>>,
    nodes: Vec<Node>,
}

impl KdTree {
    /// Build over `points`; all rows must have the same length
    pub fn build(points: Vec<Vec<f32>>) -> Self {
        let mut tree = Self {
            points,
            nodes: Vec::new(),
        };
        if !tree.points.is_empty() {
            let indices: Vec<usize> = (0..tree.points.len()).collect();
            tree.build_node(indices);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn build_node(&mut self, mut indices: Vec<usize>) -> usize {
        let dim = self.widest_dimension(&indices);
        let spread = match dim {
            Some((_, spread)) => spread,
            None => 0.0,
        };
        if indices.len() <= LEAF_SIZE || spread <= 0.0 {
            self.nodes.push(Node::Leaf(indices));
            return self.nodes.len() - 1;
        }
        let dim = dim.map(|(d, _)| d).unwrap_or(0);

        indices.sort_by(|&a, &b| self.points[a][dim].total_cmp(&self.points[b][dim]).then(a.cmp(&b)));
        let mid = indices.len() / 2;
        let value = self.points[indices[mid]][dim];
        let right_indices = indices.split_off(mid);

        // Reserve the slot so children can reference it after recursion
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf(Vec::new()));
        let left = self.build_node(indices);
        let right = self.build_node(right_indices);
        self.nodes[slot] = Node::Split { dim, value, left, right };
        slot
    }

    /// Dimension with the largest value range among `indices`
    fn widest_dimension(&self, indices: &[usize]) -> Option<(usize, f32)> {
        let dims = self.points.get(*indices.first()?)?.len();
        (0..dims)
            .map(|d| {
                let (lo, hi) = indices.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &i| {
                    let v = self.points[i][d];
                    (lo.min(v), hi.max(v))
                });
                (d, hi - lo)
            })
            .fold(None, |best: Option<(usize, f32)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            })
    }

    /// Approximate `k` nearest neighbours of `query` as `(distance, index)`,
    /// ascending. At most `max_checks` points are compared once `k`
    /// candidates are known; with `max_checks >= len()` the search is exact.
    pub fn knn(&self, query: &[f32], k: usize, max_checks: usize) -> Vec<(f32, usize)> {
        let mut best: Vec<(f32, usize)> = Vec::with_capacity(k + 1);
        if self.nodes.is_empty() || k == 0 {
            return best;
        }

        let mut heap = BinaryHeap::new();
        heap.push(Branch { bound: 0.0, node: 0 });
        let mut checks = 0usize;

        while let Some(branch) = heap.pop() {
            if best.len() == k && branch.bound >= best[k - 1].0 {
                break;
            }
            if checks >= max_checks && best.len() == k {
                break;
            }

            let mut node = branch.node;
            loop {
                match &self.nodes[node] {
                    Node::Split { dim, value, left, right } => {
                        let diff = query[*dim] - value;
                        let (near, far) = if diff < 0.0 { (*left, *right) } else { (*right, *left) };
                        heap.push(Branch {
                            bound: branch.bound.max(diff * diff),
                            node: far,
                        });
                        node = near;
                    }
                    Node::Leaf(indices) => {
                        for &i in indices {
                            push_sorted(&mut best, (l2_squared(query, &self.points[i]), i), k);
                            checks += 1;
                        }
                        break;
                    }
                }
            }
        }

        best.into_iter().map(|(d, i)| (d.sqrt(), i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_points(n: usize, dims: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..dims).map(|_| rng.random_range(0.0f32..100.0)).collect())
            .collect()
    }

    fn exact_knn(points: &[Vec<f32>], query: &[f32], k: usize) -> Vec<(f32, usize)> {
        let mut best = Vec::new();
        for (i, p) in points.iter().enumerate() {
            push_sorted(&mut best, (l2_squared(query, p), i), k);
        }
        best.into_iter().map(|(d, i)| (d.sqrt(), i)).collect()
    }

    #[test]
    fn test_exhaustive_search_is_exact() {
        let points = random_points(200, 8, 1);
        let queries = random_points(20, 8, 2);
        let tree = KdTree::build(points.clone());
        for q in &queries {
            assert_eq!(tree.knn(q, 2, usize::MAX), exact_knn(&points, q, 2));
        }
    }

    #[test]
    fn test_bounded_search_returns_k_results() {
        let points = random_points(500, 16, 3);
        let tree = KdTree::build(points);
        let result = tree.knn(&[50.0; 16], 2, 8);
        assert_eq!(result.len(), 2);
        assert!(result[0].0 <= result[1].0);
    }

    #[test]
    fn test_duplicate_points_form_a_leaf() {
        let tree = KdTree::build(vec![vec![1.0, 1.0]; 10]);
        let result = tree.knn(&[1.0, 1.0], 2, usize::MAX);
        assert_eq!(result, vec![(0.0, 0), (0.0, 1)]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.knn(&[1.0], 2, 32).is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_exhaustive_nearest_matches_linear_scan(
            points in proptest::collection::vec(proptest::collection::vec(-50f32..50.0, 3), 1..40),
            query in proptest::collection::vec(-50f32..50.0, 3),
        ) {
            let tree = KdTree::build(points.clone());
            let found = tree.knn(&query, 1, usize::MAX);
            let expected = exact_knn(&points, &query, 1);
            // Ties may resolve to another index at the same distance
            proptest::prop_assert_eq!(found.len(), 1);
            proptest::prop_assert_eq!(found[0].0, expected[0].0);
        }
    }
}
