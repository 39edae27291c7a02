use ftrack_core::{DMatch, SelectorType};

/// Neighbours requested from the matcher for a selection strategy
pub fn neighbours_for(selector: SelectorType) -> usize {
    match selector {
        SelectorType::NearestNeighbor => 1,
        SelectorType::KNearestNeighbor => 2,
    }
}

/// Reduce per-query candidate lists to final matches.
///
/// Nearest neighbour keeps the best candidate. K-nearest keeps the best
/// candidate when it is clearly better than the runner-up
/// (`best < ratio * second`); a query with a single candidate keeps it.
pub fn select_matches(candidates: Vec<Vec<DMatch>>, selector: SelectorType, ratio: f32) -> Vec<DMatch> {
    candidates
        .into_iter()
        .filter_map(|list| match (selector, list.as_slice()) {
            (_, []) => None,
            (SelectorType::NearestNeighbor, [best, ..]) => Some(*best),
            (SelectorType::KNearestNeighbor, [only]) => Some(*only),
            (SelectorType::KNearestNeighbor, [best, second, ..]) => {
                (best.distance < ratio * second.distance).then_some(*best)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(q: usize, t: usize, d: f32) -> DMatch {
        DMatch {
            query_idx: q,
            train_idx: t,
            distance: d,
        }
    }

    #[test]
    fn test_nearest_neighbour_keeps_best() {
        let out = select_matches(vec![vec![m(0, 3, 1.0)], vec![], vec![m(2, 1, 9.0)]], SelectorType::NearestNeighbor, 0.8);
        assert_eq!(out, vec![m(0, 3, 1.0), m(2, 1, 9.0)]);
    }

    #[test]
    fn test_ratio_test() {
        let candidates = vec![
            vec![m(0, 1, 5.0), m(0, 2, 10.0)],
            vec![m(1, 1, 9.0), m(1, 2, 10.0)],
            vec![m(2, 4, 7.0)],
        ];
        let out = select_matches(candidates, SelectorType::KNearestNeighbor, 0.8);
        assert_eq!(out, vec![m(0, 1, 5.0), m(2, 4, 7.0)]);
    }

    #[test]
    fn test_ratio_boundary_is_rejected() {
        let out = select_matches(vec![vec![m(0, 0, 8.0), m(0, 1, 10.0)]], SelectorType::KNearestNeighbor, 0.8);
        assert!(out.is_empty());
    }

    #[test]
    fn test_neighbour_counts() {
        assert_eq!(neighbours_for(SelectorType::NearestNeighbor), 1);
        assert_eq!(neighbours_for(SelectorType::KNearestNeighbor), 2);
    }
}
