use std::collections::BTreeMap;

use ftrack_core::{DescriptorType, DetectorType};

/// Totals of one configuration run over all frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationStats {
    pub keypoints_on_vehicle: usize,
    pub matched_keypoints: usize,
    pub detect_ms: f64,
    pub describe_ms: f64,
    pub frames: usize,
}

/// Per (detector, descriptor) figures reported for a group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PairStats {
    pub matched_keypoints: usize,
    pub detect_ms: f64,
    pub describe_ms: f64,
}

impl From<&ConfigurationStats> for PairStats {
    fn from(stats: &ConfigurationStats) -> Self {
        Self {
            matched_keypoints: stats.matched_keypoints,
            detect_ms: stats.detect_ms,
            describe_ms: stats.describe_ms,
        }
    }
}

impl PairStats {
    /// Detection plus description time per matched keypoint; `NaN` when
    /// nothing matched
    pub fn time_per_matched_keypoint(&self) -> f64 {
        if self.matched_keypoints == 0 {
            return f64::NAN;
        }
        (self.detect_ms + self.describe_ms) / self.matched_keypoints as f64
    }
}

/// Results of one (selector, matcher) group, iterated in detector then
/// descriptor declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStats {
    pairs: BTreeMap<(DetectorType, DescriptorType), PairStats>,
}

impl GroupStats {
    pub fn record(&mut self, detector: DetectorType, descriptor: DescriptorType, stats: PairStats) {
        self.pairs.insert((detector, descriptor), stats);
    }

    pub fn get(&self, detector: DetectorType, descriptor: DescriptorType) -> Option<&PairStats> {
        self.pairs.get(&(detector, descriptor))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetectorType, DescriptorType, &PairStats)> {
        self.pairs.iter().map(|(&(det, desc), stats)| (det, desc, stats))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Keypoints on the vehicle per detector, taken from the first configuration
/// that completed with that detector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeypointSummary {
    counts: BTreeMap<DetectorType, usize>,
}

impl KeypointSummary {
    /// Record `count` unless the detector already has an entry; returns
    /// whether it was recorded
    pub fn record_first(&mut self, detector: DetectorType, count: usize) -> bool {
        if self.counts.contains_key(&detector) {
            return false;
        }
        self.counts.insert(detector, count);
        true
    }

    pub fn get(&self, detector: DetectorType) -> Option<usize> {
        self.counts.get(&detector).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetectorType, usize)> + '_ {
        self.counts.iter().map(|(&d, &c)| (d, c))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_matches_is_nan() {
        let stats = PairStats {
            matched_keypoints: 0,
            detect_ms: 12.0,
            describe_ms: 3.0,
        };
        assert!(stats.time_per_matched_keypoint().is_nan());
    }

    #[test]
    fn test_time_per_keypoint() {
        let stats = PairStats {
            matched_keypoints: 5,
            detect_ms: 12.0,
            describe_ms: 3.0,
        };
        assert_eq!(stats.time_per_matched_keypoint(), 3.0);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut summary = KeypointSummary::default();
        assert!(summary.record_first(DetectorType::Fast, 120));
        assert!(!summary.record_first(DetectorType::Fast, 999));
        assert_eq!(summary.get(DetectorType::Fast), Some(120));
    }

    #[test]
    fn test_group_rows_follow_declaration_order() {
        let mut group = GroupStats::default();
        group.record(DetectorType::Akaze, DescriptorType::Akaze, PairStats::default());
        group.record(DetectorType::ShiTomasi, DescriptorType::Orb, PairStats::default());
        group.record(DetectorType::ShiTomasi, DescriptorType::Sift, PairStats::default());
        let keys: Vec<(DetectorType, DescriptorType)> = group.iter().map(|(a, b, _)| (a, b)).collect();
        assert_eq!(
            keys,
            vec![
                (DetectorType::ShiTomasi, DescriptorType::Sift),
                (DetectorType::ShiTomasi, DescriptorType::Orb),
                (DetectorType::Akaze, DescriptorType::Akaze),
            ]
        );
    }
}
