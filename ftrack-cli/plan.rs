use std::fmt;

use ftrack_core::{DescriptorType, DetectorType, MatcherType, SelectorType};

/// One point of the benchmark sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub selector: SelectorType,
    pub matcher: MatcherType,
    pub detector: DetectorType,
    pub descriptor: DescriptorType,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.selector, self.matcher, self.detector, self.descriptor)
    }
}

/// Whether a detector's keypoints can be fed to a descriptor.
///
/// ORB descriptors cannot be computed on SIFT keypoints, and AKAZE
/// descriptors need the AKAZE detector's scale space.
pub fn is_compatible(detector: DetectorType, descriptor: DescriptorType) -> bool {
    match (detector, descriptor) {
        (DetectorType::Sift, DescriptorType::Orb) => false,
        (DetectorType::Akaze, DescriptorType::Akaze) => true,
        (_, DescriptorType::Akaze) => false,
        _ => true,
    }
}

/// Configurations sharing a selector and matcher; reports are written per group
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationGroup {
    pub selector: SelectorType,
    pub matcher: MatcherType,
    pub configurations: Vec<Configuration>,
}

/// Every valid configuration, in sweep order selector, matcher, detector,
/// descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    configurations: Vec<Configuration>,
}

impl SweepPlan {
    pub fn new(
        selectors: &[SelectorType],
        matchers: &[MatcherType],
        detectors: &[DetectorType],
        descriptors: &[DescriptorType],
    ) -> Self {
        let configurations = selectors
            .iter()
            .flat_map(|&selector| {
                matchers.iter().flat_map(move |&matcher| {
                    detectors.iter().flat_map(move |&detector| {
                        descriptors.iter().map(move |&descriptor| Configuration {
                            selector,
                            matcher,
                            detector,
                            descriptor,
                        })
                    })
                })
            })
            .filter(|c| is_compatible(c.detector, c.descriptor))
            .collect();
        Self { configurations }
    }

    /// The full cartesian product of all strategies
    pub fn full() -> Self {
        Self::new(SelectorType::ALL, MatcherType::ALL, DetectorType::ALL, DescriptorType::ALL)
    }

    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Consecutive runs of configurations with the same (selector, matcher)
    pub fn groups(&self) -> Vec<ConfigurationGroup> {
        let mut groups: Vec<ConfigurationGroup> = Vec::new();
        for &c in &self.configurations {
            match groups.last_mut() {
                Some(g) if g.selector == c.selector && g.matcher == c.matcher => g.configurations.push(c),
                _ => groups.push(ConfigurationGroup {
                    selector: c.selector,
                    matcher: c.matcher,
                    configurations: vec![c],
                }),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_rules() {
        let plan = SweepPlan::full();
        for c in plan.configurations() {
            assert!(!(c.detector == DetectorType::Sift && c.descriptor == DescriptorType::Orb));
            if c.descriptor == DescriptorType::Akaze {
                assert_eq!(c.detector, DetectorType::Akaze);
            }
        }
        // 7 x 6 pairs, minus SIFT/ORB, minus six AKAZE-descriptor pairs
        assert_eq!(plan.len(), 4 * (42 - 1 - 6));
    }

    #[test]
    fn test_sweep_order_and_groups() {
        let plan = SweepPlan::full();
        let first = plan.configurations()[0];
        assert_eq!(first.to_string(), "SEL_NN_MAT_BF_SHITOMASI_SIFT");

        let groups = plan.groups();
        let keys: Vec<String> = groups.iter().map(|g| format!("{}_{}", g.selector, g.matcher)).collect();
        assert_eq!(keys, vec!["SEL_NN_MAT_BF", "SEL_NN_MAT_FLANN", "SEL_KNN_MAT_BF", "SEL_KNN_MAT_FLANN"]);
        assert!(groups.iter().all(|g| g.configurations.len() == 35));
    }

    #[test]
    fn test_single_pair_plan() {
        let plan = SweepPlan::new(
            &[SelectorType::KNearestNeighbor],
            &[MatcherType::BruteForce],
            &[DetectorType::Fast],
            &[DescriptorType::Brief, DescriptorType::Akaze],
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.groups().len(), 1);
    }
}
