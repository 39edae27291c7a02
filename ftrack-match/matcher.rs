use ftrack_core::{DMatch, DescriptorCategory, Descriptors, MatcherType, SelectorType};

use crate::brute_force::{BruteForceMatcher, Norm};
use crate::error::{MatchError, MatchResult};
use crate::flann::{FlannMatcher, DEFAULT_CHECKS};
use crate::selector::{neighbours_for, select_matches};

/// Default distance ratio for k-nearest-neighbour selection
pub const DEFAULT_RATIO: f32 = 0.8;

/// Matches the descriptors of the previous frame (query) against those of
/// the current frame (train).
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorMatcher {
    ratio: f32,
    flann_checks: usize,
}

impl Default for DescriptorMatcher {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            flann_checks: DEFAULT_CHECKS,
        }
    }
}

impl DescriptorMatcher {
    pub fn new(ratio: f32, flann_checks: usize) -> MatchResult<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(MatchError::InvalidRatio(ratio));
        }
        Ok(Self { ratio, flann_checks })
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn match_descriptors(
        &self,
        previous: &Descriptors,
        current: &Descriptors,
        category: DescriptorCategory,
        matcher: MatcherType,
        selector: SelectorType,
    ) -> MatchResult<Vec<DMatch>> {
        if previous.is_empty() || current.is_empty() {
            return Ok(Vec::new());
        }
        if previous.is_binary() != current.is_binary() {
            return Err(MatchError::MixedDescriptorKinds);
        }
        if previous.width() != current.width() {
            return Err(MatchError::WidthMismatch {
                previous: previous.width(),
                current: current.width(),
            });
        }

        let k = neighbours_for(selector);
        let candidates = match matcher {
            MatcherType::BruteForce => {
                let norm = match category {
                    DescriptorCategory::Binary if !previous.is_binary() => {
                        return Err(MatchError::IncompatibleCategory { category });
                    }
                    DescriptorCategory::Binary => Norm::Hamming,
                    DescriptorCategory::Hog => Norm::L2,
                };
                BruteForceMatcher::new(norm).knn_match(previous, current, k)
            }
            MatcherType::Flann => FlannMatcher::new(self.flann_checks).knn_match(previous, current, k),
        };

        Ok(select_matches(candidates, selector, self.ratio))
    }
}
