//! Descriptor matching between consecutive frames.
//!
//! Brute force compares every pair (Hamming for binary descriptors, L2
//! otherwise); the approximate matcher searches a kd-tree with a bounded
//! number of checks. Candidates are then reduced by nearest-neighbour or
//! k-nearest-neighbour ratio selection.

pub mod brute_force;
pub mod distance;
pub mod error;
pub mod flann;
pub mod kdtree;
pub mod matcher;
pub mod selector;

pub use error::{MatchError, MatchResult};
pub use matcher::{DescriptorMatcher, DEFAULT_RATIO};
