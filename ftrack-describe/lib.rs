//! Descriptor extraction: binary intensity-comparison descriptors
//! (BRIEF, ORB, BRISK, FREAK, AKAZE) compared with Hamming distance, and
//! SIFT gradient histograms compared with L2 distance.

pub mod akaze;
pub mod brief;
pub mod brisk;
pub mod error;
pub mod extractor;
pub mod freak;
pub mod orb;
pub mod sampling;
pub mod sift;

pub use error::{DescribeError, DescribeResult};
pub use extractor::DescriptorExtractor;
