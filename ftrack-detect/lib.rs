//! Keypoint detectors: gradient-covariance corners (Shi-Tomasi, Harris),
//! FAST, multi-scale FAST (BRISK, ORB), Difference-of-Gaussians (SIFT) and
//! determinant-of-Hessian blobs (AKAZE).
//!
//! All detectors return keypoints in full-image pixel coordinates.

pub mod akaze;
pub mod brisk;
pub mod config;
pub mod corner_response;
pub mod detector;
pub mod error;
pub mod fast;
pub mod orb;
pub mod pyramid;
pub mod refinement;
pub mod sift;
pub mod types;

pub use config::DetectorConfig;
pub use detector::KeypointDetector;
pub use error::{DetectError, DetectResult};
pub use types::ScaleLevel;
