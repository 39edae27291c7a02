mod float_image;
mod strategy;

pub use float_image::FloatImage;
pub use strategy::{
    DescriptorCategory, DescriptorType, DetectorType, MatcherType, SelectorType, UnknownStrategy,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major 8-bit grayscale image
pub type Image = image::GrayImage;

/// Detected image feature in full-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the meaningful neighbourhood
    pub size: f32,
    /// Orientation in radians, 0 when the detector has none
    pub angle: f32,
    /// Detector quality score, larger is better
    pub response: f32,
    /// Pyramid level the keypoint was found on
    pub octave: i32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            size,
            angle: 0.0,
            response: 0.0,
            octave: 0,
        }
    }

    pub fn with_response(mut self, response: f32) -> Self {
        self.response = response;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_octave(mut self, octave: i32) -> Self {
        self.octave = octave;
        self
    }
}

/// Descriptor matrix, one row per keypoint
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptors {
    /// Bit-string descriptors compared with Hamming distance
    Binary { width: usize, data: Vec<u8> },
    /// Floating-point descriptors compared with L2 distance
    Float { width: usize, data: Vec<f32> },
}

impl Default for Descriptors {
    fn default() -> Self {
        Descriptors::Binary {
            width: 0,
            data: Vec::new(),
        }
    }
}

impl Descriptors {
    /// Build a binary matrix from fixed-size rows
    pub fn from_binary_rows<const N: usize>(rows: &[[u8; N]]) -> Self {
        Descriptors::Binary {
            width: N,
            data: rows.iter().flat_map(|r| r.iter().copied()).collect(),
        }
    }

    /// Build a float matrix from fixed-size rows
    pub fn from_float_rows<const N: usize>(rows: &[[f32; N]]) -> Self {
        Descriptors::Float {
            width: N,
            data: rows.iter().flat_map(|r| r.iter().copied()).collect(),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Descriptors::Binary { width, .. } | Descriptors::Float { width, .. } => *width,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Descriptors::Binary { width: 0, .. } | Descriptors::Float { width: 0, .. } => 0,
            Descriptors::Binary { width, data } => data.len() / width,
            Descriptors::Float { width, data } => data.len() / width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Descriptors::Binary { .. })
    }

    pub fn binary_row(&self, i: usize) -> Option<&[u8]> {
        match self {
            Descriptors::Binary { width, data } if *width > 0 => data.get(i * width..(i + 1) * width),
            _ => None,
        }
    }

    pub fn float_row(&self, i: usize) -> Option<&[f32]> {
        match self {
            Descriptors::Float { width, data } if *width > 0 => data.get(i * width..(i + 1) * width),
            _ => None,
        }
    }

    /// Row `i` widened to `f32`, one value per byte for binary descriptors
    pub fn row_as_f32(&self, i: usize) -> Option<Vec<f32>> {
        match self {
            Descriptors::Binary { .. } => self
                .binary_row(i)
                .map(|r| r.iter().map(|&b| b as f32).collect()),
            Descriptors::Float { .. } => self.float_row(i).map(|r| r.to_vec()),
        }
    }
}

/// Correspondence between a keypoint of the previous frame (`query_idx`)
/// and one of the current frame (`train_idx`)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

/// Number of worker threads used when none is configured
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_rows() {
        let d = Descriptors::from_binary_rows(&[[1u8, 2], [3, 4], [5, 6]]);
        assert_eq!(d.rows(), 3);
        assert_eq!(d.width(), 2);
        assert_eq!(d.binary_row(1), Some(&[3u8, 4][..]));
        assert_eq!(d.binary_row(3), None);
        assert!(d.float_row(0).is_none());
    }

    #[test]
    fn test_default_descriptors_are_empty() {
        let d = Descriptors::default();
        assert!(d.is_empty());
        assert_eq!(d.rows(), 0);
    }

    #[test]
    fn test_row_as_f32_widens_bytes() {
        let d = Descriptors::from_binary_rows(&[[0u8, 255]]);
        assert_eq!(d.row_as_f32(0), Some(vec![0.0, 255.0]));

        let f = Descriptors::from_float_rows(&[[0.5f32, 1.5]]);
        assert_eq!(f.row_as_f32(0), Some(vec![0.5, 1.5]));
    }
}
