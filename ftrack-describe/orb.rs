use ftrack_core::{FloatImage, Image, Keypoint};
use rayon::prelude::*;

use crate::sampling::{gaussian_test_pairs, pack_bits, rotate, smoothed, TestPair};

pub const ORB_BYTES: usize = 32;
const ORB_PATCH_SIZE: usize = 31;
const ORB_SMOOTHING_SIGMA: f32 = 1.2;
const ORB_SEED: u64 = 0x6f72_62;

/// Steered BRIEF: the test pattern is rotated by the keypoint angle
/// before sampling, so descriptors follow in-plane rotation.
pub struct OrbDescriptor {
    pairs: Vec<TestPair>,
}

impl Default for OrbDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbDescriptor {
    pub fn new() -> Self {
        Self {
            pairs: gaussian_test_pairs(ORB_BYTES * 8, ORB_PATCH_SIZE, ORB_SEED),
        }
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<[u8; ORB_BYTES]> {
        let smooth = smoothed(img, ORB_SMOOTHING_SIGMA);
        kps.par_iter().map(|kp| self.describe(&smooth, kp)).collect()
    }

    fn describe(&self, smooth: &FloatImage, kp: &Keypoint) -> [u8; ORB_BYTES] {
        let (s, c) = kp.angle.sin_cos();
        let bits = self.pairs.iter().map(|&(x1, y1, x2, y2)| {
            let (rx1, ry1) = rotate(x1, y1, s, c);
            let (rx2, ry2) = rotate(x2, y2, s, c);
            smooth.bilinear(kp.x + rx1, kp.y + ry1) < smooth.bilinear(kp.x + rx2, kp.y + ry2)
        });
        let mut d = [0u8; ORB_BYTES];
        d.copy_from_slice(&pack_bits(bits, ORB_BYTES));
        d
    }
}
