use ftrack_core::{FloatImage, Image, Keypoint};
use rayon::prelude::*;

use crate::sampling::{gaussian_test_pairs, pack_bits, smoothed, TestPair};

pub const BRIEF_BYTES: usize = 32;
const BRIEF_PATCH_SIZE: usize = 48;
const BRIEF_SMOOTHING_SIGMA: f32 = 2.0;
const BRIEF_SEED: u64 = 0x6272_6965_66;

/// Unsteered BRIEF: 256 intensity comparisons on a smoothed 48x48 patch
pub struct BriefGenerator {
    pairs: Vec<TestPair>,
}

impl Default for BriefGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BriefGenerator {
    pub fn new() -> Self {
        Self {
            pairs: gaussian_test_pairs(BRIEF_BYTES * 8, BRIEF_PATCH_SIZE, BRIEF_SEED),
        }
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<[u8; BRIEF_BYTES]> {
        let smooth = smoothed(img, BRIEF_SMOOTHING_SIGMA);
        kps.par_iter().map(|kp| self.describe(&smooth, kp)).collect()
    }

    fn describe(&self, smooth: &FloatImage, kp: &Keypoint) -> [u8; BRIEF_BYTES] {
        let bits = self.pairs.iter().map(|&(x1, y1, x2, y2)| {
            smooth.bilinear(kp.x + x1, kp.y + y1) < smooth.bilinear(kp.x + x2, kp.y + y2)
        });
        let mut d = [0u8; BRIEF_BYTES];
        d.copy_from_slice(&pack_bits(bits, BRIEF_BYTES));
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_one_row_per_keypoint() {
        let img = Image::from_fn(80, 80, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let kps = vec![Keypoint::new(40.0, 40.0, 7.0), Keypoint::new(0.0, 0.0, 7.0)];
        let desc = BriefGenerator::new().generate_descriptors(&img, &kps);
        assert_eq!(desc.len(), 2);
    }

    #[test]
    fn test_uniform_patch_gives_zero_bits() {
        let img = Image::from_pixel(80, 80, Luma([100]));
        let desc = BriefGenerator::new().generate_descriptors(&img, &[Keypoint::new(40.0, 40.0, 7.0)]);
        assert_eq!(desc[0], [0u8; BRIEF_BYTES]);
    }

    #[test]
    fn test_ignores_keypoint_angle() {
        let img = Image::from_fn(80, 80, |x, y| Luma([((x * 13) ^ (y * 5)) as u8]));
        let generator = BriefGenerator::new();
        let a = generator.generate_descriptors(&img, &[Keypoint::new(40.0, 40.0, 7.0)]);
        let b = generator.generate_descriptors(&img, &[Keypoint::new(40.0, 40.0, 7.0).with_angle(1.0)]);
        assert_eq!(a, b);
    }
}
