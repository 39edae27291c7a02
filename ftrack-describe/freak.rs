use ftrack_core::{FloatImage, Image, Keypoint};
use rayon::prelude::*;
use std::f32::consts::PI;

use crate::sampling::{pack_bits, rotate, smoothed};

pub const FREAK_BYTES: usize = 64;
const FREAK_PATTERN_SCALE: f32 = 22.0;
const FREAK_BASE_SIZE: f32 = 12.0;
const POINTS_PER_RING: usize = 6;

/// Retina-like pattern: seven rings of six points plus the centre, denser
/// towards the middle. Pairs are ordered coarse to fine.
pub struct FreakDescriptor {
    points: Vec<(f32, f32)>,
    pairs: Vec<(usize, usize)>,
    orientation_pairs: Vec<(usize, usize)>,
}

impl Default for FreakDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl FreakDescriptor {
    pub fn new() -> Self {
        let big_r = 2.0 / 3.0;
        let small_r = 2.0 / 24.0;
        let unit = (big_r - small_r) / 21.0;
        let radii = [
            big_r,
            big_r - 6.0 * unit,
            big_r - 11.0 * unit,
            big_r - 15.0 * unit,
            big_r - 18.0 * unit,
            big_r - 20.0 * unit,
            small_r,
        ];

        let mut points = Vec::with_capacity(radii.len() * POINTS_PER_RING + 1);
        for (ring, &r) in radii.iter().enumerate() {
            let offset = if ring % 2 == 0 { 0.0 } else { PI / POINTS_PER_RING as f32 };
            for i in 0..POINTS_PER_RING {
                let theta = offset + 2.0 * PI * i as f32 / POINTS_PER_RING as f32;
                let r = r * FREAK_PATTERN_SCALE;
                points.push((r * theta.cos(), r * theta.sin()));
            }
        }
        points.push((0.0, 0.0));

        let ring_of = |i: usize| i / POINTS_PER_RING;
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                pairs.push((i, j));
            }
        }
        // Outer rings first: sort by the mean ring index of the pair
        pairs.sort_by_key(|&(i, j)| ring_of(i) + ring_of(j));
        pairs.truncate(FREAK_BYTES * 8);

        // Symmetric pairs on the three outer rings
        let orientation_pairs = (0..3 * POINTS_PER_RING)
            .flat_map(|i| {
                let ring = ring_of(i);
                ((i + 1)..(ring + 1) * POINTS_PER_RING).map(move |j| (i, j))
            })
            .chain((0..POINTS_PER_RING).map(|i| (i, (i + 3) % POINTS_PER_RING + POINTS_PER_RING)))
            .collect();

        Self {
            points,
            pairs,
            orientation_pairs,
        }
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<[u8; FREAK_BYTES]> {
        let smooth = smoothed(img, 1.5);
        kps.par_iter().map(|kp| self.describe(&smooth, kp)).collect()
    }

    fn sample(&self, smooth: &FloatImage, kp: &Keypoint, sin: f32, cos: f32) -> Vec<f32> {
        let scale = (kp.size / FREAK_BASE_SIZE).max(1.0);
        self.points
            .iter()
            .map(|&(px, py)| {
                let (rx, ry) = rotate(px * scale, py * scale, sin, cos);
                smooth.bilinear(kp.x + rx, kp.y + ry)
            })
            .collect()
    }

    /// Direction of the local gradient estimated from the outer-ring pairs
    pub fn orientation(&self, smooth: &FloatImage, kp: &Keypoint) -> f32 {
        let values = self.sample(smooth, kp, 0.0, 1.0);
        let (mut gx, mut gy) = (0.0f32, 0.0f32);
        for &(i, j) in &self.orientation_pairs {
            let (dx, dy) = (self.points[j].0 - self.points[i].0, self.points[j].1 - self.points[i].1);
            let norm = (dx * dx + dy * dy).sqrt();
            let diff = values[j] - values[i];
            gx += diff * dx / norm;
            gy += diff * dy / norm;
        }
        if gx == 0.0 && gy == 0.0 { 0.0 } else { gy.atan2(gx) }
    }

    fn describe(&self, smooth: &FloatImage, kp: &Keypoint) -> [u8; FREAK_BYTES] {
        let (s, c) = self.orientation(smooth, kp).sin_cos();
        let values = self.sample(smooth, kp, s, c);
        let bits = self.pairs.iter().map(|&(i, j)| values[i] > values[j]);
        let mut d = [0u8; FREAK_BYTES];
        d.copy_from_slice(&pack_bits(bits, FREAK_BYTES));
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_pattern_layout() {
        let freak = FreakDescriptor::new();
        assert_eq!(freak.points.len(), 43);
        assert_eq!(freak.pairs.len(), 512);
        // Coarse pairs come first
        assert!(freak.pairs[0].0 < POINTS_PER_RING && freak.pairs[0].1 < POINTS_PER_RING);
    }

    #[test]
    fn test_uniform_patch_gives_zero_bits() {
        let img = Image::from_pixel(64, 64, Luma([77]));
        let desc = FreakDescriptor::new().generate_descriptors(&img, &[Keypoint::new(32.0, 32.0, 12.0)]);
        assert_eq!(desc[0], [0u8; FREAK_BYTES]);
    }

    #[test]
    fn test_bright_outer_ring_sets_coarse_bits() {
        // Bright left half: comparisons between points on opposite sides differ
        let img = Image::from_fn(64, 64, |x, _| Luma([if x < 32 { 220 } else { 20 }]));
        let desc = FreakDescriptor::new().generate_descriptors(&img, &[Keypoint::new(32.0, 32.0, 12.0)]);
        assert!(desc[0].iter().any(|&b| b != 0));
    }
}
