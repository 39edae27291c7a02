use ftrack_core::{FloatImage, Image, Keypoint};
use rayon::prelude::*;
use std::f32::consts::PI;

use crate::sampling::{pack_bits, rotate, smoothed};

pub const BRISK_BYTES: usize = 64;
/// Keypoint size at which the pattern is sampled at unit scale
const BRISK_BASE_SIZE: f32 = 12.0;
const RING_RADII: [f32; 5] = [0.0, 2.9, 4.9, 7.4, 10.8];
const RING_POINTS: [usize; 5] = [1, 10, 14, 15, 20];
const LONG_PAIR_MIN_DISTANCE: f32 = 13.67;

/// Concentric-ring sampling pattern. Orientation comes from the local
/// gradient over long-distance pairs; the bit string from the 512
/// shortest pairs of the rotated pattern.
pub struct BriskDescriptor {
    points: Vec<(f32, f32)>,
    short_pairs: Vec<(usize, usize)>,
    long_pairs: Vec<(usize, usize)>,
}

impl Default for BriskDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl BriskDescriptor {
    pub fn new() -> Self {
        let mut points = Vec::new();
        for (ring, (&radius, &count)) in RING_RADII.iter().zip(RING_POINTS.iter()).enumerate() {
            // Alternate rings are offset by half a step
            let offset = if ring % 2 == 0 { 0.0 } else { PI / count as f32 };
            for i in 0..count {
                let theta = offset + 2.0 * PI * i as f32 / count as f32;
                points.push((radius * theta.cos(), radius * theta.sin()));
            }
        }

        let mut pairs: Vec<(usize, usize, f32)> = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                let (dx, dy) = (points[j].0 - points[i].0, points[j].1 - points[i].1);
                pairs.push((i, j, (dx * dx + dy * dy).sqrt()));
            }
        }
        let long_pairs = pairs
            .iter()
            .filter(|p| p.2 > LONG_PAIR_MIN_DISTANCE)
            .map(|&(i, j, _)| (i, j))
            .collect();
        pairs.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
        let short_pairs = pairs.iter().take(BRISK_BYTES * 8).map(|&(i, j, _)| (i, j)).collect();

        Self {
            points,
            short_pairs,
            long_pairs,
        }
    }

    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<[u8; BRISK_BYTES]> {
        let smooth = smoothed(img, 1.0);
        kps.par_iter().map(|kp| self.describe(&smooth, kp)).collect()
    }

    /// Characteristic direction of the pattern around `kp`, in radians
    pub fn orientation(&self, smooth: &FloatImage, kp: &Keypoint) -> f32 {
        let scale = (kp.size / BRISK_BASE_SIZE).max(1.0);
        let values = self.sample(smooth, kp, scale, 0.0, 1.0);
        let (mut gx, mut gy) = (0.0f32, 0.0f32);
        for &(i, j) in &self.long_pairs {
            let (dx, dy) = (self.points[j].0 - self.points[i].0, self.points[j].1 - self.points[i].1);
            let norm = dx * dx + dy * dy;
            let diff = values[j] - values[i];
            gx += diff * dx / norm;
            gy += diff * dy / norm;
        }
        if gx == 0.0 && gy == 0.0 { 0.0 } else { gy.atan2(gx) }
    }

    fn sample(&self, smooth: &FloatImage, kp: &Keypoint, scale: f32, sin: f32, cos: f32) -> Vec<f32> {
        self.points
            .iter()
            .map(|&(px, py)| {
                let (rx, ry) = rotate(px * scale, py * scale, sin, cos);
                smooth.bilinear(kp.x + rx, kp.y + ry)
            })
            .collect()
    }

    fn describe(&self, smooth: &FloatImage, kp: &Keypoint) -> [u8; BRISK_BYTES] {
        let scale = (kp.size / BRISK_BASE_SIZE).max(1.0);
        let (s, c) = self.orientation(smooth, kp).sin_cos();
        let values = self.sample(smooth, kp, scale, s, c);
        let bits = self.short_pairs.iter().map(|&(i, j)| values[i] < values[j]);
        let mut d = [0u8; BRISK_BYTES];
        d.copy_from_slice(&pack_bits(bits, BRISK_BYTES));
        d
    }
}
