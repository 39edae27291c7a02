use ftrack_core::{FloatImage, Image, Keypoint};
use rayon::prelude::*;
use std::f32::consts::PI;

use crate::sampling::{rotate, smoothed};

pub const SIFT_LEN: usize = 128;
const SPATIAL_BINS: usize = 4;
const ORIENTATION_BINS: usize = 8;
/// Spatial bin width in units of the keypoint scale
const BIN_SCALE: f32 = 3.0;
const MAGNITUDE_CLIP: f32 = 0.2;

/// Gradient-orientation histograms over a 4x4 grid around the keypoint,
/// aligned with the keypoint angle.
pub struct SiftDescriptor;

impl SiftDescriptor {
    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<[f32; SIFT_LEN]> {
        let (gx, gy) = smoothed(img, 0.8).sobel();
        kps.par_iter().map(|kp| describe(&gx, &gy, kp)).collect()
    }
}

fn describe(gx: &FloatImage, gy: &FloatImage, kp: &Keypoint) -> [f32; SIFT_LEN] {
    let sigma = (0.5 * kp.size).max(1.0);
    let bin_width = BIN_SCALE * sigma;
    let half = bin_width * SPATIAL_BINS as f32 / 2.0;
    let radius = (half * std::f32::consts::SQRT_2).ceil() as i32;
    let (s, c) = kp.angle.sin_cos();
    let weight_sigma = half;

    let mut hist = [0.0f32; SIFT_LEN];
    for j in -radius..=radius {
        for i in -radius..=radius {
            // Sample offsets expressed in the keypoint frame
            let (u, v) = (i as f32, j as f32);
            if u.abs() >= half || v.abs() >= half {
                continue;
            }
            let (rx, ry) = rotate(u, v, s, c);
            let (x, y) = (kp.x + rx, kp.y + ry);
            let (dx, dy) = (gx.bilinear(x, y), gy.bilinear(x, y));
            let magnitude = (dx * dx + dy * dy).sqrt();
            if magnitude == 0.0 {
                continue;
            }
            let theta = (dy.atan2(dx) - kp.angle).rem_euclid(2.0 * PI);
            let weight = (-(u * u + v * v) / (2.0 * weight_sigma * weight_sigma)).exp();

            let bx = (((u + half) / bin_width) as usize).min(SPATIAL_BINS - 1);
            let by = (((v + half) / bin_width) as usize).min(SPATIAL_BINS - 1);
            let o = theta / (2.0 * PI) * ORIENTATION_BINS as f32;
            let o0 = o.floor() as usize % ORIENTATION_BINS;
            let o1 = (o0 + 1) % ORIENTATION_BINS;
            let frac = o - o.floor();

            let base = (by * SPATIAL_BINS + bx) * ORIENTATION_BINS;
            hist[base + o0] += weight * magnitude * (1.0 - frac);
            hist[base + o1] += weight * magnitude * frac;
        }
    }

    normalize(&mut hist);
    hist
}

/// Unit-normalise, clip large components, renormalise and scale to 0..255
fn normalize(hist: &mut [f32; SIFT_LEN]) {
    let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return;
    }
    hist.iter_mut().for_each(|v| *v = (*v / norm).min(MAGNITUDE_CLIP));
    let norm = hist.iter().map(|v| v * v).sum::<f32>().sqrt();
    hist.iter_mut().for_each(|v| *v = (*v / norm * 512.0).min(255.0));
}
