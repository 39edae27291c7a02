use ftrack_core::{FloatImage, Image, Keypoint};
use rayon::prelude::*;

use crate::sampling::{gradients, pack_bits, rotate, smoothed};

/// 486 comparisons rounded up to whole bytes
pub const AKAZE_BYTES: usize = 61;
const GRID_SIDES: [usize; 3] = [2, 3, 4];
const SAMPLES_PER_CELL_SIDE: usize = 3;

/// Modified local difference binary descriptor: a rotated square patch is
/// split into 2x2, 3x3 and 4x4 grids, and every pair of cells in a grid is
/// compared on mean intensity and mean x/y derivative.
pub struct AkazeDescriptor;

struct Channels {
    intensity: FloatImage,
    dx: FloatImage,
    dy: FloatImage,
}

impl AkazeDescriptor {
    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<[u8; AKAZE_BYTES]> {
        let (dx, dy) = gradients(img);
        let channels = Channels {
            intensity: smoothed(img, 1.0),
            dx,
            dy,
        };
        kps.par_iter().map(|kp| self.describe(&channels, kp)).collect()
    }

    /// Mean `(intensity, dx, dy)` per cell, derivatives in the keypoint frame
    fn cell_means(&self, ch: &Channels, kp: &Keypoint, side: usize) -> Vec<[f32; 3]> {
        let half = (2.5 * kp.size).max(6.0);
        let cell = 2.0 * half / side as f32;
        let step = cell / SAMPLES_PER_CELL_SIDE as f32;
        let (s, c) = kp.angle.sin_cos();
        let n = (SAMPLES_PER_CELL_SIDE * SAMPLES_PER_CELL_SIDE) as f32;

        let mut means = Vec::with_capacity(side * side);
        for cy in 0..side {
            for cx in 0..side {
                let mut acc = [0.0f32; 3];
                for sy in 0..SAMPLES_PER_CELL_SIDE {
                    for sx in 0..SAMPLES_PER_CELL_SIDE {
                        let u = -half + cx as f32 * cell + (sx as f32 + 0.5) * step;
                        let v = -half + cy as f32 * cell + (sy as f32 + 0.5) * step;
                        let (rx, ry) = rotate(u, v, s, c);
                        let (x, y) = (kp.x + rx, kp.y + ry);
                        let (gx, gy) = (ch.dx.bilinear(x, y), ch.dy.bilinear(x, y));
                        acc[0] += ch.intensity.bilinear(x, y);
                        acc[1] += c * gx + s * gy;
                        acc[2] += -s * gx + c * gy;
                    }
                }
                means.push(acc.map(|a| a / n));
            }
        }
        means
    }

    fn describe(&self, ch: &Channels, kp: &Keypoint) -> [u8; AKAZE_BYTES] {
        let mut bits = Vec::with_capacity(AKAZE_BYTES * 8);
        for side in GRID_SIDES {
            let means = self.cell_means(ch, kp, side);
            for i in 0..means.len() {
                for j in i + 1..means.len() {
                    for k in 0..3 {
                        bits.push(means[i][k] > means[j][k]);
                    }
                }
            }
        }
        let mut d = [0u8; AKAZE_BYTES];
        d.copy_from_slice(&pack_bits(bits, AKAZE_BYTES));
        d
    }
}
