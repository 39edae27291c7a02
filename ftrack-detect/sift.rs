use ftrack_core::{FloatImage, Image, Keypoint};
use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SiftParams {
    pub n_octave_layers: usize,
    /// Contrast threshold on a 0..1 intensity scale, divided by the layer count
    pub contrast_threshold: f32,
    /// Principal-curvature ratio above which edge responses are rejected
    pub edge_threshold: f32,
    pub sigma: f32,
    pub max_octaves: usize,
}

impl Default for SiftParams {
    fn default() -> Self {
        Self {
            n_octave_layers: 3,
            contrast_threshold: 0.04,
            edge_threshold: 10.0,
            sigma: 1.6,
            max_octaves: 6,
        }
    }
}

/// Difference-of-Gaussians extrema with edge rejection and a dominant
/// gradient orientation per keypoint
pub fn detect_sift(img: &Image, params: &SiftParams) -> Vec<Keypoint> {
    let layers = params.n_octave_layers;
    let k = 2f32.powf(1.0 / layers as f32);
    let threshold = 0.5 * params.contrast_threshold / layers as f32;
    let edge = params.edge_threshold;
    let edge_limit = (edge + 1.0) * (edge + 1.0) / edge;

    let mut base = FloatImage::from_gray(img);
    base.data.iter_mut().for_each(|v| *v /= 255.0);
    // Input is assumed to carry a blur of 0.5
    let mut octave_base = base.gaussian_blur((params.sigma * params.sigma - 0.25).max(0.01).sqrt());

    let mut keypoints = Vec::new();
    for octave in 0..params.max_octaves {
        if octave_base.width < 16 || octave_base.height < 16 {
            break;
        }
        let octave_scale = (1usize << octave) as f32;

        let mut gaussians = vec![octave_base.clone()];
        for i in 1..layers + 3 {
            let prev_sigma = params.sigma * k.powi(i as i32 - 1);
            let total_sigma = prev_sigma * k;
            let step = (total_sigma * total_sigma - prev_sigma * prev_sigma).sqrt();
            let next = gaussians[i - 1].gaussian_blur(step);
            gaussians.push(next);
        }
        let dogs: Vec<FloatImage> = gaussians.windows(2).map(|g| g[1].difference(&g[0])).collect();

        for layer in 1..=layers {
            let (prev, cur, next) = (&dogs[layer - 1], &dogs[layer], &dogs[layer + 1]);
            let (w, h) = (cur.width, cur.height);
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    let v = cur.at(x, y);
                    if v.abs() <= threshold {
                        continue;
                    }
                    if !is_extremum(v, x, y, prev, cur, next) {
                        continue;
                    }
                    // Hessian of the DoG layer for edge rejection
                    let dxx = cur.at(x + 1, y) + cur.at(x - 1, y) - 2.0 * v;
                    let dyy = cur.at(x, y + 1) + cur.at(x, y - 1) - 2.0 * v;
                    let dxy = (cur.at(x + 1, y + 1) - cur.at(x + 1, y - 1) - cur.at(x - 1, y + 1)
                        + cur.at(x - 1, y - 1))
                        / 4.0;
                    let tr = dxx + dyy;
                    let det = dxx * dyy - dxy * dxy;
                    if det <= 0.0 || tr * tr / det >= edge_limit {
                        continue;
                    }

                    let layer_sigma = params.sigma * k.powi(layer as i32);
                    let angle = dominant_orientation(&gaussians[layer], x, y, 1.5 * layer_sigma);
                    keypoints.push(
                        Keypoint::new(
                            x as f32 * octave_scale,
                            y as f32 * octave_scale,
                            2.0 * layer_sigma * octave_scale,
                        )
                        .with_response(v.abs())
                        .with_angle(angle)
                        .with_octave(octave as i32),
                    );
                }
            }
        }

        octave_base = gaussians[layers].half_sample();
    }

    keypoints
}

fn is_extremum(v: f32, x: usize, y: usize, prev: &FloatImage, cur: &FloatImage, next: &FloatImage) -> bool {
    let mut is_max = true;
    let mut is_min = true;
    for img in [prev, cur, next] {
        for yy in y - 1..=y + 1 {
            for xx in x - 1..=x + 1 {
                if std::ptr::eq(img, cur) && xx == x && yy == y {
                    continue;
                }
                let n = img.at(xx, yy);
                is_max &= v > n;
                is_min &= v < n;
            }
        }
    }
    is_max || is_min
}

/// Peak of a 36-bin gradient orientation histogram around (x, y)
fn dominant_orientation(img: &FloatImage, x: usize, y: usize, sigma: f32) -> f32 {
    const BINS: usize = 36;
    let radius = (3.0 * sigma).round() as i64;
    let mut hist = [0.0f32; BINS];
    let (cx, cy) = (x as i64, y as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (px, py) = (cx + dx, cy + dy);
            let gx = img.at_clamped(px + 1, py) - img.at_clamped(px - 1, py);
            let gy = img.at_clamped(px, py + 1) - img.at_clamped(px, py - 1);
            let weight = (-((dx * dx + dy * dy) as f32) / (2.0 * sigma * sigma)).exp();
            let theta = gy.atan2(gx).rem_euclid(2.0 * PI);
            let bin = ((theta / (2.0 * PI)) * BINS as f32) as usize % BINS;
            hist[bin] += weight * (gx * gx + gy * gy).sqrt();
        }
    }
    let (best, _) = hist
        .iter()
        .enumerate()
        .fold((0usize, f32::MIN), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) });
    (best as f32 + 0.5) * 2.0 * PI / BINS as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_uniform_image_has_no_extrema() {
        let img = Image::from_pixel(64, 64, Luma([100]));
        assert!(detect_sift(&img, &SiftParams::default()).is_empty());
    }

    #[test]
    fn test_detects_bright_blob() {
        let img = Image::from_fn(64, 64, |x, y| {
            let d2 = (x as f32 - 32.0).powi(2) + (y as f32 - 32.0).powi(2);
            Luma([(40.0 + 200.0 * (-d2 / 18.0).exp()) as u8])
        });
        let kps = detect_sift(&img, &SiftParams::default());
        assert!(!kps.is_empty());
        let closest = kps
            .iter()
            .map(|kp| ((kp.x - 32.0).powi(2) + (kp.y - 32.0).powi(2)).sqrt())
            .fold(f32::MAX, f32::min);
        assert!(closest < 3.0, "closest keypoint {} px from blob centre", closest);
    }

    #[test]
    fn test_orientation_is_in_range() {
        let mut img = FloatImage::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                img.data[y * 20 + x] = x as f32;
            }
        }
        let angle = dominant_orientation(&img, 10, 10, 2.0);
        assert!((0.0..2.0 * PI).contains(&angle));
        // Gradient points along +x
        assert!(angle < 0.2 || angle > 2.0 * PI - 0.2);
    }
}
