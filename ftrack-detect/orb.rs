use ftrack_core::{Image, Keypoint};
use rayon::prelude::*;
use crate::fast::{detect_fast, FAST_KEYPOINT_SIZE};
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::ScaleLevel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrbParams {
    pub n_features: usize,
    pub scale_factor: f32,
    pub n_levels: usize,
    pub fast_threshold: u8,
    /// Keypoints closer than this to the level border are discarded
    pub edge_threshold: usize,
    pub patch_size: usize,
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            n_features: 500,
            scale_factor: 1.2,
            n_levels: 8,
            fast_threshold: 20,
            edge_threshold: 31,
            patch_size: 31,
        }
    }
}

/// Harris measure of a single pixel over a `block x block` window
fn harris_score_at(img: &Image, x: u32, y: u32, block: i64, k: f32) -> f32 {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let px = |xx: i64, yy: i64| -> f32 {
        img.as_raw()[(yy.clamp(0, h - 1) * w + xx.clamp(0, w - 1)) as usize] as f32
    };
    let r = block / 2;
    let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
    for dy in -r..=r {
        for dx in -r..=r {
            let (xx, yy) = (x as i64 + dx, y as i64 + dy);
            let ix = px(xx + 1, yy) - px(xx - 1, yy);
            let iy = px(xx, yy + 1) - px(xx, yy - 1);
            a += ix * ix;
            b += iy * iy;
            c += ix * iy;
        }
    }
    a * b - c * c - k * (a + b) * (a + b)
}

/// Number of features assigned to each level, decaying with the level scale
fn features_per_level(params: &OrbParams, n_levels: usize) -> Vec<usize> {
    let factor = 1.0 / params.scale_factor;
    let first = params.n_features as f32 * (1.0 - factor) / (1.0 - factor.powi(n_levels as i32));
    let mut remaining = params.n_features;
    let mut out = Vec::with_capacity(n_levels);
    for level in 0..n_levels {
        let n = if level + 1 == n_levels {
            remaining
        } else {
            ((first * factor.powi(level as i32)).round() as usize).min(remaining)
        };
        remaining -= n;
        out.push(n);
    }
    out
}

fn detect_level(img: &Image, level: &ScaleLevel, budget: usize, params: &OrbParams) -> Vec<Keypoint> {
    let border = params.edge_threshold as f32;
    let (w, h) = (level.width as f32, level.height as f32);

    let mut candidates: Vec<Keypoint> = detect_fast(img, params.fast_threshold, true)
        .into_iter()
        .filter(|kp| kp.x >= border && kp.y >= border && kp.x < w - border && kp.y < h - border)
        .map(|kp| {
            let score = harris_score_at(img, kp.x as u32, kp.y as u32, 7, 0.04);
            kp.with_response(score)
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(budget);

    candidates
        .into_iter()
        .map(|kp| {
            let angle = KeypointRefinement::compute_orientation(img, kp.x, kp.y, params.patch_size);
            Keypoint {
                x: kp.x * level.scale,
                y: kp.y * level.scale,
                size: params.patch_size as f32 * level.scale,
                angle,
                response: kp.response,
                octave: level.level as i32,
            }
        })
        .collect()
}

/// Oriented FAST keypoints over a scale pyramid ranked by Harris score
pub fn detect_orb(img: &Image, params: &OrbParams) -> Vec<Keypoint> {
    let min_size = 2 * params.edge_threshold + 1;
    let levels = ImagePyramid::generate_scale_levels(
        img.width() as usize,
        img.height() as usize,
        params.scale_factor,
        params.n_levels,
        min_size.max(FAST_KEYPOINT_SIZE as usize),
    );
    if levels.is_empty() {
        return Vec::new();
    }
    let pyramid = ImagePyramid::build_image_pyramid(img, &levels);
    let budgets = features_per_level(params, levels.len());

    let per_level: Vec<Vec<Keypoint>> = levels
        .par_iter()
        .zip(pyramid.par_iter())
        .zip(budgets.par_iter())
        .map(|((level, scaled), &budget)| detect_level(scaled, level, budget, params))
        .collect();

    per_level.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Bright squares of side `cell` on a dark background, one every `2 * cell` pixels
    fn squares(size: u32, cell: u32) -> Image {
        Image::from_fn(size, size, |x, y| {
            if (x / cell) % 2 == 1 && (y / cell) % 2 == 1 { Luma([220]) } else { Luma([30]) }
        })
    }

    #[test]
    fn test_features_per_level_sums_to_total() {
        let params = OrbParams::default();
        let budgets = features_per_level(&params, 8);
        assert_eq!(budgets.iter().sum::<usize>(), 500);
        assert!(budgets[0] > budgets[7]);
    }

    #[test]
    fn test_orb_respects_budget_and_border() {
        let img = squares(200, 10);
        let params = OrbParams::default();
        let kps = detect_orb(&img, &params);
        assert!(!kps.is_empty());
        assert!(kps.len() <= params.n_features);
        for kp in &kps {
            assert!(kp.x >= 30.0 && kp.y >= 30.0);
            assert!(kp.x < 170.0 * 1.01 && kp.y < 170.0 * 1.01);
            assert!(kp.angle.is_finite());
        }
    }

    #[test]
    fn test_tiny_image_yields_nothing() {
        let img = squares(40, 4);
        assert!(detect_orb(&img, &OrbParams::default()).is_empty());
    }
}
