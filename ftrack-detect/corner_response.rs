use ftrack_core::{FloatImage, Image, Keypoint};
use crate::refinement::KeypointRefinement;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the gradient-covariance corner detectors
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerParams {
    /// Side of the window the structure tensor is summed over
    pub block_size: usize,
    /// Harris sensitivity `k`
    pub k: f32,
    /// Shi-Tomasi: minimum accepted quality relative to the best corner
    pub quality_level: f32,
    /// Shi-Tomasi: minimum distance between accepted corners
    pub min_distance: f32,
    /// Harris: minimum response after normalising to 0..255
    pub min_response: f32,
}

impl CornerParams {
    pub fn shi_tomasi() -> Self {
        Self {
            block_size: 4,
            k: 0.04,
            quality_level: 0.01,
            min_distance: 4.0,
            min_response: 0.0,
        }
    }

    pub fn harris() -> Self {
        Self {
            block_size: 2,
            k: 0.04,
            quality_level: 0.0,
            min_distance: 0.0,
            min_response: 100.0,
        }
    }
}

/// Structure tensor components `(Ixx, Iyy, Ixy)` summed over a box window
fn structure_tensor(img: &Image, block_size: usize) -> (FloatImage, FloatImage, FloatImage) {
    let (gx, gy) = FloatImage::from_gray(img).sobel();
    let (w, h) = (gx.width, gx.height);
    let lo = -((block_size as i64 - 1) / 2);
    let hi = block_size as i64 / 2;

    let mut ixx = FloatImage::new(w, h);
    let mut iyy = FloatImage::new(w, h);
    let mut ixy = FloatImage::new(w, h);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
            for dy in lo..=hi {
                for dx in lo..=hi {
                    let a = gx.at_clamped(x + dx, y + dy);
                    let b = gy.at_clamped(x + dx, y + dy);
                    sxx += a * a;
                    syy += b * b;
                    sxy += a * b;
                }
            }
            let idx = y as usize * w + x as usize;
            ixx.data[idx] = sxx;
            iyy.data[idx] = syy;
            ixy.data[idx] = sxy;
        }
    }
    (ixx, iyy, ixy)
}

/// Gradient-covariance corner detectors
pub struct CornerDetector;

impl CornerDetector {
    /// Minimum-eigenvalue corners ("good features to track").
    /// Output is ordered by descending quality.
    pub fn shi_tomasi(img: &Image, params: &CornerParams) -> Vec<Keypoint> {
        let (ixx, iyy, ixy) = structure_tensor(img, params.block_size);
        let mut response = FloatImage::new(ixx.width, ixx.height);
        for (i, r) in response.data.iter_mut().enumerate() {
            let (a, b, c) = (ixx.data[i], iyy.data[i], ixy.data[i]);
            *r = 0.5 * ((a + b) - ((a - b) * (a - b) + 4.0 * c * c).sqrt());
        }

        let max_response = response.data.iter().copied().fold(0.0f32, f32::max);
        if max_response <= 0.0 {
            return Vec::new();
        }
        let threshold = params.quality_level * max_response;
        let max_corners = (response.width * response.height) / (params.min_distance.max(1.0) as usize);

        let candidates: Vec<Keypoint> = KeypointRefinement::local_maxima(&response, 1, threshold)
            .into_iter()
            .map(|(x, y, v)| Keypoint::new(x as f32, y as f32, params.block_size as f32).with_response(v))
            .collect();

        let mut corners = KeypointRefinement::non_maximum_suppression(&candidates, params.min_distance);
        corners.truncate(max_corners);
        corners
    }

    /// Harris corners: response normalised to 0..255, thresholded, and
    /// overlapping keypoints resolved in favour of the stronger one.
    pub fn harris(img: &Image, params: &CornerParams, aperture_size: usize) -> Vec<Keypoint> {
        let (ixx, iyy, ixy) = structure_tensor(img, params.block_size);
        let mut response = FloatImage::new(ixx.width, ixx.height);
        for (i, r) in response.data.iter_mut().enumerate() {
            let (a, b, c) = (ixx.data[i], iyy.data[i], ixy.data[i]);
            let trace = a + b;
            *r = a * b - c * c - params.k * trace * trace;
        }

        let (min, max) = response
            .data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if !(max > min) {
            return Vec::new();
        }
        let scale = 255.0 / (max - min);

        let size = 2.0 * aperture_size as f32;
        let mut candidates = Vec::new();
        for y in 0..response.height {
            for x in 0..response.width {
                let normalized = (response.at(x, y) - min) * scale;
                if normalized > params.min_response {
                    candidates.push(Keypoint::new(x as f32, y as f32, size).with_response(normalized));
                }
            }
        }

        // Two keypoints overlap when their circles of diameter `size` intersect
        KeypointRefinement::non_maximum_suppression(&candidates, size)
    }
}
