use ftrack_core::{FloatImage, Image, Keypoint};
use crate::refinement::KeypointRefinement;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AkazeParams {
    /// Minimum scale-normalised Hessian response on a 0..1 intensity scale
    pub threshold: f32,
    pub octaves: usize,
    pub sublevels: usize,
    pub base_sigma: f32,
}

impl Default for AkazeParams {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            octaves: 4,
            sublevels: 4,
            base_sigma: 1.6,
        }
    }
}

/// Scale-normalised determinant of the Hessian
fn hessian_response(img: &FloatImage, sigma: f32) -> FloatImage {
    let norm = sigma.powi(4);
    let mut out = FloatImage::new(img.width, img.height);
    for y in 0..img.height as i64 {
        for x in 0..img.width as i64 {
            let c = img.at_clamped(x, y);
            let dxx = img.at_clamped(x + 1, y) + img.at_clamped(x - 1, y) - 2.0 * c;
            let dyy = img.at_clamped(x, y + 1) + img.at_clamped(x, y - 1) - 2.0 * c;
            let dxy = (img.at_clamped(x + 1, y + 1) - img.at_clamped(x + 1, y - 1)
                - img.at_clamped(x - 1, y + 1)
                + img.at_clamped(x - 1, y - 1))
                / 4.0;
            out.data[y as usize * img.width + x as usize] = norm * (dxx * dyy - dxy * dxy);
        }
    }
    out
}

/// Determinant-of-Hessian blobs over a Gaussian scale space.
/// Maxima must dominate their 3x3 neighbourhood in the own and both adjacent
/// sublevels.
pub fn detect_akaze(img: &Image, params: &AkazeParams) -> Vec<Keypoint> {
    let mut level_img = FloatImage::from_gray(img);
    level_img.data.iter_mut().for_each(|v| *v /= 255.0);

    let mut keypoints = Vec::new();
    for octave in 0..params.octaves {
        if level_img.width < 16 || level_img.height < 16 {
            break;
        }
        let octave_scale = (1usize << octave) as f32;

        // Sigma is expressed in the pixels of the current octave
        let sigmas: Vec<f32> = (0..params.sublevels)
            .map(|s| params.base_sigma * 2f32.powf(s as f32 / params.sublevels as f32))
            .collect();
        let responses: Vec<FloatImage> = sigmas
            .iter()
            .map(|&s| hessian_response(&level_img.gaussian_blur(s), s))
            .collect();

        for (s, response) in responses.iter().enumerate() {
            let peaks = KeypointRefinement::local_maxima(response, 1, params.threshold);
            for (x, y, v) in peaks {
                let dominates_neighbours = [s.checked_sub(1), Some(s + 1)]
                    .into_iter()
                    .flatten()
                    .filter_map(|n| responses.get(n))
                    .all(|other| {
                        (-1i64..=1).all(|dy| {
                            (-1i64..=1).all(|dx| other.at_clamped(x as i64 + dx, y as i64 + dy) < v)
                        })
                    });
                if !dominates_neighbours {
                    continue;
                }

                let size = 2.0 * 1.5 * sigmas[s] * octave_scale;
                let (fx, fy) = (x as f32 * octave_scale, y as f32 * octave_scale);
                let patch = ((size as usize) | 1).max(7);
                let angle = KeypointRefinement::compute_orientation(img, fx, fy, patch);
                keypoints.push(
                    Keypoint::new(fx, fy, size)
                        .with_response(v)
                        .with_angle(angle)
                        .with_octave(octave as i32),
                );
            }
        }

        level_img = level_img.gaussian_blur(params.base_sigma).half_sample();
    }

    keypoints
}
