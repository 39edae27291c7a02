use ftrack_core::{Image, Keypoint};
use rayon::prelude::*;
use crate::fast::detect_fast;
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::ScaleLevel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of a keypoint found on the base layer
const BRISK_BASIC_SIZE: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BriskParams {
    pub threshold: u8,
    /// Number of octaves; each octave contributes an octave and an intra-octave layer
    pub octaves: usize,
    /// Cross-layer suppression radius in base-image pixels
    pub suppression_radius: f32,
}

impl Default for BriskParams {
    fn default() -> Self {
        Self {
            threshold: 30,
            octaves: 3,
            suppression_radius: 4.0,
        }
    }
}

/// Octave layers at scales 2^i and intra-octave layers at 1.5 * 2^i
fn brisk_layers(width: usize, height: usize, octaves: usize) -> Vec<ScaleLevel> {
    let mut layers = Vec::new();
    for i in 0..octaves {
        let octave_scale = (1usize << i) as f32;
        for scale in [octave_scale, 1.5 * octave_scale] {
            let w = (width as f32 / scale).round() as usize;
            let h = (height as f32 / scale).round() as usize;
            if w < 16 || h < 16 {
                return layers;
            }
            layers.push(ScaleLevel {
                level: layers.len(),
                scale,
                width: w,
                height: h,
            });
        }
    }
    layers
}

/// Multi-scale FAST corners with suppression across layers
pub fn detect_brisk(img: &Image, params: &BriskParams) -> Vec<Keypoint> {
    let layers = brisk_layers(img.width() as usize, img.height() as usize, params.octaves);
    let pyramid = ImagePyramid::build_image_pyramid(img, &layers);
    let (max_x, max_y) = (img.width().saturating_sub(1) as f32, img.height().saturating_sub(1) as f32);

    let candidates: Vec<Keypoint> = layers
        .par_iter()
        .zip(pyramid.par_iter())
        .flat_map_iter(|(layer, scaled)| {
            detect_fast(scaled, params.threshold, true)
                .into_iter()
                .map(move |kp| Keypoint {
                    x: (kp.x * layer.scale).min(max_x),
                    y: (kp.y * layer.scale).min(max_y),
                    size: BRISK_BASIC_SIZE * layer.scale,
                    angle: 0.0,
                    response: kp.response,
                    octave: layer.level as i32,
                })
                .collect::<Vec<_>>()
        })
        .collect();

    KeypointRefinement::non_maximum_suppression(&candidates, params.suppression_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_layer_scales() {
        let layers = brisk_layers(640, 480, 3);
        let scales: Vec<f32> = layers.iter().map(|l| l.scale).collect();
        assert_eq!(scales, vec![1.0, 1.5, 2.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn test_detects_blob_corners() {
        let mut img = Image::from_pixel(120, 120, Luma([40]));
        for y in 40..80 {
            for x in 40..80 {
                img.put_pixel(x, y, Luma([230]));
            }
        }
        let kps = detect_brisk(&img, &BriskParams::default());
        assert!(!kps.is_empty());
        for (i, a) in kps.iter().enumerate() {
            assert!(a.size >= BRISK_BASIC_SIZE);
            for b in &kps[i + 1..] {
                let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                assert!(d >= 4.0);
            }
        }
    }
}
