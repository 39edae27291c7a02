use ftrack_core::Image;
use image::imageops::{self, FilterType};
use crate::types::ScaleLevel;

/// Image pyramid operations for multi-scale feature detection
pub struct ImagePyramid;

impl ImagePyramid {
    /// Generate scale levels, stopping once a level gets smaller than `min_size`
    pub fn generate_scale_levels(
        width: usize,
        height: usize,
        scale_factor: f32,
        max_levels: usize,
        min_size: usize,
    ) -> Vec<ScaleLevel> {
        let mut levels = Vec::new();
        let mut current_scale = 1.0f32;

        for level in 0..max_levels {
            let scaled_width = ((width as f32) / current_scale).round() as usize;
            let scaled_height = ((height as f32) / current_scale).round() as usize;

            if scaled_width < min_size || scaled_height < min_size {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });

            current_scale *= scale_factor;
        }

        levels
    }

    /// Build image pyramid from base image
    pub fn build_image_pyramid(img: &Image, scale_levels: &[ScaleLevel]) -> Vec<Image> {
        scale_levels
            .iter()
            .map(|scale_level| {
                if scale_level.level == 0 {
                    img.clone()
                } else {
                    imageops::resize(
                        img,
                        scale_level.width as u32,
                        scale_level.height as u32,
                        FilterType::Triangle,
                    )
                }
            })
            .collect()
    }
}
