use std::path::PathBuf;

use ftrack_core::{DMatch, Image, Keypoint};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use log::debug;

use crate::error::{TrackError, TrackResult};
use crate::frame::FrameRecord;
use crate::plan::Configuration;

const KEYPOINT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const MATCH_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Writes side-by-side match images into `<output_dir>/matches/`
pub struct MatchVisualizer {
    dir: PathBuf,
}

impl MatchVisualizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: output_dir.into().join("matches"),
        }
    }

    pub fn path(&self, config: &Configuration, frame: usize) -> PathBuf {
        self.dir.join(format!("matches_{}_{}.png", config, frame))
    }

    /// Previous frame on the left, current frame on the right
    pub fn save(
        &self,
        config: &Configuration,
        previous: &FrameRecord,
        current: &FrameRecord,
        matches: &[DMatch],
    ) -> TrackResult<PathBuf> {
        let canvas = render_matches(
            &previous.image,
            &previous.keypoints,
            &current.image,
            &current.keypoints,
            matches,
        );
        let path = self.path(config, current.index);
        std::fs::create_dir_all(&self.dir).map_err(|source| TrackError::Io {
            path: self.dir.clone(),
            source,
        })?;
        canvas.save(&path).map_err(|e| TrackError::Io {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;
        debug!("match image written to {}", path.display());
        Ok(path)
    }
}

pub fn render_matches(
    left: &Image,
    left_kps: &[Keypoint],
    right: &Image,
    right_kps: &[Keypoint],
    matches: &[DMatch],
) -> RgbImage {
    let offset = left.width();
    let height = left.height().max(right.height());
    let mut canvas = RgbImage::new(left.width() + right.width(), height);
    for (img, dx) in [(left, 0), (right, offset)] {
        for (x, y, p) in img.enumerate_pixels() {
            canvas.put_pixel(x + dx, y, Rgb([p[0], p[0], p[0]]));
        }
    }

    let radius = |kp: &Keypoint| ((kp.size / 2.0).round() as i32).max(2);
    for kp in left_kps {
        draw_hollow_circle_mut(&mut canvas, (kp.x as i32, kp.y as i32), radius(kp), KEYPOINT_COLOR);
    }
    for kp in right_kps {
        draw_hollow_circle_mut(
            &mut canvas,
            (kp.x as i32 + offset as i32, kp.y as i32),
            radius(kp),
            KEYPOINT_COLOR,
        );
    }
    for m in matches {
        if let (Some(a), Some(b)) = (left_kps.get(m.query_idx), right_kps.get(m.train_idx)) {
            draw_line_segment_mut(&mut canvas, (a.x, a.y), (b.x + offset as f32, b.y), MATCH_COLOR);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftrack_core::{DescriptorType, DetectorType, MatcherType, SelectorType};
    use image::Luma;

    #[test]
    fn test_canvas_layout_and_line() {
        let left = Image::from_pixel(20, 10, Luma([50]));
        let right = Image::from_pixel(20, 12, Luma([200]));
        let kps = vec![Keypoint::new(5.0, 5.0, 4.0)];
        let matches = vec![DMatch { query_idx: 0, train_idx: 0, distance: 0.0 }];
        let canvas = render_matches(&left, &kps, &right, &kps, &matches);
        assert_eq!(canvas.dimensions(), (40, 12));
        assert_eq!(canvas.get_pixel(15, 1), &Rgb([50, 50, 50]));
        assert_eq!(canvas.get_pixel(35, 11), &Rgb([200, 200, 200]));
        // The match line runs horizontally between the two keypoints
        assert_eq!(canvas.get_pixel(15, 5), &MATCH_COLOR);
    }

    #[test]
    fn test_file_name() {
        let vis = MatchVisualizer::new("out");
        let config = Configuration {
            selector: SelectorType::NearestNeighbor,
            matcher: MatcherType::BruteForce,
            detector: DetectorType::Fast,
            descriptor: DescriptorType::Brief,
        };
        assert_eq!(
            vis.path(&config, 3),
            PathBuf::from("out/matches/matches_SEL_NN_MAT_BF_FAST_BRIEF_3.png")
        );
    }
}
