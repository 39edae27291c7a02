use ftrack_core::{FloatImage, Image, Keypoint};
use imageproc::corners::{corners_fast9, Corner};
use crate::refinement::KeypointRefinement;

/// Diameter reported for FAST keypoints (the Bresenham circle of radius 3)
pub const FAST_KEYPOINT_SIZE: f32 = 7.0;

/// FAST-9 corners, optionally reduced to 3x3 score maxima
pub fn detect_fast(img: &Image, threshold: u8, non_max_suppression: bool) -> Vec<Keypoint> {
    let corners = corners_fast9(img, threshold);
    let corners = if non_max_suppression {
        suppress_corners(&corners, img.width() as usize, img.height() as usize)
    } else {
        corners
    };

    corners
        .into_iter()
        .map(|c| Keypoint::new(c.x as f32, c.y as f32, FAST_KEYPOINT_SIZE).with_response(c.score))
        .collect()
}

/// Keep corners whose score is the maximum of their 3x3 neighbourhood
pub(crate) fn suppress_corners(corners: &[Corner], width: usize, height: usize) -> Vec<Corner> {
    let mut scores = FloatImage::new(width, height);
    for c in corners {
        scores.data[c.y as usize * width + c.x as usize] = c.score + 1.0;
    }
    KeypointRefinement::local_maxima(&scores, 1, 0.0)
        .into_iter()
        .map(|(x, y, s)| Corner::new(x as u32, y as u32, s - 1.0))
        .collect()
}
