use ftrack_core::{FloatImage, Image, Keypoint};

/// Keypoint post-processing shared by the detectors
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// Greedy non-maximum suppression: strongest keypoints first, anything
    /// closer than `min_distance` to an accepted keypoint is dropped.
    /// The result is ordered by descending response.
    pub fn non_maximum_suppression(keypoints: &[Keypoint], min_distance: f32) -> Vec<Keypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }

        let mut sorted_keypoints = keypoints.to_vec();
        // Stable sort keeps raster order among equal responses
        sorted_keypoints.sort_by(|a, b| {
            b.response
                .partial_cmp(&a.response)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut suppressed: Vec<Keypoint> = Vec::new();
        let min_distance_sq = min_distance * min_distance;

        for candidate in sorted_keypoints {
            let is_local_max = suppressed.iter().all(|existing| {
                let dx = candidate.x - existing.x;
                let dy = candidate.y - existing.y;
                dx * dx + dy * dy >= min_distance_sq
            });

            if is_local_max {
                suppressed.push(candidate);
            }
        }

        suppressed
    }

    /// Pixels of a response map that are the maximum of their
    /// `(2 * radius + 1)^2` neighbourhood and exceed `min_response`.
    /// Ties are resolved in favour of the first pixel in raster order.
    pub fn local_maxima(response: &FloatImage, radius: usize, min_response: f32) -> Vec<(usize, usize, f32)> {
        let r = radius as i64;
        let mut peaks = Vec::new();
        for y in 0..response.height {
            for x in 0..response.width {
                let v = response.at(x, y);
                if v <= min_response {
                    continue;
                }
                let mut is_max = true;
                'window: for dy in -r..=r {
                    for dx in -r..=r {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                        if nx < 0 || ny < 0 || nx >= response.width as i64 || ny >= response.height as i64 {
                            continue;
                        }
                        let n = response.at(nx as usize, ny as usize);
                        let earlier = (dy, dx) < (0, 0);
                        if n > v || (earlier && n == v) {
                            is_max = false;
                            break 'window;
                        }
                    }
                }
                if is_max {
                    peaks.push((x, y, v));
                }
            }
        }
        peaks
    }

    /// Orientation from the intensity centroid of a square patch
    pub fn compute_orientation(img: &Image, x: f32, y: f32, patch_size: usize) -> f32 {
        let half = (patch_size / 2) as i64;
        let (w, h) = (img.width() as i64, img.height() as i64);
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        let raw = img.as_raw();

        let mut m10 = 0i64;
        let mut m01 = 0i64;
        for dy in -half..=half {
            let yy = cy + dy;
            if yy < 0 || yy >= h {
                continue;
            }
            for dx in -half..=half {
                let xx = cx + dx;
                if xx < 0 || xx >= w {
                    continue;
                }
                let val = raw[(yy * w + xx) as usize] as i64;
                m10 += dx * val;
                m01 += dy * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }
}
