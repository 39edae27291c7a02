use ftrack_core::Keypoint;
use log::info;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle around the preceding vehicle.
/// Points are rounded to the nearest pixel (ties to even) and then tested
/// half-open: `left <= x < left + width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleRegion {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for VehicleRegion {
    fn default() -> Self {
        Self {
            left: 535.0,
            top: 180.0,
            width: 180.0,
            height: 150.0,
        }
    }
}

impl VehicleRegion {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (x, y) = (x.round_ties_even(), y.round_ties_even());
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// Keep only keypoints inside `region`; the identity when `enabled` is false
pub fn focus_on_vehicle(keypoints: Vec<Keypoint>, enabled: bool, region: &VehicleRegion) -> Vec<Keypoint> {
    if !enabled {
        return keypoints;
    }
    keypoints.into_iter().filter(|kp| region.contains(kp.x, kp.y)).collect()
}

/// Keep the `max` strongest keypoints; equal responses keep their original
/// order. A no-op when `enabled` is false.
pub fn limit_keypoints(mut keypoints: Vec<Keypoint>, enabled: bool, max: usize) -> Vec<Keypoint> {
    if !enabled || keypoints.len() <= max {
        return keypoints;
    }
    keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
    keypoints.truncate(max);
    info!("NOTE: keypoints have been limited to {}", max);
    keypoints
}
