use crate::akaze::AkazeParams;
use crate::brisk::BriskParams;
use crate::corner_response::CornerParams;
use crate::error::{DetectError, DetectResult};
use crate::orb::OrbParams;
use crate::sift::SiftParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for every detector strategy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    pub shi_tomasi: CornerParams,
    pub harris: CornerParams,
    /// Sobel aperture the Harris keypoint size is derived from
    pub harris_aperture: usize,
    pub fast_threshold: u8,
    pub fast_nms: bool,
    pub brisk: BriskParams,
    pub orb: OrbParams,
    pub akaze: AkazeParams,
    pub sift: SiftParams,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            shi_tomasi: CornerParams::shi_tomasi(),
            harris: CornerParams::harris(),
            harris_aperture: 3,
            fast_threshold: 30,
            fast_nms: true,
            brisk: BriskParams::default(),
            orb: OrbParams::default(),
            akaze: AkazeParams::default(),
            sift: SiftParams::default(),
        }
    }
}

impl DetectorConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> DetectResult<()> {
        for t in [self.fast_threshold, self.brisk.threshold, self.orb.fast_threshold] {
            if t == 0 || t > 127 {
                return Err(DetectError::InvalidThreshold(t));
            }
        }
        if self.shi_tomasi.block_size == 0 || self.harris.block_size == 0 {
            return Err(DetectError::InvalidParameter { name: "block_size", value: 0.0 });
        }
        if self.orb.scale_factor <= 1.0 {
            return Err(DetectError::InvalidParameter {
                name: "orb.scale_factor",
                value: self.orb.scale_factor,
            });
        }
        if self.orb.patch_size % 2 == 0 {
            return Err(DetectError::InvalidParameter {
                name: "orb.patch_size",
                value: self.orb.patch_size as f32,
            });
        }
        if self.sift.n_octave_layers == 0 {
            return Err(DetectError::InvalidParameter { name: "sift.n_octave_layers", value: 0.0 });
        }
        if self.akaze.sublevels == 0 {
            return Err(DetectError::InvalidParameter { name: "akaze.sublevels", value: 0.0 });
        }
        Ok(())
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "DetectorConfig: fast_threshold={}, nms={}, orb_features={}, orb_levels={}, brisk_threshold={}, sift_layers={}, akaze_threshold={}",
            self.fast_threshold,
            self.fast_nms,
            self.orb.n_features,
            self.orb.n_levels,
            self.brisk.threshold,
            self.sift.n_octave_layers,
            self.akaze.threshold
        )
    }
}
