use ftrack_core::{DetectorType, Image, Keypoint};
use crate::akaze::detect_akaze;
use crate::brisk::detect_brisk;
use crate::config::DetectorConfig;
use crate::corner_response::CornerDetector;
use crate::error::{DetectError, DetectResult};
use crate::fast::detect_fast;
use crate::orb::detect_orb;
use crate::sift::detect_sift;

/// FAST needs a 3-pixel border on each side
const MIN_SIZE: usize = 7;

/// Runs any of the supported detector strategies with a shared configuration
#[derive(Debug, Clone)]
pub struct KeypointDetector {
    cfg: DetectorConfig,
}

impl Default for KeypointDetector {
    fn default() -> Self {
        Self { cfg: DetectorConfig::default() }
    }
}

impl KeypointDetector {
    /// Creates a new detector with validation
    pub fn new(cfg: DetectorConfig) -> DetectResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Validates image data before processing
    fn validate_image(img: &Image) -> DetectResult<()> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidImageSize { width, height });
        }
        if width < MIN_SIZE || height < MIN_SIZE {
            return Err(DetectError::ImageTooSmall { width, height, min_size: MIN_SIZE });
        }
        Ok(())
    }

    /// Detect keypoints in full-image coordinates
    pub fn detect(&self, img: &Image, detector: DetectorType) -> DetectResult<Vec<Keypoint>> {
        Self::validate_image(img)?;

        let keypoints = match detector {
            DetectorType::ShiTomasi => CornerDetector::shi_tomasi(img, &self.cfg.shi_tomasi),
            DetectorType::Harris => CornerDetector::harris(img, &self.cfg.harris, self.cfg.harris_aperture),
            DetectorType::Fast => detect_fast(img, self.cfg.fast_threshold, self.cfg.fast_nms),
            DetectorType::Brisk => detect_brisk(img, &self.cfg.brisk),
            DetectorType::Orb => detect_orb(img, &self.cfg.orb),
            DetectorType::Akaze => detect_akaze(img, &self.cfg.akaze),
            DetectorType::Sift => detect_sift(img, &self.cfg.sift),
        };
        Ok(keypoints)
    }

    /// Get detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn create_corner_image(width: u32, height: u32) -> Image {
        let mut img = Image::from_pixel(width, height, Luma([50]));
        let (cx, cy) = (width / 2, height / 2);
        for y in cy - 6..=cy + 6 {
            for x in cx - 6..=cx + 6 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        img
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut cfg = DetectorConfig::default();
        cfg.fast_threshold = 0;
        assert!(KeypointDetector::new(cfg).is_err());
    }

    #[test]
    fn test_too_small_image() {
        let detector = KeypointDetector::default();
        let img = Image::new(6, 6);
        let result = detector.detect(&img, DetectorType::Fast);
        assert!(matches!(result, Err(DetectError::ImageTooSmall { .. })));
    }

    #[test]
    fn test_empty_image() {
        let detector = KeypointDetector::default();
        let img = Image::new(0, 0);
        let result = detector.detect(&img, DetectorType::Harris);
        assert!(matches!(result, Err(DetectError::InvalidImageSize { .. })));
    }

    #[test]
    fn test_every_strategy_runs_on_a_small_image() {
        let detector = KeypointDetector::default();
        let img = create_corner_image(96, 96);
        for &strategy in DetectorType::ALL {
            let kps = detector.detect(&img, strategy).unwrap();
            for kp in &kps {
                assert!(kp.x >= 0.0 && kp.x < 96.0, "{} produced x={}", strategy, kp.x);
                assert!(kp.y >= 0.0 && kp.y < 96.0, "{} produced y={}", strategy, kp.y);
                assert!(kp.size > 0.0);
            }
        }
    }

    #[test]
    fn test_fast_finds_square_corners() {
        let detector = KeypointDetector::default();
        let img = create_corner_image(64, 64);
        let kps = detector.detect(&img, DetectorType::Fast).unwrap();
        assert!(!kps.is_empty());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let detector = KeypointDetector::default();
        let img = create_corner_image(80, 80);
        for &strategy in DetectorType::ALL {
            let a = detector.detect(&img, strategy).unwrap();
            let b = detector.detect(&img, strategy).unwrap();
            assert_eq!(a, b, "{} is not deterministic", strategy);
        }
    }
}
