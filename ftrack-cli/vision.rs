use std::path::PathBuf;
use std::time::Instant;

use ftrack_core::{
    DMatch, DescriptorCategory, DescriptorType, Descriptors, DetectorType, Image, Keypoint, MatcherType,
    SelectorType,
};
use ftrack_describe::DescriptorExtractor;
use ftrack_detect::KeypointDetector;
use ftrack_match::DescriptorMatcher;
use log::debug;

use crate::config::BenchmarkConfig;
use crate::error::{TrackError, TrackResult};

/// Supplies decoded grayscale frames by index
pub trait FrameSource: Send + Sync {
    fn load(&self, index: usize) -> TrackResult<Image>;
}

/// Numbered image files below `<data_path>images/`
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSequence {
    pub data_path: String,
    pub prefix: String,
    pub extension: String,
    pub fill_width: usize,
}

impl ImageSequence {
    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self {
            data_path: config.data_path.clone(),
            prefix: config.image_prefix.clone(),
            extension: config.image_extension.clone(),
            fill_width: config.fill_width,
        }
    }

    pub fn path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!(
            "{}images/{}{:0width$}{}",
            self.data_path,
            self.prefix,
            index,
            self.extension,
            width = self.fill_width
        ))
    }
}

impl FrameSource for ImageSequence {
    fn load(&self, index: usize) -> TrackResult<Image> {
        let path = self.path(index);
        debug!("loading {}", path.display());
        match image::open(&path) {
            Ok(img) => Ok(img.to_luma8()),
            Err(source) => Err(TrackError::ImageLoad { path, source }),
        }
    }
}

/// Detection, description and matching, each returning its result and
/// the elapsed wall time in milliseconds
pub trait VisionBackend: Send + Sync {
    fn detect(&self, img: &Image, detector: DetectorType) -> TrackResult<(Vec<Keypoint>, f64)>;

    fn describe(
        &self,
        keypoints: &[Keypoint],
        img: &Image,
        descriptor: DescriptorType,
    ) -> TrackResult<(Descriptors, f64)>;

    #[allow(clippy::too_many_arguments)]
    fn match_descriptors(
        &self,
        keypoints_prev: &[Keypoint],
        keypoints_cur: &[Keypoint],
        descriptors_prev: &Descriptors,
        descriptors_cur: &Descriptors,
        category: DescriptorCategory,
        matcher: MatcherType,
        selector: SelectorType,
    ) -> TrackResult<(Vec<DMatch>, f64)>;
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Backend built on the workspace's own detectors, extractors and matchers
pub struct NativeBackend {
    detector: KeypointDetector,
    extractor: DescriptorExtractor,
    matcher: DescriptorMatcher,
}

impl NativeBackend {
    pub fn new(config: &BenchmarkConfig) -> TrackResult<Self> {
        Ok(Self {
            detector: KeypointDetector::new(config.detector.clone())?,
            extractor: DescriptorExtractor::new(),
            matcher: DescriptorMatcher::new(config.ratio_threshold, config.flann_checks)?,
        })
    }
}

impl VisionBackend for NativeBackend {
    fn detect(&self, img: &Image, detector: DetectorType) -> TrackResult<(Vec<Keypoint>, f64)> {
        let start = Instant::now();
        let keypoints = self.detector.detect(img, detector)?;
        let ms = elapsed_ms(start);
        debug!("{} detection with n={} keypoints in {:.3} ms", detector, keypoints.len(), ms);
        Ok((keypoints, ms))
    }

    fn describe(
        &self,
        keypoints: &[Keypoint],
        img: &Image,
        descriptor: DescriptorType,
    ) -> TrackResult<(Descriptors, f64)> {
        let start = Instant::now();
        let descriptors = self.extractor.compute(img, keypoints, descriptor)?;
        let ms = elapsed_ms(start);
        debug!("{} descriptor extraction in {:.3} ms", descriptor, ms);
        Ok((descriptors, ms))
    }

    fn match_descriptors(
        &self,
        _keypoints_prev: &[Keypoint],
        _keypoints_cur: &[Keypoint],
        descriptors_prev: &Descriptors,
        descriptors_cur: &Descriptors,
        category: DescriptorCategory,
        matcher: MatcherType,
        selector: SelectorType,
    ) -> TrackResult<(Vec<DMatch>, f64)> {
        let start = Instant::now();
        let matches = self
            .matcher
            .match_descriptors(descriptors_prev, descriptors_cur, category, matcher, selector)?;
        let ms = elapsed_ms(start);
        debug!("{} {} with n={} matches in {:.3} ms", matcher, selector, matches.len(), ms);
        Ok((matches, ms))
    }
}
