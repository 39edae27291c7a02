use std::path::{Path, PathBuf};

use ftrack_core::{DescriptorType, DetectorType, MatcherType, SelectorType};
use ftrack_detect::DetectorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{TrackError, TrackResult};
use crate::filter::VehicleRegion;

/// Names of the CSV files written into the output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFiles {
    pub matched_keypoints: String,
    pub keypoint_summary: String,
    /// Prefix of the per-group timing tables, `<prefix>_<selector>_<matcher>.csv`
    pub timing_prefix: String,
}

impl Default for ReportFiles {
    fn default() -> Self {
        Self {
            matched_keypoints: "MP_8.csv".to_string(),
            keypoint_summary: "MP_7.csv".to_string(),
            timing_prefix: "totalTimeForKpts".to_string(),
        }
    }
}

/// Everything the benchmark sweep needs, with defaults reproducing the
/// fixed KITTI setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub data_path: String,
    /// Path below `<data_path>images/` up to the zero-padded frame index
    pub image_prefix: String,
    pub image_extension: String,
    pub start_index: usize,
    pub end_index: usize,
    pub fill_width: usize,
    pub window_capacity: usize,

    pub selectors: Vec<SelectorType>,
    pub matchers: Vec<MatcherType>,
    pub detectors: Vec<DetectorType>,
    pub descriptors: Vec<DescriptorType>,

    pub focus_on_vehicle: bool,
    pub limit_keypoints: bool,
    pub max_keypoints: usize,
    /// Best-to-second distance ratio for k-nearest-neighbour selection
    pub ratio_threshold: f32,
    /// Point checks per query for the approximate matcher
    pub flann_checks: usize,

    pub visualize: bool,
    pub parallel: bool,
    /// Worker threads; 0 uses one per CPU
    pub threads: usize,
    pub output_dir: String,
    /// Write one matched-keypoint table per selector instead of overwriting
    pub matched_report_per_selector: bool,

    pub vehicle_region: VehicleRegion,
    pub reports: ReportFiles,
    pub detector: DetectorConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            data_path: "../".to_string(),
            image_prefix: "KITTI/2011_09_26/image_00/data/000000".to_string(),
            image_extension: ".png".to_string(),
            start_index: 0,
            end_index: 9,
            fill_width: 4,
            window_capacity: 2,
            selectors: SelectorType::ALL.to_vec(),
            matchers: MatcherType::ALL.to_vec(),
            detectors: DetectorType::ALL.to_vec(),
            descriptors: DescriptorType::ALL.to_vec(),
            focus_on_vehicle: true,
            limit_keypoints: false,
            max_keypoints: 50,
            ratio_threshold: ftrack_match::DEFAULT_RATIO,
            flann_checks: ftrack_match::flann::DEFAULT_CHECKS,
            visualize: false,
            parallel: false,
            threads: 0,
            output_dir: ".".to_string(),
            matched_report_per_selector: false,
            vehicle_region: VehicleRegion::default(),
            reports: ReportFiles::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> TrackResult<()> {
        let empty = [
            ("selectors", self.selectors.is_empty()),
            ("matchers", self.matchers.is_empty()),
            ("detectors", self.detectors.is_empty()),
            ("descriptors", self.descriptors.is_empty()),
        ];
        if let Some((name, _)) = empty.iter().find(|(_, is_empty)| *is_empty) {
            return Err(TrackError::Config(format!("{} must not be empty", name)));
        }
        if self.window_capacity == 0 {
            return Err(TrackError::InvalidWindowCapacity(0));
        }
        if self.end_index < self.start_index {
            return Err(TrackError::Config(format!(
                "end_index {} is before start_index {}",
                self.end_index, self.start_index
            )));
        }
        if !(self.ratio_threshold > 0.0 && self.ratio_threshold <= 1.0) {
            return Err(TrackError::Config(format!(
                "ratio_threshold {} must be in (0, 1]",
                self.ratio_threshold
            )));
        }
        if self.vehicle_region.width <= 0.0 || self.vehicle_region.height <= 0.0 {
            return Err(TrackError::Config("vehicle_region must have a positive size".to_string()));
        }
        self.detector.validate()?;
        Ok(())
    }

    /// Worker threads after resolving the automatic setting
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            ftrack_core::default_threads()
        } else {
            self.threads
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// Load from a `.toml` or `.json` file and validate
    pub fn load<P: AsRef<Path>>(path: P) -> TrackResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrackError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(TrackError::Config(format!(
                "unsupported configuration format: {} (expected .toml or .json)",
                path.display()
            ))),
        }
    }

    pub fn from_toml(toml_str: &str) -> TrackResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| TrackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> TrackResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| TrackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> TrackResult<String> {
        toml::to_string_pretty(self).map_err(|e| TrackError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> TrackResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TrackError::Config(e.to_string()))
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "BenchmarkConfig: frames {}..={}, window={}, focus_on_vehicle={}, limit_keypoints={} (max {}), ratio={}, parallel={}, threads={}, output_dir={}; {}",
            self.start_index,
            self.end_index,
            self.window_capacity,
            self.focus_on_vehicle,
            self.limit_keypoints,
            self.max_keypoints,
            self.ratio_threshold,
            self.parallel,
            self.effective_threads(),
            self.output_dir,
            self.detector.summary(),
        )
    }
}
