use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use ftrack_cli::{BenchmarkConfig, FrameSource, SweepDriver, TrackError, TrackResult, VisionBackend};
use ftrack_core::{
    DMatch, DescriptorCategory, DescriptorType, Descriptors, DetectorType, Image, Keypoint, MatcherType,
    SelectorType,
};

/// Blank KITTI-sized frames, optionally failing to load one index
struct SyntheticFrames {
    fail_at: Option<usize>,
}

impl FrameSource for SyntheticFrames {
    fn load(&self, index: usize) -> TrackResult<Image> {
        if self.fail_at == Some(index) {
            return Err(TrackError::ImageLoad {
                path: PathBuf::from(format!("frame{:04}.png", index)),
                source: image::ImageError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "missing")),
            });
        }
        Ok(Image::new(1242, 375))
    }
}

/// Emits `3 + detector position` keypoints on the vehicle plus two outside
/// it; every call takes 1 ms to detect and 0.5 ms to describe
#[derive(Default)]
struct FakeBackend {
    failing: Option<DetectorType>,
    matching: bool,
    /// Add the number of earlier detect calls to the keypoint count
    growing: bool,
    calls: AtomicUsize,
}

fn keypoints_on_vehicle(detector: DetectorType) -> usize {
    3 + DetectorType::ALL.iter().position(|&d| d == detector).unwrap_or(0)
}

impl VisionBackend for FakeBackend {
    fn detect(&self, _img: &Image, detector: DetectorType) -> TrackResult<(Vec<Keypoint>, f64)> {
        if self.failing == Some(detector) {
            return Err(TrackError::Backend(format!("{} unavailable", detector)));
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let n = keypoints_on_vehicle(detector) + if self.growing { call } else { 0 };
        let mut kps: Vec<Keypoint> = (0..n)
            .map(|i| Keypoint::new(540.0 + i as f32, 200.0, 7.0).with_response(i as f32))
            .collect();
        kps.push(Keypoint::new(10.0, 10.0, 7.0));
        kps.push(Keypoint::new(1000.0, 300.0, 7.0));
        Ok((kps, 1.0))
    }

    fn describe(
        &self,
        keypoints: &[Keypoint],
        _img: &Image,
        _descriptor: DescriptorType,
    ) -> TrackResult<(Descriptors, f64)> {
        let data = (0..keypoints.len()).map(|i| i as u8).collect();
        Ok((Descriptors::Binary { width: 1, data }, 0.5))
    }

    fn match_descriptors(
        &self,
        keypoints_prev: &[Keypoint],
        keypoints_cur: &[Keypoint],
        _descriptors_prev: &Descriptors,
        _descriptors_cur: &Descriptors,
        _category: DescriptorCategory,
        _matcher: MatcherType,
        _selector: SelectorType,
    ) -> TrackResult<(Vec<DMatch>, f64)> {
        if !self.matching {
            return Ok((Vec::new(), 0.0));
        }
        let matches = (0..keypoints_prev.len().min(keypoints_cur.len()))
            .map(|i| DMatch {
                query_idx: i,
                train_idx: i,
                distance: 0.0,
            })
            .collect();
        Ok((matches, 0.25))
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ftrack-sweep-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(
    name: &str,
    selectors: &[SelectorType],
    matchers: &[MatcherType],
    detectors: &[DetectorType],
    descriptors: &[DescriptorType],
) -> BenchmarkConfig {
    BenchmarkConfig {
        selectors: selectors.to_vec(),
        matchers: matchers.to_vec(),
        detectors: detectors.to_vec(),
        descriptors: descriptors.to_vec(),
        output_dir: scratch_dir(name).to_string_lossy().into_owned(),
        ..BenchmarkConfig::default()
    }
}

fn read(config: &BenchmarkConfig, file: &str) -> String {
    std::fs::read_to_string(config.output_path().join(file)).unwrap()
}

#[test]
fn never_matching_pair_still_writes_complete_reports() {
    let config = config(
        "never-matching",
        &[SelectorType::NearestNeighbor],
        &[MatcherType::BruteForce],
        &[DetectorType::Fast],
        &[DescriptorType::Brief],
    );
    let backend = FakeBackend::default();
    let outcome = SweepDriver::new(&config, &backend, &SyntheticFrames { fail_at: None }).run();

    assert_eq!(outcome.attempted, 1);
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.reports.len(), 3);
    assert_eq!(
        read(&config, "MP_8.csv"),
        "Detector,Descriptor,Matched Key Points\nFAST,BRIEF,0\n"
    );
    assert_eq!(
        read(&config, "totalTimeForKpts_SEL_NN_MAT_BF.csv"),
        "Detector,Descriptor,Detect Time,Descript Time,Time per KPts\nFAST,BRIEF,10,5,NaN\n"
    );
    // Six keypoints on the vehicle in each of ten frames
    assert_eq!(read(&config, "MP_7.csv"), "Detector,# of Kpts\nFAST,60\n");
}

#[test]
fn matches_accumulate_over_frame_pairs() {
    let mut config = config(
        "matching",
        &[SelectorType::KNearestNeighbor],
        &[MatcherType::Flann],
        &[DetectorType::Harris],
        &[DescriptorType::Sift],
    );
    config.limit_keypoints = true;
    config.max_keypoints = 2;
    let backend = FakeBackend {
        matching: true,
        ..Default::default()
    };
    let outcome = SweepDriver::new(&config, &backend, &SyntheticFrames { fail_at: None }).run();
    assert_eq!(outcome.succeeded, 1);

    // Nine frame pairs with two capped keypoints each
    let timing = read(&config, "totalTimeForKpts_SEL_KNN_MAT_FLANN.csv");
    let row: Vec<&str> = timing.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(&row[..4], &["HARRIS", "SIFT", "10", "5"]);
    let per_kpt: f64 = row[4].parse().unwrap();
    assert!((per_kpt - 15.0 / 18.0).abs() < 1e-9);
    // The cap does not change the on-vehicle count
    assert_eq!(outcome.summary.get(DetectorType::Harris), Some(40));
    // No brute-force group, no matched-keypoint table
    assert!(!config.output_path().join("MP_8.csv").exists());
}

#[test]
fn failing_detector_is_skipped() {
    let config = config(
        "failing-detector",
        &[SelectorType::NearestNeighbor],
        &[MatcherType::BruteForce, MatcherType::Flann],
        &[DetectorType::Harris, DetectorType::Orb],
        &[DescriptorType::Brief],
    );
    let backend = FakeBackend {
        failing: Some(DetectorType::Harris),
        ..Default::default()
    };
    let outcome = SweepDriver::new(&config, &backend, &SyntheticFrames { fail_at: None }).run();

    assert_eq!(outcome.attempted, 4);
    assert_eq!(outcome.succeeded, 2);
    let failed: Vec<String> = outcome.failures.iter().map(|(c, _)| c.to_string()).collect();
    assert_eq!(failed, vec!["SEL_NN_MAT_BF_HARRIS_BRIEF", "SEL_NN_MAT_FLANN_HARRIS_BRIEF"]);
    assert_eq!(read(&config, "MP_7.csv"), "Detector,# of Kpts\nORB,80\n");
    assert_eq!(
        read(&config, "MP_8.csv"),
        "Detector,Descriptor,Matched Key Points\nORB,BRIEF,0\n"
    );
}

#[test]
fn summary_keeps_first_configuration_of_each_detector() {
    let config = config(
        "first-occurrence",
        &[SelectorType::NearestNeighbor],
        &[MatcherType::BruteForce],
        &[DetectorType::Fast],
        &[DescriptorType::Brief, DescriptorType::Orb],
    );
    let backend = FakeBackend {
        growing: true,
        ..Default::default()
    };
    let outcome = SweepDriver::new(&config, &backend, &SyntheticFrames { fail_at: None }).run();

    assert_eq!(outcome.succeeded, 2);
    // First run: 6 + 0..=9 keypoints per frame
    assert_eq!(outcome.summary.get(DetectorType::Fast), Some(105));
    assert_eq!(read(&config, "MP_7.csv"), "Detector,# of Kpts\nFAST,105\n");
}

#[test]
fn image_load_failure_fails_every_configuration() {
    let config = config(
        "load-failure",
        &[SelectorType::NearestNeighbor],
        &[MatcherType::BruteForce],
        &[DetectorType::Sift],
        &[DescriptorType::Orb, DescriptorType::Sift],
    );
    let backend = FakeBackend::default();
    let outcome = SweepDriver::new(&config, &backend, &SyntheticFrames { fail_at: Some(4) }).run();

    // SIFT keypoints never go to the ORB extractor
    assert_eq!(outcome.attempted, 1);
    assert_eq!(outcome.succeeded, 0);
    assert!(outcome.failures[0].1.contains("frame0004.png"));
    assert_eq!(read(&config, "MP_7.csv"), "Detector,# of Kpts\n");
}

#[test]
fn parallel_sweep_writes_the_same_reports() {
    let detectors = [DetectorType::ShiTomasi, DetectorType::Brisk, DetectorType::Akaze];
    let descriptors = [DescriptorType::Freak, DescriptorType::Akaze];
    let sequential = config(
        "sequential",
        SelectorType::ALL,
        MatcherType::ALL,
        &detectors,
        &descriptors,
    );
    let mut parallel = config("parallel", SelectorType::ALL, MatcherType::ALL, &detectors, &descriptors);
    parallel.parallel = true;
    parallel.matched_report_per_selector = true;

    let backend = FakeBackend {
        matching: true,
        ..Default::default()
    };
    let frames = SyntheticFrames { fail_at: None };
    let a = SweepDriver::new(&sequential, &backend, &frames).run();
    let b = SweepDriver::new(&parallel, &backend, &frames).run();
    assert_eq!(a.attempted, b.attempted);
    assert_eq!(a.summary, b.summary);

    for file in [
        "totalTimeForKpts_SEL_NN_MAT_BF.csv",
        "totalTimeForKpts_SEL_KNN_MAT_FLANN.csv",
        "MP_7.csv",
    ] {
        assert_eq!(read(&sequential, file), read(&parallel, file), "{}", file);
    }
    // Shared table holds the last selector; per-selector tables keep both
    assert_eq!(
        read(&sequential, "MP_8.csv"),
        read(&parallel, "MP_8_SEL_KNN.csv")
    );
    assert!(parallel.output_path().join("MP_8_SEL_NN.csv").exists());
}
