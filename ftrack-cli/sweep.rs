//! Runs every planned configuration over the frame sequence and writes the
//! per-group and overall reports.

use std::path::PathBuf;

use ftrack_core::MatcherType;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::BenchmarkConfig;
use crate::error::TrackResult;
use crate::filter::{focus_on_vehicle, limit_keypoints};
use crate::frame::FrameRecord;
use crate::plan::{Configuration, ConfigurationGroup, SweepPlan};
use crate::report::ReportWriter;
use crate::stats::{ConfigurationStats, GroupStats, KeypointSummary, PairStats};
use crate::vision::{FrameSource, VisionBackend};
use crate::visualize::MatchVisualizer;
use crate::window::FrameWindow;

/// What happened during a sweep
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    /// Failed configurations with the reason, in plan order
    pub failures: Vec<(Configuration, String)>,
    pub reports: Vec<PathBuf>,
    pub summary: KeypointSummary,
}

pub struct SweepDriver<'a> {
    config: &'a BenchmarkConfig,
    backend: &'a dyn VisionBackend,
    source: &'a dyn FrameSource,
    reports: ReportWriter,
    visualizer: Option<MatchVisualizer>,
}

impl<'a> SweepDriver<'a> {
    pub fn new(config: &'a BenchmarkConfig, backend: &'a dyn VisionBackend, source: &'a dyn FrameSource) -> Self {
        let reports = ReportWriter::new(
            config.output_path(),
            config.reports.clone(),
            config.matched_report_per_selector,
        );
        let visualizer = config.visualize.then(|| MatchVisualizer::new(config.output_path()));
        Self {
            config,
            backend,
            source,
            reports,
            visualizer,
        }
    }

    pub fn plan(&self) -> SweepPlan {
        SweepPlan::new(
            &self.config.selectors,
            &self.config.matchers,
            &self.config.detectors,
            &self.config.descriptors,
        )
    }

    /// Run the whole plan. Failed configurations are logged and skipped;
    /// report write failures are logged and the sweep continues.
    pub fn run(&self) -> SweepOutcome {
        let plan = self.plan();
        info!("sweeping {} configurations", plan.len());

        let mut outcome = SweepOutcome::default();
        let mut matched_report_written = false;
        for group in plan.groups() {
            let stats = self.run_group(&group, &mut outcome);

            if group.matcher == MatcherType::BruteForce {
                if matched_report_written && !self.config.matched_report_per_selector {
                    warn!(
                        "{} overwrites the matched keypoints of the previous selector",
                        group.selector
                    );
                }
                self.record_report(
                    self.reports.write_matched_keypoints(group.selector, &stats),
                    &mut outcome,
                );
                matched_report_written = true;
            }
            self.record_report(
                self.reports.write_timing(group.selector, group.matcher, &stats),
                &mut outcome,
            );
        }

        self.record_report(self.reports.write_keypoint_summary(&outcome.summary), &mut outcome);
        info!(
            "sweep finished: {} of {} configurations succeeded",
            outcome.succeeded, outcome.attempted
        );
        outcome
    }

    fn record_report(&self, result: TrackResult<PathBuf>, outcome: &mut SweepOutcome) {
        match result {
            Ok(path) => outcome.reports.push(path),
            Err(e) => warn!("{}", e),
        }
    }

    /// Run one (selector, matcher) group and collect its pair statistics.
    /// Results are merged in plan order whether or not the group ran in
    /// parallel.
    pub fn run_group(&self, group: &ConfigurationGroup, outcome: &mut SweepOutcome) -> GroupStats {
        info!("group {}_{}", group.selector, group.matcher);
        let results: Vec<TrackResult<ConfigurationStats>> = if self.config.parallel {
            group
                .configurations
                .par_iter()
                .map(|c| self.run_configuration(c))
                .collect()
        } else {
            group.configurations.iter().map(|c| self.run_configuration(c)).collect()
        };

        let mut stats = GroupStats::default();
        for (config, result) in group.configurations.iter().zip(results) {
            outcome.attempted += 1;
            match result {
                Ok(run) => {
                    outcome.succeeded += 1;
                    if outcome.summary.record_first(config.detector, run.keypoints_on_vehicle) {
                        debug!("{} keypoints on vehicle recorded for {}", run.keypoints_on_vehicle, config.detector);
                    }
                    stats.record(config.detector, config.descriptor, PairStats::from(&run));
                }
                Err(e) => {
                    warn!("{} failed: {}", config, e);
                    outcome.failures.push((*config, e.to_string()));
                }
            }
        }
        stats
    }

    /// Push every frame through detect, filter, cap, describe and match
    pub fn run_configuration(&self, config: &Configuration) -> TrackResult<ConfigurationStats> {
        info!("running {}", config);
        let cfg = self.config;
        let mut window = FrameWindow::new(cfg.window_capacity)?;
        let mut stats = ConfigurationStats::default();

        for index in cfg.start_index..=cfg.end_index {
            let image = self.source.load(index)?;
            let current = window.push(FrameRecord::new(index, image));

            let (keypoints, detect_ms) = self.backend.detect(&current.image, config.detector)?;
            stats.detect_ms += detect_ms;

            let keypoints = focus_on_vehicle(keypoints, cfg.focus_on_vehicle, &cfg.vehicle_region);
            stats.keypoints_on_vehicle += keypoints.len();
            let keypoints = limit_keypoints(keypoints, cfg.limit_keypoints, cfg.max_keypoints);

            let (descriptors, describe_ms) = self.backend.describe(&keypoints, &current.image, config.descriptor)?;
            stats.describe_ms += describe_ms;
            current.keypoints = keypoints;
            current.descriptors = descriptors;
            stats.frames += 1;

            let (Some(previous), Some(current)) = (window.second_to_last(), window.last()) else {
                continue;
            };
            let (matches, _) = self.backend.match_descriptors(
                &previous.keypoints,
                &current.keypoints,
                &previous.descriptors,
                &current.descriptors,
                config.descriptor.category(),
                config.matcher,
                config.selector,
            )?;
            debug!("frame {}: {} matches", index, matches.len());
            stats.matched_keypoints += matches.len();

            if let Some(visualizer) = &self.visualizer {
                if let Err(e) = visualizer.save(config, previous, current, &matches) {
                    warn!("{}", e);
                }
            }
            if let Some(current) = window.last_mut() {
                current.matches = matches;
            }
        }

        Ok(stats)
    }
}
