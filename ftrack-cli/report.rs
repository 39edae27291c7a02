//! Flat CSV tables written after each group and at the end of the sweep.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ftrack_core::{MatcherType, SelectorType};
use log::info;

use crate::config::ReportFiles;
use crate::error::{TrackError, TrackResult};
use crate::stats::{GroupStats, KeypointSummary};

pub struct ReportWriter {
    output_dir: PathBuf,
    files: ReportFiles,
    per_selector: bool,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, files: ReportFiles, per_selector: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            files,
            per_selector,
        }
    }

    /// Target of the matched-keypoint table for `selector`. Without the
    /// per-selector option every selector shares one file.
    pub fn matched_keypoints_path(&self, selector: SelectorType) -> PathBuf {
        if self.per_selector {
            let name = &self.files.matched_keypoints;
            let (stem, ext) = match name.rsplit_once('.') {
                Some((stem, ext)) => (stem, format!(".{}", ext)),
                None => (name.as_str(), String::new()),
            };
            self.output_dir.join(format!("{}_{}{}", stem, selector, ext))
        } else {
            self.output_dir.join(&self.files.matched_keypoints)
        }
    }

    pub fn timing_path(&self, selector: SelectorType, matcher: MatcherType) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_{}.csv", self.files.timing_prefix, selector, matcher))
    }

    pub fn keypoint_summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.files.keypoint_summary)
    }

    /// `Detector,Descriptor,Matched Key Points`
    pub fn write_matched_keypoints(&self, selector: SelectorType, group: &GroupStats) -> TrackResult<PathBuf> {
        let path = self.matched_keypoints_path(selector);
        write_table(&path, "Detector,Descriptor,Matched Key Points", |out| {
            for (det, desc, stats) in group.iter() {
                writeln!(out, "{},{},{}", det, desc, stats.matched_keypoints)?;
            }
            Ok(())
        })?;
        info!("matched keypoints written to {}", path.display());
        Ok(path)
    }

    /// `Detector,Descriptor,Detect Time,Descript Time,Time per KPts`, in ms
    pub fn write_timing(&self, selector: SelectorType, matcher: MatcherType, group: &GroupStats) -> TrackResult<PathBuf> {
        let path = self.timing_path(selector, matcher);
        write_table(&path, "Detector,Descriptor,Detect Time,Descript Time,Time per KPts", |out| {
            for (det, desc, stats) in group.iter() {
                writeln!(
                    out,
                    "{},{},{},{},{}",
                    det,
                    desc,
                    stats.detect_ms,
                    stats.describe_ms,
                    stats.time_per_matched_keypoint()
                )?;
            }
            Ok(())
        })?;
        info!("timing table written to {}", path.display());
        Ok(path)
    }

    /// `Detector,# of Kpts`
    pub fn write_keypoint_summary(&self, summary: &KeypointSummary) -> TrackResult<PathBuf> {
        let path = self.keypoint_summary_path();
        write_table(&path, "Detector,# of Kpts", |out| {
            for (det, count) in summary.iter() {
                writeln!(out, "{},{}", det, count)?;
            }
            Ok(())
        })?;
        info!("keypoint summary written to {}", path.display());
        Ok(path)
    }
}

fn write_table<F>(path: &Path, header: &str, rows: F) -> TrackResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let io_err = |source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", header).map_err(io_err)?;
    rows(&mut out).map_err(io_err)?;
    out.flush().map_err(io_err)
}
