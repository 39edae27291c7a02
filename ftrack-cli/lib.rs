//! Feature-tracking benchmark: runs every compatible combination of
//! keypoint detector, descriptor, matcher and match selector over a short
//! image sequence and exports keypoint counts, match counts and timings as
//! CSV tables.

pub mod config;
pub mod error;
pub mod filter;
pub mod frame;
pub mod plan;
pub mod report;
pub mod stats;
pub mod sweep;
pub mod vision;
pub mod visualize;
pub mod window;

pub use config::{BenchmarkConfig, ReportFiles};
pub use error::{TrackError, TrackResult};
pub use filter::{focus_on_vehicle, limit_keypoints, VehicleRegion};
pub use frame::FrameRecord;
pub use plan::{is_compatible, Configuration, ConfigurationGroup, SweepPlan};
pub use report::ReportWriter;
pub use stats::{ConfigurationStats, GroupStats, KeypointSummary, PairStats};
pub use sweep::{SweepDriver, SweepOutcome};
pub use vision::{FrameSource, ImageSequence, NativeBackend, VisionBackend};
pub use window::FrameWindow;

pub use ftrack_core;
