use std::path::PathBuf;

use ftrack_describe::DescribeError;
use ftrack_detect::DetectError;
use ftrack_match::MatchError;

#[derive(Debug)]
pub enum TrackError {
    /// A frame could not be read or decoded
    ImageLoad { path: PathBuf, source: image::ImageError },
    /// A report or visualization could not be written
    Io { path: PathBuf, source: std::io::Error },
    Detect(DetectError),
    Describe(DescribeError),
    Match(MatchError),
    /// Failure reported by a third-party vision backend
    Backend(String),
    Config(String),
    InvalidWindowCapacity(usize),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::ImageLoad { path, source } => {
                write!(f, "Failed to load image {}: {}", path.display(), source)
            }
            TrackError::Io { path, source } => write!(f, "Failed to write {}: {}", path.display(), source),
            TrackError::Detect(e) => write!(f, "Detection error: {}", e),
            TrackError::Describe(e) => write!(f, "Description error: {}", e),
            TrackError::Match(e) => write!(f, "Matching error: {}", e),
            TrackError::Backend(msg) => write!(f, "Vision backend error: {}", msg),
            TrackError::Config(msg) => write!(f, "Configuration error: {}", msg),
            TrackError::InvalidWindowCapacity(c) => {
                write!(f, "Invalid frame window capacity: {} (must be >= 1)", c)
            }
            TrackError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::ImageLoad { source, .. } => Some(source),
            TrackError::Io { source, .. } => Some(source),
            TrackError::Detect(e) => Some(e),
            TrackError::Describe(e) => Some(e),
            TrackError::Match(e) => Some(e),
            TrackError::ThreadPool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DetectError> for TrackError {
    fn from(err: DetectError) -> Self {
        TrackError::Detect(err)
    }
}

impl From<DescribeError> for TrackError {
    fn from(err: DescribeError) -> Self {
        TrackError::Describe(err)
    }
}

impl From<MatchError> for TrackError {
    fn from(err: MatchError) -> Self {
        TrackError::Match(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for TrackError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        TrackError::ThreadPool(err)
    }
}

pub type TrackResult<T> = Result<T, TrackError>;
