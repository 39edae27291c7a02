#[derive(Debug, Clone, PartialEq)]
pub enum DetectError {
    InvalidImageSize { width: usize, height: usize },
    ImageTooSmall { width: usize, height: usize, min_size: usize },
    InvalidThreshold(u8),
    InvalidParameter { name: &'static str, value: f32 },
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            DetectError::ImageTooSmall { width, height, min_size } => {
                write!(f, "Image {}x{} too small (minimum {}x{})", width, height, min_size, min_size)
            }
            DetectError::InvalidThreshold(t) => {
                write!(f, "Invalid threshold: {} (must be 1-127)", t)
            }
            DetectError::InvalidParameter { name, value } => {
                write!(f, "Invalid detector parameter {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for DetectError {}

pub type DetectResult<T> = Result<T, DetectError>;
