#[derive(Debug, Clone, PartialEq)]
pub enum DescribeError {
    InvalidImageSize { width: usize, height: usize },
    NonFiniteKeypoint { index: usize },
}

impl std::fmt::Display for DescribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescribeError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            DescribeError::NonFiniteKeypoint { index } => {
                write!(f, "Keypoint {} has a non-finite position or size", index)
            }
        }
    }
}

impl std::error::Error for DescribeError {}

pub type DescribeResult<T> = Result<T, DescribeError>;
