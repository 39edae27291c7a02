use ftrack_core::DescriptorCategory;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// Binary-category matching requested for floating-point descriptors
    IncompatibleCategory { category: DescriptorCategory },
    /// The two descriptor sets have different row widths
    WidthMismatch { previous: usize, current: usize },
    /// One set is binary and the other floating-point
    MixedDescriptorKinds,
    InvalidRatio(f32),
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::IncompatibleCategory { category } => {
                write!(f, "{} matching requires binary descriptors", category)
            }
            MatchError::WidthMismatch { previous, current } => {
                write!(f, "Descriptor widths differ: {} vs {}", previous, current)
            }
            MatchError::MixedDescriptorKinds => write!(f, "Cannot match binary against floating-point descriptors"),
            MatchError::InvalidRatio(r) => write!(f, "Invalid ratio threshold: {} (must be in (0, 1])", r),
        }
    }
}

impl std::error::Error for MatchError {}

pub type MatchResult<T> = Result<T, MatchError>;
