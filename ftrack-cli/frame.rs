use ftrack_core::{DMatch, Descriptors, Image, Keypoint};

/// One loaded frame and everything the pipeline attaches to it
#[derive(Debug, Clone, Default)]
pub struct FrameRecord {
    pub index: usize,
    pub image: Image,
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Descriptors,
    /// Matches from the previous frame into this one
    pub matches: Vec<DMatch>,
}

impl FrameRecord {
    pub fn new(index: usize, image: Image) -> Self {
        Self {
            index,
            image,
            ..Default::default()
        }
    }
}
