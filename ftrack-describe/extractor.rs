use ftrack_core::{DescriptorType, Descriptors, Image, Keypoint};

use crate::akaze::AkazeDescriptor;
use crate::brief::BriefGenerator;
use crate::brisk::BriskDescriptor;
use crate::error::{DescribeError, DescribeResult};
use crate::freak::FreakDescriptor;
use crate::orb::OrbDescriptor;
use crate::sift::SiftDescriptor;

/// Computes a descriptor matrix for a keypoint list with any supported
/// descriptor type. Sampling patterns are built once and reused.
pub struct DescriptorExtractor {
    brief: BriefGenerator,
    orb: OrbDescriptor,
    brisk: BriskDescriptor,
    freak: FreakDescriptor,
}

impl Default for DescriptorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorExtractor {
    pub fn new() -> Self {
        Self {
            brief: BriefGenerator::new(),
            orb: OrbDescriptor::new(),
            brisk: BriskDescriptor::new(),
            freak: FreakDescriptor::new(),
        }
    }

    /// One descriptor row per keypoint, in keypoint order. Keypoints near the
    /// border are sampled with clamped coordinates rather than dropped.
    pub fn compute(&self, img: &Image, keypoints: &[Keypoint], kind: DescriptorType) -> DescribeResult<Descriptors> {
        let (width, height) = (img.width() as usize, img.height() as usize);
        if width == 0 || height == 0 {
            return Err(DescribeError::InvalidImageSize { width, height });
        }
        if let Some(index) = keypoints
            .iter()
            .position(|kp| !(kp.x.is_finite() && kp.y.is_finite() && kp.size.is_finite() && kp.angle.is_finite()))
        {
            return Err(DescribeError::NonFiniteKeypoint { index });
        }

        let descriptors = match kind {
            DescriptorType::Brief => Descriptors::from_binary_rows(&self.brief.generate_descriptors(img, keypoints)),
            DescriptorType::Orb => Descriptors::from_binary_rows(&self.orb.generate_descriptors(img, keypoints)),
            DescriptorType::Brisk => Descriptors::from_binary_rows(&self.brisk.generate_descriptors(img, keypoints)),
            DescriptorType::Freak => Descriptors::from_binary_rows(&self.freak.generate_descriptors(img, keypoints)),
            DescriptorType::Akaze => Descriptors::from_binary_rows(&AkazeDescriptor.generate_descriptors(img, keypoints)),
            DescriptorType::Sift => Descriptors::from_float_rows(&SiftDescriptor.generate_descriptors(img, keypoints)),
        };
        Ok(descriptors)
    }
}
