use super::*;
use crate::{common::*, dataset::StereoImages};

/// Converts images to `[channels, height, width]` layout.
///
/// Disparity maps become `[1, height, width]` tensors.
#[derive(Debug, Clone, Default)]
pub struct ToTensor;

impl ToTensor {
    fn to_chw(image: &Tensor) -> Result<Tensor> {
        let output = match hwc_shape(image)? {
            (_, _, Some(_)) => image.f_permute(&[2, 0, 1])?.contiguous(),
            (_, _, None) => image.f_unsqueeze(0)?,
        };
        Ok(output)
    }
}

impl StereoTransform for ToTensor {
    fn apply(&self, images: StereoImages) -> Result<StereoImages> {
        let StereoImages {
            left_rgb,
            right_rgb,
            left_disparity,
            right_disparity,
        } = images;

        Ok(StereoImages {
            left_rgb: Self::to_chw(&left_rgb)?,
            right_rgb: Self::to_chw(&right_rgb)?,
            left_disparity: Self::to_chw(&left_disparity)?,
            right_disparity: Self::to_chw(&right_disparity)?,
        })
    }
}
