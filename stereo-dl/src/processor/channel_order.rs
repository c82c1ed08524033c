use super::*;
use crate::{common::*, dataset::StereoImages};

/// Reorders RGB images to BGR, the channel order of OpenCV decoders.
///
/// An alpha channel stays last. Single channel images and disparity maps are
/// passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbToBgr;

impl RgbToBgr {
    fn reorder(&self, image: &Tensor) -> Result<Tensor> {
        let (_, _, channels) = hwc_shape(image)?;
        let order: &[i64] = match channels {
            None | Some(1) => return Ok(image.shallow_clone()),
            Some(3) => &[2, 1, 0],
            Some(4) => &[2, 1, 0, 3],
            Some(_) => bail!("expect a RGB or RGBA image, but get shape {:?}", image.size()),
        };
        let index = Tensor::of_slice(order).to_device(image.device());
        Ok(image.f_index_select(2, &index)?)
    }
}

impl StereoTransform for RgbToBgr {
    fn apply(&self, images: StereoImages) -> Result<StereoImages> {
        let StereoImages {
            left_rgb,
            right_rgb,
            left_disparity,
            right_disparity,
        } = images;

        Ok(StereoImages {
            left_rgb: self.reorder(&left_rgb)?,
            right_rgb: self.reorder(&right_rgb)?,
            left_disparity,
            right_disparity,
        })
    }
}
