use super::*;
use crate::{common::*, dataset::StereoImages};

/// Crops the center of images and resizes them to a fixed size.
///
/// Images no larger than the crop size in both dimensions are resized without
/// cropping.
#[derive(Debug, Clone)]
pub struct CenterCrop {
    image_size: [i64; 2],
    crop_size: [i64; 2],
}

impl CenterCrop {
    /// Create the transform. Both sizes are in `[height, width]` order.
    pub fn new(image_size: [usize; 2], crop_size: [usize; 2]) -> Result<Self> {
        ensure!(
            image_size.iter().chain(crop_size.iter()).all(|&size| size > 0),
            "image and crop sizes must be positive"
        );

        Ok(Self {
            image_size: [image_size[0] as i64, image_size[1] as i64],
            crop_size: [crop_size[0] as i64, crop_size[1] as i64],
        })
    }

    fn crop_resize(&self, image: &Tensor) -> Result<Tensor> {
        let (height, width, channels) = hwc_shape(image)?;
        let [crop_h, crop_w] = self.crop_size;
        let [out_h, out_w] = self.image_size;

        let (top, left, crop_h, crop_w) = if height > crop_h && width > crop_w {
            ((height - crop_h) / 2, (width - crop_w) / 2, crop_h, crop_w)
        } else {
            (0, 0, height, width)
        };

        let cropped = image.f_narrow(0, top, crop_h)?.f_narrow(1, left, crop_w)?;

        // bilinear resizing works on [batch, channels, height, width] tensors
        let batched = match channels {
            Some(_) => cropped.f_permute(&[2, 0, 1])?.f_unsqueeze(0)?,
            None => cropped.f_unsqueeze(0)?.f_unsqueeze(0)?,
        };
        let resized = batched
            .f_to_kind(Kind::Float)?
            .f_upsample_bilinear2d(&[out_h, out_w], false, None, None)?
            .f_select(0, 0)?;

        let output = match channels {
            Some(_) => resized.f_permute(&[1, 2, 0])?.contiguous(),
            None => resized.f_select(0, 0)?,
        };

        Ok(output)
    }
}

impl StereoTransform for CenterCrop {
    fn apply(&self, images: StereoImages) -> Result<StereoImages> {
        let StereoImages {
            left_rgb,
            right_rgb,
            left_disparity,
            right_disparity,
        } = images;

        Ok(StereoImages {
            left_rgb: self.crop_resize(&left_rgb)?,
            right_rgb: self.crop_resize(&right_rgb)?,
            left_disparity: self.crop_resize(&left_disparity)?,
            right_disparity: self.crop_resize(&right_disparity)?,
        })
    }
}
