use super::*;
use crate::{common::*, dataset::StereoImages};

/// Per-channel `(value - mean) / std` normalization of RGB images.
///
/// Disparity maps are passed through.
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl Normalize {
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> Result<Self> {
        ensure!(
            !mean.is_empty() && mean.len() == std.len(),
            "mean and std must be non-empty and have equal length"
        );
        ensure!(
            std.iter().all(|&value| value != 0.0),
            "std values must be non-zero"
        );
        Ok(Self { mean, std })
    }

    fn normalize(&self, image: &Tensor) -> Result<Tensor> {
        let (_, _, channels) = hwc_shape(image)?;
        let channels = channels.unwrap_or(1);
        ensure!(
            channels as usize == self.mean.len(),
            "expect {} channels, but get {}",
            self.mean.len(),
            channels
        );

        let kind = image.kind();
        let mean = Tensor::of_slice(&self.mean).f_to_kind(kind)?;
        let std = Tensor::of_slice(&self.std).f_to_kind(kind)?;
        Ok((image - mean) / std)
    }
}

impl StereoTransform for Normalize {
    fn apply(&self, images: StereoImages) -> Result<StereoImages> {
        let StereoImages {
            left_rgb,
            right_rgb,
            left_disparity,
            right_disparity,
        } = images;

        Ok(StereoImages {
            left_rgb: self.normalize(&left_rgb)?,
            right_rgb: self.normalize(&right_rgb)?,
            left_disparity,
            right_disparity,
        })
    }
}
