use super::*;
use crate::common::*;

/// The outputs of one stereo inference.
#[derive(Debug, TensorLike)]
pub struct InferenceOutput {
    pub left_disparity: Tensor,
    pub right_disparity: Tensor,
    pub left_volume: Tensor,
    pub right_volume: Tensor,
    pub volume: Tensor,
}

/// Runs disparity estimation, per-view reconstruction and fusion on a stereo pair.
#[derive(Debug)]
pub struct StereoInference<D, R>
where
    D: DisparityModel,
    R: ReconstructionModel,
{
    disparity_model: D,
    reconstruction_model: R,
    fusion: Box<dyn VolumeFusion>,
    device: Device,
}

impl<D, R> StereoInference<D, R>
where
    D: DisparityModel,
    R: ReconstructionModel,
{
    pub fn new(
        disparity_model: D,
        reconstruction_model: R,
        fusion: Box<dyn VolumeFusion>,
        device: Device,
    ) -> Self {
        Self {
            disparity_model,
            reconstruction_model,
            fusion,
            device,
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Run inference on a `[1, C, H, W]` image pair.
    pub fn forward(&self, left_rgb: &Tensor, right_rgb: &Tensor) -> Result<InferenceOutput> {
        tch::no_grad(|| {
            let (batch_size, _channels, height, width) = left_rgb.size4()?;
            ensure!(
                batch_size == 1,
                "stereo inference expects a batch of one sample, but get {}",
                batch_size
            );
            ensure!(
                left_rgb.size() == right_rgb.size(),
                "left and right image shapes do not match: {:?} and {:?}",
                left_rgb.size(),
                right_rgb.size()
            );

            let left_rgb = left_rgb.to_device(self.device);
            let right_rgb = right_rgb.to_device(self.device);

            let (left_disparity, right_disparity) = self
                .disparity_model
                .forward_disparity(&left_rgb, &right_rgb)?;
            for disparity in [&left_disparity, &right_disparity] {
                ensure!(
                    disparity.size() == [1, 1, height, width],
                    "expect disparity shape {:?}, but get {:?}",
                    [1, 1, height, width],
                    disparity.size()
                );
            }

            let left_rgbd = Tensor::f_cat(&[&left_rgb, &left_disparity], 1)?;
            let right_rgbd = Tensor::f_cat(&[&right_rgb, &right_disparity], 1)?;

            let left_volume = self.reconstruction_model.forward_volume(&left_rgbd)?;
            let right_volume = self.reconstruction_model.forward_volume(&right_rgbd)?;
            let volume = self.fusion.fuse(&left_volume, &right_volume)?;

            Ok(InferenceOutput {
                left_disparity,
                right_disparity,
                left_volume,
                right_volume,
                volume,
            })
        })
    }
}
