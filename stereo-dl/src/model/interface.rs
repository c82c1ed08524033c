use crate::common::*;
use tch::{CModule, IValue};

/// The model that estimates left and right disparity maps from a stereo pair.
///
/// Inputs are `[batch, channels, height, width]` images and outputs are
/// `[batch, 1, height, width]` disparity maps.
pub trait DisparityModel
where
    Self: Send,
{
    fn forward_disparity(
        &self,
        left_rgb: &Tensor,
        right_rgb: &Tensor,
    ) -> Result<(Tensor, Tensor)>;
}

/// The model that maps an image to a volume of occupancy probabilities.
pub trait ReconstructionModel
where
    Self: Send,
{
    fn forward_volume(&self, input: &Tensor) -> Result<Tensor>;
}

/// Load a TorchScript module in evaluation mode.
pub fn load_script_module(path: impl AsRef<Path>, device: Device) -> Result<CModule> {
    let path = path.as_ref();
    let mut module = CModule::load_on_device(path, device)
        .with_context(|| format!("failed to load model file '{}'", path.display()))?;
    module.set_eval();
    Ok(module)
}

impl DisparityModel for CModule {
    fn forward_disparity(
        &self,
        left_rgb: &Tensor,
        right_rgb: &Tensor,
    ) -> Result<(Tensor, Tensor)> {
        let output = self.forward_is(&[
            IValue::Tensor(left_rgb.shallow_clone()),
            IValue::Tensor(right_rgb.shallow_clone()),
        ])?;

        let pair = match output {
            IValue::Tuple(values) | IValue::GenericList(values) => {
                match <[IValue; 2]>::try_from(values) {
                    Ok([IValue::Tensor(left), IValue::Tensor(right)]) => Some((left, right)),
                    _ => None,
                }
            }
            IValue::TensorList(tensors) => match <[Tensor; 2]>::try_from(tensors) {
                Ok([left, right]) => Some((left, right)),
                Err(_) => None,
            },
            _ => None,
        };

        pair.ok_or_else(|| format_err!("the disparity model must return a pair of tensors"))
    }
}

impl ReconstructionModel for CModule {
    fn forward_volume(&self, input: &Tensor) -> Result<Tensor> {
        let output = self.forward_ts(&[input])?;
        Ok(output)
    }
}
