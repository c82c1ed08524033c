use super::*;
use crate::common::*;

/// The strategy that merges the volumes reconstructed from the left and right views.
pub trait VolumeFusion
where
    Self: Debug + Send,
{
    fn fuse(&self, left: &Tensor, right: &Tensor) -> Result<Tensor>;
}

/// Elementwise mean of the two volumes.
///
/// This is a placeholder policy rather than a learned fusion.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanFusion;

impl VolumeFusion for MeanFusion {
    fn fuse(&self, left: &Tensor, right: &Tensor) -> Result<Tensor> {
        ensure_same_shape(left, right)?;
        let fused = Tensor::f_stack(&[left, right], 1)?.f_mean_dim(&[1], false, left.kind())?;
        Ok(fused)
    }
}

/// Elementwise maximum of the two volumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxFusion;

impl VolumeFusion for MaxFusion {
    fn fuse(&self, left: &Tensor, right: &Tensor) -> Result<Tensor> {
        ensure_same_shape(left, right)?;
        Ok(left.f_maximum(right)?)
    }
}

/// The fusion by a model that takes both volumes stacked at dimension 1.
pub struct LearnedFusion<M>
where
    M: ReconstructionModel,
{
    model: M,
}

impl<M> LearnedFusion<M>
where
    M: ReconstructionModel,
{
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M> Debug for LearnedFusion<M>
where
    M: ReconstructionModel,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearnedFusion").finish()
    }
}

impl<M> VolumeFusion for LearnedFusion<M>
where
    M: ReconstructionModel,
{
    fn fuse(&self, left: &Tensor, right: &Tensor) -> Result<Tensor> {
        ensure_same_shape(left, right)?;
        let stacked = Tensor::f_stack(&[left, right], 1)?;
        let fused = self.model.forward_volume(&stacked)?;
        ensure!(
            fused.size() == left.size(),
            "the fusion model output shape {:?} does not match volume shape {:?}",
            fused.size(),
            left.size()
        );
        Ok(fused)
    }
}

fn ensure_same_shape(left: &Tensor, right: &Tensor) -> Result<()> {
    ensure!(
        left.size() == right.size(),
        "volume shapes do not match: {:?} and {:?}",
        left.size(),
        right.size()
    );
    Ok(())
}
