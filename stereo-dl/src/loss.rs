//! Losses reported by the evaluation.

use crate::common::*;

/// Sum of the mean squared errors of the left and right disparity estimates.
pub fn disparity_loss(
    left_estimate: &Tensor,
    right_estimate: &Tensor,
    left_target: &Tensor,
    right_target: &Tensor,
) -> Result<Tensor> {
    let left_loss = mse(left_estimate, left_target)?;
    let right_loss = mse(right_estimate, right_target)?;
    Ok(left_loss.f_add(&right_loss)?)
}

/// Binary cross entropy of occupancy probabilities against the ground truth volume.
pub fn voxel_loss(prediction: &Tensor, target: &Tensor) -> Result<Tensor> {
    ensure!(
        prediction.size() == target.size(),
        "predicted volume shape {:?} does not match ground truth shape {:?}",
        prediction.size(),
        target.size()
    );
    let target = target.to_kind(prediction.kind());
    let loss = prediction.f_binary_cross_entropy::<Tensor>(&target, None, Reduction::Mean)?;
    Ok(loss)
}

fn mse(estimate: &Tensor, target: &Tensor) -> Result<Tensor> {
    ensure!(
        estimate.size() == target.size(),
        "disparity shape {:?} does not match ground truth shape {:?}",
        estimate.size(),
        target.size()
    );
    let target = target.to_kind(estimate.kind());
    Ok(estimate.f_mse_loss(&target, Reduction::Mean)?)
}
