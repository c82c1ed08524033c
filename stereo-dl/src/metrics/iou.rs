use crate::common::*;

/// Computes the IoU of a predicted occupancy volume against the ground truth
/// for each threshold, in threshold order.
///
/// A voxel is predicted occupied when its probability is at least the threshold.
/// The IoU is NaN when both the prediction and the ground truth are empty.
pub fn volume_iou(prediction: &Tensor, target: &Tensor, thresholds: &[R64]) -> Result<Vec<f64>> {
    ensure!(
        prediction.size() == target.size(),
        "predicted volume shape {:?} does not match ground truth shape {:?}",
        prediction.size(),
        target.size()
    );

    tch::no_grad(|| {
        let target = target.to_kind(Kind::Float);

        thresholds
            .iter()
            .map(|&threshold| {
                let occupied = prediction.f_ge(threshold.raw())?.to_kind(Kind::Float);
                let intersection = f64::from(&occupied.f_mul(&target)?.f_sum(Kind::Float)?);
                let union = f64::from(
                    &occupied
                        .f_add(&target)?
                        .f_ge(1.0)?
                        .f_sum(Kind::Float)?,
                );
                Ok(intersection / union)
            })
            .collect::<Result<Vec<_>>>()
    })
}
