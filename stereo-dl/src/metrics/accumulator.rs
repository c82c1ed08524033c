use super::*;
use crate::common::*;

/// The IoU vectors collected for one taxonomy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxonomyBucket {
    pub ious: Vec<Vec<f64>>,
}

impl TaxonomyBucket {
    pub fn num_samples(&self) -> usize {
        self.ious.len()
    }

    /// Elementwise mean of the per-sample IoU vectors.
    pub fn mean_iou(&self, num_thresholds: usize) -> Option<Vec<f64>> {
        let num_samples = self.num_samples();
        if num_samples == 0 {
            return None;
        }

        let sum = self
            .ious
            .iter()
            .fold(vec![0.0; num_thresholds], |mut sum, ious| {
                izip!(&mut sum, ious).for_each(|(sum, iou)| *sum += iou);
                sum
            });
        let mean = sum.into_iter().map(|sum| sum / num_samples as f64).collect();
        Some(mean)
    }
}

/// Running losses and per-taxonomy IoU buckets over an evaluation pass.
#[derive(Debug, Clone)]
pub struct MetricAccumulator {
    thresholds: Vec<R64>,
    pub(crate) disparity_loss: AverageMeter,
    pub(crate) voxel_loss: AverageMeter,
    pub(crate) buckets: IndexMap<String, TaxonomyBucket>,
}

impl MetricAccumulator {
    pub fn new(thresholds: Vec<R64>) -> Result<Self> {
        ensure!(!thresholds.is_empty(), "at least one IoU threshold is required");
        Ok(Self {
            thresholds,
            disparity_loss: AverageMeter::new(),
            voxel_loss: AverageMeter::new(),
            buckets: IndexMap::new(),
        })
    }

    pub fn thresholds(&self) -> &[R64] {
        &self.thresholds
    }

    pub fn disparity_loss(&self) -> &AverageMeter {
        &self.disparity_loss
    }

    pub fn voxel_loss(&self) -> &AverageMeter {
        &self.voxel_loss
    }

    pub fn buckets(&self) -> &IndexMap<String, TaxonomyBucket> {
        &self.buckets
    }

    pub fn num_samples(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.num_samples()).sum()
    }

    /// Fold the metrics of one sample into the running state.
    pub fn update(
        &mut self,
        taxonomy_id: &str,
        disparity_loss: f64,
        voxel_loss: f64,
        ious: Vec<f64>,
    ) -> Result<()> {
        ensure!(
            ious.len() == self.thresholds.len(),
            "expect {} IoU values, but get {}",
            self.thresholds.len(),
            ious.len()
        );

        self.disparity_loss.update(disparity_loss);
        self.voxel_loss.update(voxel_loss);
        self.buckets
            .entry(taxonomy_id.to_owned())
            .or_default()
            .ious
            .push(ious);
        Ok(())
    }
}
