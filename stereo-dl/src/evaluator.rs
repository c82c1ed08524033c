//! The per-sample evaluation loop state.

use crate::{
    common::*,
    dataset::{StereoRecord, TaxonomyManifest},
    loss::{disparity_loss, voxel_loss},
    metrics::{volume_iou, AggregateReport, MetricAccumulator},
    model::{DisparityModel, ReconstructionModel, StereoInference},
};

/// The receiver of named scalars and images.
pub trait MetricSink {
    fn add_scalar(&mut self, tag: &str, step: i64, value: f64) -> Result<()>;

    /// Add a `[channels, height, width]` image with values in `[0, 1]`.
    fn add_image(&mut self, tag: &str, step: i64, image: &Tensor) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MetricSink for NullSink {
    fn add_scalar(&mut self, _tag: &str, _step: i64, _value: f64) -> Result<()> {
        Ok(())
    }

    fn add_image(&mut self, _tag: &str, _step: i64, _image: &Tensor) -> Result<()> {
        Ok(())
    }
}

/// Keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub scalars: Vec<(String, i64, f64)>,
    pub images: Vec<(String, i64, Tensor)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(&self, tag: &str) -> Option<f64> {
        self.scalars
            .iter()
            .rev()
            .find(|(name, _, _)| name == tag)
            .map(|(_, _, value)| *value)
    }
}

impl MetricSink for MemorySink {
    fn add_scalar(&mut self, tag: &str, step: i64, value: f64) -> Result<()> {
        self.scalars.push((tag.to_owned(), step, value));
        Ok(())
    }

    fn add_image(&mut self, tag: &str, step: i64, image: &Tensor) -> Result<()> {
        self.images.push((tag.to_owned(), step, image.shallow_clone()));
        Ok(())
    }
}

/// The metrics of one evaluated sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMetrics {
    pub disparity_loss: f64,
    pub voxel_loss: f64,
    pub ious: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorInit {
    pub thresholds: Vec<R64>,
    /// The step at which images and epoch scalars are reported.
    pub epoch: i64,
    /// The expected number of samples, only used in log messages.
    pub num_records: Option<usize>,
    /// Disparity images are emitted for this many leading samples.
    pub num_image_samples: usize,
}

impl EvaluatorInit {
    pub fn build<D, R>(self, inference: StereoInference<D, R>) -> Result<Evaluator<D, R>>
    where
        D: DisparityModel,
        R: ReconstructionModel,
    {
        let Self {
            thresholds,
            epoch,
            num_records,
            num_image_samples,
        } = self;

        ensure!(
            thresholds
                .iter()
                .all(|threshold| (0.0..=1.0).contains(&threshold.raw())),
            "IoU thresholds must be within [0, 1]"
        );

        Ok(Evaluator {
            inference,
            accumulator: MetricAccumulator::new(thresholds)?,
            epoch,
            num_records,
            num_image_samples,
            num_evaluated: 0,
        })
    }
}

/// Runs inference on each sample and folds its metrics into the accumulator.
#[derive(Debug)]
pub struct Evaluator<D, R>
where
    D: DisparityModel,
    R: ReconstructionModel,
{
    inference: StereoInference<D, R>,
    accumulator: MetricAccumulator,
    epoch: i64,
    num_records: Option<usize>,
    num_image_samples: usize,
    num_evaluated: usize,
}

impl<D, R> Evaluator<D, R>
where
    D: DisparityModel,
    R: ReconstructionModel,
{
    pub fn accumulator(&self) -> &MetricAccumulator {
        &self.accumulator
    }

    pub fn num_evaluated(&self) -> usize {
        self.num_evaluated
    }

    /// Evaluate a transformed record with `[C, H, W]` images and `[1, H, W]` disparity maps.
    pub fn step(
        &mut self,
        record: &StereoRecord,
        sink: &mut dyn MetricSink,
    ) -> Result<SampleMetrics> {
        let StereoRecord {
            taxonomy_id,
            sample_name,
            images,
            volume,
            ..
        } = record;
        let device = self.inference.device();
        let index = self.num_evaluated;

        ensure!(
            images.left_rgb.dim() == 3 && images.left_disparity.dim() == 3,
            "expect channel-first images, but get shapes {:?} and {:?}",
            images.left_rgb.size(),
            images.left_disparity.size()
        );

        let output = self.inference.forward(
            &images.left_rgb.unsqueeze(0),
            &images.right_rgb.unsqueeze(0),
        )?;

        let metrics = tch::no_grad(|| -> Result<_> {
            let left_target = images.left_disparity.unsqueeze(0).to_device(device);
            let right_target = images.right_disparity.unsqueeze(0).to_device(device);
            let disparity_loss = f64::from(&disparity_loss(
                &output.left_disparity,
                &output.right_disparity,
                &left_target,
                &right_target,
            )?);

            let volume_target = volume.to_device(device);
            ensure!(
                output.volume.numel() == volume_target.numel(),
                "reconstructed volume shape {:?} does not match ground truth shape {:?}",
                output.volume.size(),
                volume_target.size()
            );
            let prediction = output.volume.f_reshape(&volume_target.size())?;
            let voxel_loss = f64::from(&voxel_loss(&prediction, &volume_target)?);
            let ious = volume_iou(&prediction, &volume_target, self.accumulator.thresholds())?;

            Ok(SampleMetrics {
                disparity_loss,
                voxel_loss,
                ious,
            })
        })?;

        self.accumulator.update(
            taxonomy_id,
            metrics.disparity_loss,
            metrics.voxel_loss,
            metrics.ious.clone(),
        )?;
        self.num_evaluated += 1;

        let total = self
            .num_records
            .map(|total| total.to_string())
            .unwrap_or_else(|| "?".to_owned());
        info!(
            "test[{}/{}] taxonomy = {} sample = {} dloss = {:.4} vloss = {:.4} iou = [{}]",
            index + 1,
            total,
            taxonomy_id,
            sample_name,
            metrics.disparity_loss,
            metrics.voxel_loss,
            metrics.ious.iter().map(|iou| format!("{:.4}", iou)).join(", ")
        );

        if index < self.num_image_samples {
            let disparities = [
                ("Disparity Estimated/Left", &output.left_disparity),
                ("Disparity GroundTruth/Left", &images.left_disparity),
                ("Disparity Estimated/Right", &output.right_disparity),
                ("Disparity GroundTruth/Right", &images.right_disparity),
            ];
            for (name, disparity) in disparities {
                let tag = format!("#{:02}/{}", index, name);
                sink.add_image(&tag, self.epoch, &disparity_image(disparity)?)?;
            }
        }

        Ok(metrics)
    }

    /// Evaluate the records in order and aggregate them.
    ///
    /// The pass stops at the first failed record without reporting epoch scalars.
    pub fn run<I>(
        &mut self,
        records: I,
        manifest: &TaxonomyManifest,
        sink: &mut dyn MetricSink,
    ) -> Result<AggregateReport>
    where
        I: IntoIterator<Item = Result<StereoRecord>>,
    {
        for result in records {
            let record = result?;
            self.step(&record, sink)?;
        }
        self.finish(manifest, sink)
    }

    /// Aggregate the collected metrics and report the epoch scalars to the sink.
    pub fn finish(
        &self,
        manifest: &TaxonomyManifest,
        sink: &mut dyn MetricSink,
    ) -> Result<AggregateReport> {
        let report = self.accumulator.aggregate(manifest)?;
        sink.add_scalar("DispNet/EpochLoss", self.epoch, report.disparity_loss)?;
        sink.add_scalar("RecNet/EpochLoss", self.epoch, report.voxel_loss)?;
        sink.add_scalar("RecNet/IoU", self.epoch, report.max_iou)?;
        Ok(report)
    }
}

/// Scale a disparity map to a `[1, H, W]` image in `[0, 1]`.
fn disparity_image(disparity: &Tensor) -> Result<Tensor> {
    tch::no_grad(|| {
        let size = disparity.size();
        ensure!(size.len() >= 2, "invalid disparity shape {:?}", size);
        let height = size[size.len() - 2];
        let width = size[size.len() - 1];

        let image = disparity
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .f_reshape(&[1, height, width])?;
        let max = image.f_max()?.f_clamp_min(1e-6)?;
        let image = image.f_div(&max)?.f_clamp(0.0, 1.0)?;
        Ok(image)
    })
}
