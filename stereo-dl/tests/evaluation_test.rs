mod common;

use anyhow::{ensure, Result};
use approx::assert_abs_diff_eq;
use common::{SampleFixture, IMAGE_HEIGHT, IMAGE_WIDTH, VOLUME_SIZE};
use futures::TryStreamExt as _;
use noisy_float::prelude::*;
use std::sync::Arc;
use stereo_dl::{
    dataset::{DatasetSplit, SampleIndex, SampleLoader, StereoDataset, StereoRecord},
    evaluator::{EvaluatorInit, MemorySink},
    model::{DisparityModel, MeanFusion, ReconstructionModel, StereoInference},
    processor::{Compose, RandomBackground, StereoTransform, ToTensor},
};
use tch::{Device, IndexOp, Kind, Tensor};

const NUM_VIEWS: usize = 3;

/// Estimates a zero disparity map.
struct ZeroDisparity;

impl DisparityModel for ZeroDisparity {
    fn forward_disparity(&self, left: &Tensor, right: &Tensor) -> Result<(Tensor, Tensor)> {
        ensure!(left.size() == right.size(), "mismatched stereo pair");
        let (_, _, height, width) = left.size4()?;
        let disparity = Tensor::zeros(&[1, 1, height, width], (Kind::Float, Device::Cpu));
        Ok((disparity.shallow_clone(), disparity))
    }
}

/// Predicts the same probability everywhere.
struct ConstantVolume(f64);

impl ReconstructionModel for ConstantVolume {
    fn forward_volume(&self, input: &Tensor) -> Result<Tensor> {
        ensure!(input.size()[1] == 4, "expect an RGB-D input");
        let size = VOLUME_SIZE as i64;
        Ok(Tensor::full(
            &[1, size, size, size],
            self.0,
            (Kind::Float, Device::Cpu),
        ))
    }
}

fn build_dataset(root: &std::path::Path, seed: u64) -> Result<StereoDataset> {
    let samples = [
        SampleFixture {
            taxonomy_id: "02691156",
            sample_name: "a0",
            occupancy: Some(1.0),
        },
        SampleFixture {
            taxonomy_id: "02691156",
            sample_name: "a1",
            occupancy: None,
        },
        SampleFixture {
            taxonomy_id: "02691156",
            sample_name: "a2",
            occupancy: Some(1.0),
        },
        SampleFixture {
            taxonomy_id: "02828884",
            sample_name: "b0",
            occupancy: Some(0.5),
        },
    ];
    for sample in &samples {
        common::write_sample(root, NUM_VIEWS, sample)?;
    }

    let manifest = common::manifest(&[
        ("02691156", "aeroplane", &["a0", "a1", "a2"][..]),
        ("02828884", "bench", &["b0"][..]),
    ]);
    let index = SampleIndex::build(
        &manifest,
        DatasetSplit::Test,
        NUM_VIEWS,
        &common::templates(root),
    )?;

    let mut transform = Compose::default();
    transform.push(RandomBackground::new([[0, 255]; 3], Some(seed))?);
    transform.push(ToTensor);
    let transform: Arc<dyn StereoTransform> = Arc::new(transform);

    Ok(StereoDataset::new(
        index,
        SampleLoader::new(Some(seed)),
        Some(transform),
    ))
}

async fn collect_records(root: &std::path::Path, seed: u64) -> Result<Vec<StereoRecord>> {
    let dataset = build_dataset(root, seed)?;
    assert_eq!(dataset.num_records(), 3);
    dataset.stream().try_collect().await
}

#[test]
fn load_sample_test() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut dataset = build_dataset(dir.path(), 3)?;
    let descriptor = dataset.index().descriptors[0].clone();

    // untransformed records keep the [H, W, C] and [H, W] layouts
    let load_views = |seed: u64| -> Result<Vec<usize>> {
        let mut loader = SampleLoader::new(Some(seed));
        (0..8)
            .map(|_| {
                let record = loader.load(&descriptor)?;
                let images = &record.images;
                assert_eq!(record.sample_name, "a0");
                assert_eq!(
                    images.left_rgb.size(),
                    [IMAGE_HEIGHT as i64, IMAGE_WIDTH as i64, 4]
                );
                assert_eq!(
                    f32::from(images.left_rgb.i((0, 0, 0))),
                    (record.view_index * 10) as f32
                );
                assert_eq!(
                    f32::from(images.left_disparity.i((0, 0))),
                    record.view_index as f32
                );
                Ok(record.view_index)
            })
            .collect()
    };
    let views = load_views(3)?;
    assert!(views.iter().all(|&view| view < NUM_VIEWS));
    assert_eq!(views, load_views(3)?);

    let record = dataset.nth(2)?;
    assert_eq!(record.sample_name, "b0");
    assert_eq!(
        record.images.right_rgb.size(),
        [3, IMAGE_HEIGHT as i64, IMAGE_WIDTH as i64]
    );
    assert_eq!(
        f32::from(record.images.right_rgb.i((0, 0, 0))),
        (record.view_index * 10) as f32
    );
    assert!(dataset.nth(3).is_err());
    Ok(())
}

#[tokio::test]
async fn stream_records_test() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let records = collect_records(dir.path(), 11).await?;

    let names: Vec<_> = records
        .iter()
        .map(|record| record.sample_name.as_str())
        .collect();
    assert_eq!(names, ["a0", "a2", "b0"]);

    for record in &records {
        let images = &record.images;
        assert!(record.view_index < NUM_VIEWS);
        assert_eq!(
            images.left_rgb.size(),
            [3, IMAGE_HEIGHT as i64, IMAGE_WIDTH as i64]
        );
        assert_eq!(
            images.left_disparity.size(),
            [1, IMAGE_HEIGHT as i64, IMAGE_WIDTH as i64]
        );
        let size = VOLUME_SIZE as i64;
        assert_eq!(record.volume.size(), [size, size, size]);

        // the files of each view are filled with its index
        let pixel = f32::from(images.left_rgb.i((0, 0, 0)));
        let disparity = f32::from(images.right_disparity.i((0, 0, 0)));
        assert_eq!(pixel, (record.view_index * 10) as f32);
        assert_eq!(disparity, record.view_index as f32);
    }

    // the same seed reproduces the view selection
    let other_dir = tempfile::tempdir()?;
    let other_records = collect_records(other_dir.path(), 11).await?;
    let views: Vec<_> = records.iter().map(|record| record.view_index).collect();
    let other_views: Vec<_> = other_records
        .iter()
        .map(|record| record.view_index)
        .collect();
    assert_eq!(views, other_views);

    Ok(())
}

#[tokio::test]
async fn evaluate_dataset_test() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let records = collect_records(dir.path(), 5).await?;

    let inference = StereoInference::new(
        ZeroDisparity,
        ConstantVolume(0.75),
        Box::new(MeanFusion),
        Device::Cpu,
    );
    let mut evaluator = EvaluatorInit {
        thresholds: vec![r64(0.5), r64(0.9)],
        epoch: 0,
        num_records: Some(records.len()),
        num_image_samples: 2,
    }
    .build(inference)?;

    let mut sink = MemorySink::new();
    for record in &records {
        evaluator.step(record, &mut sink)?;
    }

    let manifest = common::manifest(&[
        ("02691156", "aeroplane", &["a0", "a1", "a2"][..]),
        ("02828884", "bench", &["b0"][..]),
    ]);
    let report = evaluator.finish(&manifest, &mut sink)?;

    assert_eq!(report.num_samples, 3);
    let names: Vec<_> = report
        .taxonomies
        .iter()
        .map(|taxonomy| (taxonomy.taxonomy_name.as_str(), taxonomy.num_samples))
        .collect();
    assert_eq!(names, [("aeroplane", 2), ("bench", 1)]);

    // t=0.5 predicts everything occupied, t=0.9 predicts nothing
    assert_abs_diff_eq!(report.taxonomies[0].mean_iou[0], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.taxonomies[1].mean_iou[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(report.overall_iou[0], 2.5 / 3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.overall_iou[1], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(report.max_iou, 2.5 / 3.0, epsilon = 1e-6);

    // four disparity images for each of the first two samples
    assert_eq!(sink.images.len(), 8);
    assert_eq!(sink.images[4].0, "#01/Disparity Estimated/Left");
    assert_eq!(
        sink.scalar("RecNet/IoU").map(|iou| (iou * 1e6).round()),
        Some((2.5 / 3.0 * 1e6f64).round())
    );

    let text = report.to_string();
    assert!(text.contains("aeroplane"));
    assert!(text.contains("0.8333"));

    Ok(())
}
