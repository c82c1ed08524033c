use crate::{
    common::*,
    config::{Config, DatasetConfig, PreprocessConfig},
};
use stereo_dl::{
    dataset::{SampleIndex, SampleLoader, StereoDataset, StereoRecord, TaxonomyManifest},
    processor::{
        CenterCrop, Compose, Normalize, RandomBackground, RgbToBgr, StereoTransform, ToTensor,
    },
};

/// The evaluation input of the configured dataset split.
#[derive(Debug)]
pub struct InputStream {
    manifest: Arc<TaxonomyManifest>,
    dataset: StereoDataset,
}

impl InputStream {
    pub async fn new(config: &Config) -> Result<Self> {
        let Config {
            dataset:
                DatasetConfig {
                    ref taxonomy_file,
                    split,
                    num_views,
                    seed,
                    ref templates,
                },
            ref preprocess,
            ..
        } = *config;

        let manifest = TaxonomyManifest::load(taxonomy_file).await?;
        info!("loaded {} taxonomies", manifest.len());

        let index = SampleIndex::build(&manifest, split, num_views.get(), templates)?;
        let transform: Arc<dyn StereoTransform> = Arc::new(build_transform(preprocess, seed)?);
        let dataset = StereoDataset::new(index, SampleLoader::new(seed), Some(transform));

        Ok(Self {
            manifest: Arc::new(manifest),
            dataset,
        })
    }

    pub fn manifest(&self) -> &Arc<TaxonomyManifest> {
        &self.manifest
    }

    pub fn num_records(&self) -> usize {
        self.dataset.num_records()
    }

    pub fn stream(self) -> Pin<Box<dyn Stream<Item = Result<StereoRecord>> + Send>> {
        self.dataset.stream()
    }
}

/// Build the preprocessing pipeline in the order of crop, background filling,
/// optional BGR reordering, normalization and layout conversion.
pub fn build_transform(preprocess: &PreprocessConfig, seed: Option<u64>) -> Result<Compose> {
    let PreprocessConfig {
        image_size,
        crop_size,
        background_color_range,
        bgr,
        ref mean,
        ref std,
    } = *preprocess;

    let mut transform = Compose::default();
    transform.push(CenterCrop::new(image_size, crop_size)?);
    transform.push(RandomBackground::new(background_color_range, seed)?);
    if bgr {
        transform.push(RgbToBgr);
    }
    transform.push(Normalize::new(mean.clone(), std.clone())?);
    transform.push(ToTensor);
    Ok(transform)
}
