//! Evaluation program configuration format.

use crate::common::*;
use stereo_dl::dataset::{DatasetSplit, PathTemplates};

pub use dataset::*;
pub use evaluation::*;
pub use model::*;
pub use preprocess::*;

pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq::parse("0.1.0").unwrap());

/// The main evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Version,
    pub dataset: DatasetConfig,
    pub preprocess: PreprocessConfig,
    pub model: ModelConfig,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        Self::from_json5(&text)
    }

    pub fn from_json5(text: &str) -> Result<Self> {
        let config: Self = json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let EvaluationConfig { thresholds, .. } = &self.evaluation;
        ensure!(!thresholds.is_empty(), "evaluation.thresholds must not be empty");
        ensure!(
            thresholds
                .iter()
                .all(|threshold| (0.0..=1.0).contains(&threshold.raw())),
            "evaluation.thresholds must be within [0, 1], but get {:?}",
            thresholds
        );
        self.dataset.templates.validate()?;
        Ok(())
    }
}

mod dataset {
    use super::*;

    /// Dataset options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DatasetConfig {
        /// The JSON file listing taxonomies and their sample names.
        pub taxonomy_file: PathBuf,
        pub split: DatasetSplit,
        /// The number of rendered views per sample.
        pub num_views: NonZeroUsize,
        /// The seed of view selection and background colors. The OS entropy is used if not set.
        pub seed: Option<u64>,
        pub templates: PathTemplates,
    }
}

mod preprocess {
    use super::*;

    /// Input image preprocessing options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PreprocessConfig {
        /// The output `[height, width]`.
        pub image_size: [usize; 2],
        /// The `[height, width]` of the center crop.
        pub crop_size: [usize; 2],
        /// Inclusive `[min, max]` ranges of the background color for each RGB channel.
        pub background_color_range: [[u8; 2]; 3],
        /// Reorder the images to BGR after background filling, the channel order
        /// of models trained on OpenCV decoded images.
        #[serde(default)]
        pub bgr: bool,
        /// The per-channel mean in the output channel order.
        pub mean: Vec<f64>,
        pub std: Vec<f64>,
    }
}

mod model {
    use super::*;

    /// Model configuration.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModelConfig {
        /// The TorchScript file of the disparity model.
        pub disparity_model_file: PathBuf,
        /// The TorchScript file of the reconstruction model.
        pub reconstruction_model_file: PathBuf,
        #[serde(default)]
        pub fusion: FusionConfig,
        /// The device where the models run.
        #[serde(with = "tch_serde::serde_device")]
        pub device: Device,
    }

    /// The fusion of reconstructed left and right volumes.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind")]
    pub enum FusionConfig {
        Mean,
        Max,
        Learned { model_file: PathBuf },
    }

    impl Default for FusionConfig {
        fn default() -> Self {
            Self::Mean
        }
    }
}

mod evaluation {
    use super::*;

    /// Evaluation options.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct EvaluationConfig {
        /// IoU thresholds on occupancy probabilities.
        pub thresholds: Vec<R64>,
        /// The step of reported images and scalars.
        #[serde(default)]
        pub epoch: i64,
        /// The number of loaded samples buffered ahead of inference.
        #[serde(default = "default_channel_size")]
        pub channel_size: NonZeroUsize,
    }

    fn default_channel_size() -> NonZeroUsize {
        NonZeroUsize::new(2).unwrap()
    }
}

/// Data logging options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub enable_images: bool,
    /// Disparity images are logged for this many leading samples.
    #[serde(default)]
    pub num_image_samples: usize,
}

pub fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
