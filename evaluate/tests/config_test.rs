use evaluate::{
    config::{Config, FusionConfig},
    input_stream::build_transform,
};
use stereo_dl::dataset::DatasetSplit;
use tch::Device;

fn config_text(version: &str, model_extra: &str, thresholds: &str) -> String {
    format!(
        r#"{{
    version: "{version}",
    dataset: {{
        taxonomy_file: "datasets/ShapeNet.json",
        split: "val",
        num_views: 2,
        templates: {{
            left_rgb: "data/%s/%s/render_%02d_l.png",
            right_rgb: "data/%s/%s/render_%02d_r.png",
            left_disparity: "data/%s/%s/disp_%02d_l.exr",
            right_disparity: "data/%s/%s/disp_%02d_r.exr",
            volume: "voxels/%s/%s.mat",
        }},
    }},
    preprocess: {{
        image_size: [224, 224],
        crop_size: [128, 128],
        background_color_range: [[240, 240], [240, 240], [240, 240]],
        mean: [0.5, 0.5, 0.5],
        std: [0.5, 0.5, 0.5],
    }},
    model: {{
        disparity_model_file: "dispnet.pt",
        reconstruction_model_file: "recnet.pt",
        device: "cpu",
        {model_extra}
    }},
    evaluation: {{
        thresholds: {thresholds},
    }},
    logging: {{
        dir: "logs",
        enable_images: false,
    }},
}}"#,
        version = version,
        model_extra = model_extra,
        thresholds = thresholds,
    )
}

#[test]
fn parse_config_test() -> anyhow::Result<()> {
    let config = Config::from_json5(&config_text("0.1.0", "", "[0.2, 0.5]"))?;

    assert_eq!(config.dataset.split, DatasetSplit::Val);
    assert_eq!(config.dataset.num_views.get(), 2);
    assert_eq!(config.dataset.seed, None);
    assert_eq!(config.model.fusion, FusionConfig::Mean);
    assert_eq!(config.model.device, Device::Cpu);
    assert_eq!(config.evaluation.thresholds.len(), 2);
    assert_eq!(config.evaluation.epoch, 0);
    assert_eq!(config.evaluation.channel_size.get(), 2);
    assert_eq!(config.logging.num_image_samples, 0);
    assert!(!config.preprocess.bgr);
    Ok(())
}

#[test]
fn bgr_pipeline_test() -> anyhow::Result<()> {
    let mut config = Config::from_json5(&config_text("0.1.0", "", "[0.5]"))?;
    assert_eq!(build_transform(&config.preprocess, Some(0))?.len(), 4);

    config.preprocess.bgr = true;
    assert_eq!(build_transform(&config.preprocess, Some(0))?.len(), 5);
    Ok(())
}

#[test]
fn parse_fusion_test() -> anyhow::Result<()> {
    let text = config_text(
        "0.1.2",
        r#"fusion: { kind: "Learned", model_file: "fusion.pt" },"#,
        "[0.4]",
    );
    let config = Config::from_json5(&text)?;
    assert_eq!(
        config.model.fusion,
        FusionConfig::Learned {
            model_file: "fusion.pt".into()
        }
    );

    let text = config_text("0.1.0", r#"fusion: { kind: "Max" },"#, "[0.4]");
    assert_eq!(Config::from_json5(&text)?.model.fusion, FusionConfig::Max);
    Ok(())
}

#[test]
fn reject_incompatible_version_test() {
    assert!(Config::from_json5(&config_text("0.2.0", "", "[0.5]")).is_err());
    assert!(Config::from_json5(&config_text("not-a-version", "", "[0.5]")).is_err());
}

#[test]
fn reject_invalid_thresholds_test() {
    assert!(Config::from_json5(&config_text("0.1.0", "", "[]")).is_err());
    assert!(Config::from_json5(&config_text("0.1.0", "", "[0.5, 1.5]")).is_err());
}

#[test]
fn sample_config_test() -> anyhow::Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/evaluate.json5");
    let text = std::fs::read_to_string(path)?.replace("\"cuda(0)\"", "\"cpu\"");
    let config = Config::from_json5(&text)?;
    assert_eq!(config.dataset.split, DatasetSplit::Test);
    assert_eq!(config.evaluation.thresholds.len(), 4);
    Ok(())
}
