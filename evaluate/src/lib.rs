//! The evaluation program of stereo volumetric reconstruction models.

mod common;
pub mod config;
pub mod input_stream;
pub mod logging;

use crate::{
    common::*,
    config::{Config, FusionConfig},
    input_stream::InputStream,
    logging::{ChannelSink, LoggingMessage},
};
use stereo_dl::{
    dataset::{StereoRecord, TaxonomyManifest},
    evaluator::EvaluatorInit,
    metrics::AggregateReport,
    model::{
        load_script_module, LearnedFusion, MaxFusion, MeanFusion, StereoInference, VolumeFusion,
    },
};

pub const FILE_STRFTIME: &str = "%Y-%m-%d-%H-%M-%S.%3f%z";
const LOGGING_CHANNEL_SIZE: usize = 16;

/// The entry of evaluation program.
pub async fn start(config: Arc<Config>) -> Result<AggregateReport> {
    let start_time = Local::now();
    let logging_dir: Arc<Path> = {
        let dir = config
            .logging
            .dir
            .join(format!("{}", start_time.format(FILE_STRFTIME)));
        dir.into_boxed_path().into()
    };

    // create dirs and save config
    {
        tokio::fs::create_dir_all(&*logging_dir).await?;
        let path = logging_dir.join("config.json5");
        let text = serde_json::to_string_pretty(&*config)?;
        tokio::fs::write(&path, text).await?;
    }

    // create channels
    let (logging_tx, logging_rx) = mpsc::channel(LOGGING_CHANNEL_SIZE);
    let (data_tx, data_rx) = mpsc::channel(config.evaluation.channel_size.get());

    // load dataset
    info!("loading dataset");
    let input_stream = InputStream::new(&config).await?;
    let manifest = input_stream.manifest().clone();
    let num_records = input_stream.num_records();
    info!("{} samples to be evaluated", num_records);

    // start logger
    let logging_future = logging::logging_worker(&config.logging, &logging_dir, logging_rx).await?;

    // feeding worker
    let data_future = tokio::task::spawn(async move {
        let mut stream = input_stream.stream();

        // the first failure is forwarded and ends the stream
        while let Some(result) = stream.next().await {
            let is_err = result.is_err();
            data_tx
                .send(result)
                .await
                .map_err(|_| format_err!("failed to send message to evaluation worker"))?;
            if is_err {
                break;
            }
        }

        Fallible::Ok(())
    })
    .map(|result| Fallible::Ok(result??));

    // evaluation worker
    let evaluation_future = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            evaluation_worker(config, manifest, num_records, data_rx, logging_tx)
        })
        .map(|result| Fallible::Ok(result??))
    };

    let ((), report, ()) = futures::try_join!(data_future, evaluation_future, logging_future)?;

    Ok(report)
}

fn evaluation_worker(
    config: Arc<Config>,
    manifest: Arc<TaxonomyManifest>,
    num_records: usize,
    mut data_rx: mpsc::Receiver<Result<StereoRecord>>,
    logging_tx: mpsc::Sender<LoggingMessage>,
) -> Result<AggregateReport> {
    let Config {
        ref model,
        ref evaluation,
        ref logging,
        ..
    } = *config;
    let device = model.device;

    info!("loading models");
    let disparity_model = load_script_module(&model.disparity_model_file, device)?;
    let reconstruction_model = load_script_module(&model.reconstruction_model_file, device)?;
    let fusion: Box<dyn VolumeFusion> = match &model.fusion {
        FusionConfig::Mean => Box::new(MeanFusion),
        FusionConfig::Max => Box::new(MaxFusion),
        FusionConfig::Learned { model_file } => {
            Box::new(LearnedFusion::new(load_script_module(model_file, device)?))
        }
    };
    let inference = StereoInference::new(disparity_model, reconstruction_model, fusion, device);

    let mut evaluator = EvaluatorInit {
        thresholds: evaluation.thresholds.clone(),
        epoch: evaluation.epoch,
        num_records: Some(num_records),
        num_image_samples: if logging.enable_images {
            logging.num_image_samples
        } else {
            0
        },
    }
    .build(inference)?;
    let mut sink = ChannelSink::new(logging_tx);

    let records = iter::from_fn(|| data_rx.blocking_recv());
    let report = evaluator.run(records, &manifest, &mut sink)?;
    Ok(report)
}
