use anyhow::{Context, Result};
use evaluate::config::Config;
use std::{env, path::PathBuf, process, sync::Arc};
use stereo_dl::dataset::DatasetError;
use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

#[derive(Debug, Clone, StructOpt)]
/// Evaluate stereo volumetric reconstruction models
struct Args {
    #[structopt(long, default_value = "evaluate.json5")]
    /// configuration file
    pub config_file: PathBuf,
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    let Args { config_file } = Args::from_args();
    let config = Arc::new(
        Config::open(&config_file)
            .with_context(|| format!("failed to load config file '{}'", config_file.display()))?,
    );

    // start evaluation program
    match evaluate::start(config).await {
        Ok(report) => {
            println!("{}", report);
            info!("max IoU = {:.4}", report.max_iou);
            Ok(())
        }
        Err(err) => {
            if let Some(DatasetError::EmptyVolume { .. }) = err.downcast_ref::<DatasetError>() {
                error!("fatal: {:#}", err);
                process::exit(2);
            }
            Err(err)
        }
    }
}
