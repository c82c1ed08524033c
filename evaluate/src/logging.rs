//! Data logging toolkit.

use crate::{common::*, config::LoggingConfig};
use async_std::{fs::File, io::BufWriter};
use stereo_dl::evaluator::MetricSink;

pub use logging_message::*;
pub use logging_worker::*;

mod logging_worker {
    use super::*;

    /// The data logging worker.
    #[derive(Debug)]
    pub struct LoggingWorker {
        enable_images: bool,
        event_writer: EventWriter<BufWriter<File>>,
        rx: mpsc::Receiver<LoggingMessage>,
    }

    impl LoggingWorker {
        /// Create a data logging worker.
        async fn new(
            config: &LoggingConfig,
            logging_dir: &Path,
            rx: mpsc::Receiver<LoggingMessage>,
        ) -> Result<Self> {
            // prepare dirs
            let event_dir = logging_dir.join("events");
            let event_path_prefix = event_dir
                .join("stereo-dl")
                .into_os_string()
                .into_string()
                .map_err(|path| format_err!("non-unicode event path {:?}", path))?;

            tokio::fs::create_dir_all(&event_dir).await?;

            let event_writer = EventWriterInit::default()
                .from_prefix_async(event_path_prefix, None)
                .await?;

            Ok(Self {
                enable_images: config.enable_images,
                event_writer,
                rx,
            })
        }

        /// Start the data logging worker.
        ///
        /// It runs until all senders are dropped.
        async fn start(mut self) -> Result<()> {
            while let Some(msg) = self.rx.recv().await {
                match msg {
                    LoggingMessage::Scalar { tag, step, value } => {
                        self.event_writer
                            .write_scalar_async(tag, step, value as f32)
                            .await?;
                    }
                    LoggingMessage::Image { tag, step, image } => {
                        if self.enable_images {
                            self.event_writer
                                .write_image_async(tag, step, image)
                                .await?;
                        }
                    }
                }
            }

            Ok(())
        }
    }

    pub async fn logging_worker(
        config: &LoggingConfig,
        logging_dir: &Path,
        rx: mpsc::Receiver<LoggingMessage>,
    ) -> Result<impl Future<Output = Result<()>> + Send> {
        let worker = LoggingWorker::new(config, logging_dir, rx).await?;
        Ok(tokio::task::spawn(worker.start()).map(|result| Fallible::Ok(result??)))
    }
}

mod logging_message {
    use super::*;

    /// The message type that is accepted by the logging worker.
    #[derive(Debug)]
    pub enum LoggingMessage {
        Scalar {
            tag: String,
            step: i64,
            value: f64,
        },
        /// A `[channels, height, width]` image with values in `[0, 1]`.
        Image {
            tag: String,
            step: i64,
            image: Tensor,
        },
    }

    /// The metric sink that forwards to the logging worker.
    ///
    /// It blocks when the channel is full, so it must not be used on an async task.
    #[derive(Debug, Clone)]
    pub struct ChannelSink {
        tx: mpsc::Sender<LoggingMessage>,
    }

    impl ChannelSink {
        pub fn new(tx: mpsc::Sender<LoggingMessage>) -> Self {
            Self { tx }
        }

        fn send(&self, msg: LoggingMessage) -> Result<()> {
            self.tx
                .blocking_send(msg)
                .map_err(|_| format_err!("the logging worker is closed"))
        }
    }

    impl MetricSink for ChannelSink {
        fn add_scalar(&mut self, tag: &str, step: i64, value: f64) -> Result<()> {
            self.send(LoggingMessage::Scalar {
                tag: tag.to_owned(),
                step,
                value,
            })
        }

        fn add_image(&mut self, tag: &str, step: i64, image: &Tensor) -> Result<()> {
            let image = image.to_device(Device::Cpu).to_kind(Kind::Float);
            self.send(LoggingMessage::Image {
                tag: tag.to_owned(),
                step,
                image,
            })
        }
    }
}
