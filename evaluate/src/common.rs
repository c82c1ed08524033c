//! Common imports from external crates.

pub use anyhow::{ensure, format_err, Context, Error, Result};
pub use chrono::Local;
pub use futures::{
    future::FutureExt,
    stream::{Stream, StreamExt},
};
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use semver::{Version, VersionReq};
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize};
pub use std::{
    fs,
    future::Future,
    iter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    pin::Pin,
    sync::Arc,
};
pub use tch::{Device, Kind, Tensor};
pub use tfrecord::{EventWriter, EventWriterInit};
pub use tokio::sync::mpsc;
pub use tracing::info;

pub type Fallible<T> = Result<T, Error>;
