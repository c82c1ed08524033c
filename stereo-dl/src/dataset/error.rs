use crate::common::*;

/// Dataset failures that callers may want to tell apart.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The volume container yields no ground truth data. The evaluation cannot continue.
    #[error("failed to get volume data from file '{}'", .path.display())]
    EmptyVolume { path: PathBuf },
    #[error("channel '{channel}' is not found in file '{}'", .path.display())]
    MissingChannel { path: PathBuf, channel: String },
}
