//! Model interfaces and the stereo inference pipeline.

mod fusion;
mod inference;
mod interface;

pub use fusion::*;
pub use inference::*;
pub use interface::*;
