//! Image preprocessing transforms.
//!
//! Transforms except [ToTensor] work on images in `[height, width, channels]`
//! layout and disparity maps in `[height, width]` layout, the layout produced by
//! the dataset loader.

mod center_crop;
mod channel_order;
mod normalize;
mod random_background;
mod to_tensor;
mod transform;

pub use center_crop::*;
pub use channel_order::*;
pub use normalize::*;
pub use random_background::*;
pub use to_tensor::*;
pub use transform::*;
