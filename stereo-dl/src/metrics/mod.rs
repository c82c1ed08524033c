//! Metric accumulation and report aggregation.

mod accumulator;
mod average_meter;
mod iou;
mod report;

pub use accumulator::*;
pub use average_meter::*;
pub use iou::*;
pub use report::*;
