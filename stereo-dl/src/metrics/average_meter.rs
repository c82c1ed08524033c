use crate::common::*;

/// Keeps the last value, the sum and the running average of a series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AverageMeter {
    pub val: f64,
    pub sum: f64,
    pub count: usize,
    pub avg: f64,
}

impl AverageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, val: f64) {
        self.update_n(val, 1);
    }

    /// Fold in a value that stands for `n` observations.
    pub fn update_n(&mut self, val: f64, n: usize) {
        self.val = val;
        self.sum += val * n as f64;
        self.count += n;
        self.avg = self.sum / self.count as f64;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
