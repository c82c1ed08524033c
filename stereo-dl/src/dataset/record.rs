use crate::common::*;

/// The file paths of one camera view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewFiles {
    pub left_rgb: PathBuf,
    pub right_rgb: PathBuf,
    pub left_disparity: PathBuf,
    pub right_disparity: PathBuf,
}

/// The record with file paths of a sample, but without data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleDescriptor {
    pub taxonomy_id: String,
    pub sample_name: String,
    /// Per-view files ordered by view index.
    pub views: Vec<ViewFiles>,
    pub volume: PathBuf,
}

impl SampleDescriptor {
    pub fn num_views(&self) -> usize {
        self.views.len()
    }
}

/// The four images of a stereo view.
#[derive(Debug, TensorLike)]
pub struct StereoImages {
    pub left_rgb: Tensor,
    pub right_rgb: Tensor,
    pub left_disparity: Tensor,
    pub right_disparity: Tensor,
}

/// The record with decoded images and ground truth volume.
#[derive(Debug, TensorLike)]
pub struct StereoRecord {
    #[tensor_like(clone)]
    pub taxonomy_id: String,
    #[tensor_like(clone)]
    pub sample_name: String,
    #[tensor_like(clone)]
    pub view_index: usize,
    pub images: StereoImages,
    /// The occupancy grid in `[depth, height, width]` shape.
    pub volume: Tensor,
}
