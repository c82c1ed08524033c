use crate::{common::*, dataset::StereoImages};

/// The transform applied uniformly to the four images of a stereo view.
pub trait StereoTransform
where
    Self: Debug + Send + Sync,
{
    fn apply(&self, images: StereoImages) -> Result<StereoImages>;
}

/// Chains transforms in order.
#[derive(Debug, Default)]
pub struct Compose {
    transforms: Vec<Box<dyn StereoTransform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn StereoTransform>>) -> Self {
        Self { transforms }
    }

    pub fn push<T>(&mut self, transform: T)
    where
        T: 'static + StereoTransform,
    {
        self.transforms.push(Box::new(transform));
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl StereoTransform for Compose {
    fn apply(&self, images: StereoImages) -> Result<StereoImages> {
        self.transforms
            .iter()
            .try_fold(images, |images, transform| transform.apply(images))
    }
}

/// Split an image shape into `(height, width, channels)`.
///
/// Disparity maps in `[height, width]` shape have no channel dimension.
pub(crate) fn hwc_shape(image: &Tensor) -> Result<(i64, i64, Option<i64>)> {
    let shape = match *image.size().as_slice() {
        [height, width] => (height, width, None),
        [height, width, channels] => (height, width, Some(channels)),
        ref shape => bail!(
            "invalid shape {:?}: expect [height, width] or [height, width, channels]",
            shape
        ),
    };
    Ok(shape)
}
