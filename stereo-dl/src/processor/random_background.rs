use super::*;
use crate::{common::*, dataset::StereoImages};

/// Fills transparent pixels of RGBA images with a random color and drops the
/// alpha channel.
///
/// One color is drawn per call and shared by the left and right images. Images
/// without an alpha channel and disparity maps are passed through.
#[derive(Debug)]
pub struct RandomBackground {
    color_range: [[u8; 2]; 3],
    rng: Mutex<StdRng>,
}

impl RandomBackground {
    /// Create the transform with inclusive `[min, max]` ranges for each color channel.
    pub fn new(color_range: [[u8; 2]; 3], seed: Option<u64>) -> Result<Self> {
        ensure!(
            color_range.iter().all(|&[min, max]| min <= max),
            "invalid background color range {:?}",
            color_range
        );

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            color_range,
            rng: Mutex::new(rng),
        })
    }

    fn sample_color(&self) -> Result<[f64; 3]> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| format_err!("the random generator lock is poisoned"))?;
        let [red, green, blue] = self
            .color_range
            .map(|[min, max]| rng.gen_range(min..=max) as f64);
        Ok([red, green, blue])
    }

    fn fill(image: Tensor, color: &Tensor) -> Result<Tensor> {
        match hwc_shape(&image)? {
            (_, _, Some(4)) => {
                let rgb = image.f_narrow(2, 0, 3)?;
                let transparent = image.f_narrow(2, 3, 1)?.f_eq(0.0)?.f_to_kind(rgb.kind())?;
                let color = color.f_to_kind(rgb.kind())?.f_view([1, 1, 3])?;
                let output = &rgb + (&color - &rgb) * &transparent;
                Ok(output)
            }
            _ => Ok(image),
        }
    }
}

impl StereoTransform for RandomBackground {
    fn apply(&self, images: StereoImages) -> Result<StereoImages> {
        let StereoImages {
            left_rgb,
            right_rgb,
            left_disparity,
            right_disparity,
        } = images;
        let color = Tensor::of_slice(&self.sample_color()?);

        Ok(StereoImages {
            left_rgb: Self::fill(left_rgb, &color)?,
            right_rgb: Self::fill(right_rgb, &color)?,
            left_disparity,
            right_disparity,
        })
    }
}
