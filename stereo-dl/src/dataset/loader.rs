use super::*;
use crate::common::*;

/// The loader that decodes one randomly chosen view of a sample per access.
///
/// The random source is owned by the loader, so a fixed seed reproduces the view
/// selection of a run.
#[derive(Debug)]
pub struct SampleLoader {
    rng: StdRng,
}

impl SampleLoader {
    /// Create a loader seeded by `seed`, or by OS entropy if it is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Pick a view index uniformly.
    pub fn select_view(&mut self, descriptor: &SampleDescriptor) -> Result<usize> {
        let num_views = descriptor.num_views();
        ensure!(
            num_views > 0,
            "sample {}/{} has no views",
            descriptor.taxonomy_id,
            descriptor.sample_name
        );
        Ok(self.rng.gen_range(0..num_views))
    }

    /// Load a randomly chosen view and the volume of the sample.
    pub fn load(&mut self, descriptor: &SampleDescriptor) -> Result<StereoRecord> {
        let view_index = self.select_view(descriptor)?;
        load_view(descriptor, view_index)
    }
}

/// Load the given view and the volume of the sample.
pub fn load_view(descriptor: &SampleDescriptor, view_index: usize) -> Result<StereoRecord> {
    let SampleDescriptor {
        taxonomy_id,
        sample_name,
        views,
        volume,
    } = descriptor;

    let ViewFiles {
        left_rgb,
        right_rgb,
        left_disparity,
        right_disparity,
    } = views.get(view_index).ok_or_else(|| {
        format_err!(
            "invalid view index {} for sample {}/{} with {} views",
            view_index,
            taxonomy_id,
            sample_name,
            views.len()
        )
    })?;

    let images = tch::no_grad(|| -> Result<_> {
        Ok(StereoImages {
            left_rgb: load_rgb_image(left_rgb)?,
            right_rgb: load_rgb_image(right_rgb)?,
            left_disparity: load_disparity_map(left_disparity, DISPARITY_CHANNEL)?,
            right_disparity: load_disparity_map(right_disparity, DISPARITY_CHANNEL)?,
        })
    })?;
    let volume = load_volume(volume, VOLUME_FIELD)?;

    Ok(StereoRecord {
        taxonomy_id: taxonomy_id.clone(),
        sample_name: sample_name.clone(),
        view_index,
        images,
        volume,
    })
}
