use super::*;
use crate::{common::*, processor::StereoTransform};

/// The stereo dataset that loads samples in index order.
#[derive(Debug)]
pub struct StereoDataset {
    index: SampleIndex,
    loader: SampleLoader,
    transform: Option<Arc<dyn StereoTransform>>,
}

impl StereoDataset {
    pub fn new(
        index: SampleIndex,
        loader: SampleLoader,
        transform: Option<Arc<dyn StereoTransform>>,
    ) -> Self {
        Self {
            index,
            loader,
            transform,
        }
    }

    pub fn num_records(&self) -> usize {
        self.index.len()
    }

    pub fn index(&self) -> &SampleIndex {
        &self.index
    }

    /// Load and transform the nth sample.
    pub fn nth(&mut self, index: usize) -> Result<StereoRecord> {
        let descriptor = self
            .index
            .descriptors
            .get(index)
            .ok_or_else(|| format_err!("invalid index {}", index))?
            .clone();
        let record = self.loader.load(&descriptor)?;
        apply_transform(self.transform.as_deref(), record)
    }

    /// Enumerate all samples in index order.
    ///
    /// The views are selected in order before the files are decoded by a pool of
    /// workers. The output order is preserved, and the transform is applied to one
    /// record at a time off the async workers, so seeded transforms are reproducible.
    ///
    /// The stream must be polled within a tokio runtime.
    pub fn stream(self) -> Pin<Box<dyn Stream<Item = Result<StereoRecord>> + Send>> {
        let Self {
            index,
            mut loader,
            transform,
        } = self;

        let stream = stream::iter(index.descriptors).map(move |descriptor| {
            let view_index = loader.select_view(&descriptor);
            (descriptor, view_index)
        });

        // decode files in parallel
        let stream = stream.par_map(None, |(descriptor, view_index)| {
            move || -> Result<_> {
                let record = load_view(&descriptor, view_index?).with_context(|| {
                    format!(
                        "failed to load sample {}/{}",
                        descriptor.taxonomy_id, descriptor.sample_name
                    )
                })?;
                Ok(record)
            }
        });

        // transform one record at a time on the blocking pool
        let stream = stream.then(move |result| {
            let transform = transform.clone();
            async move {
                let record = result?;
                let record = tokio::task::spawn_blocking(move || {
                    apply_transform(transform.as_deref(), record)
                })
                .await??;
                Fallible::Ok(record)
            }
        });

        Box::pin(stream)
    }
}

fn apply_transform(
    transform: Option<&dyn StereoTransform>,
    record: StereoRecord,
) -> Result<StereoRecord> {
    let transform = match transform {
        Some(transform) => transform,
        None => return Ok(record),
    };

    let StereoRecord {
        taxonomy_id,
        sample_name,
        view_index,
        images,
        volume,
    } = record;
    let images = tch::no_grad(|| transform.apply(images))?;

    Ok(StereoRecord {
        taxonomy_id,
        sample_name,
        view_index,
        images,
        volume,
    })
}
