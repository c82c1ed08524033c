use super::*;
use crate::common::*;

/// The path templates to locate sample files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTemplates {
    /// Templates of `(taxonomy_id, sample_name, view_index)`.
    pub left_rgb: PathTemplate,
    pub right_rgb: PathTemplate,
    pub left_disparity: PathTemplate,
    pub right_disparity: PathTemplate,
    /// Template of `(taxonomy_id, sample_name)`.
    pub volume: PathTemplate,
}

impl PathTemplates {
    /// Check the number of placeholders of each template.
    pub fn validate(&self) -> Result<()> {
        let view_templates = [
            ("left_rgb", &self.left_rgb),
            ("right_rgb", &self.right_rgb),
            ("left_disparity", &self.left_disparity),
            ("right_disparity", &self.right_disparity),
        ];

        for (name, template) in view_templates {
            ensure!(
                template.num_args() == 3,
                "the {} template '{}' must have 3 placeholders (taxonomy, sample, view)",
                name,
                template
            );
        }

        ensure!(
            self.volume.num_args() == 2,
            "the volume template '{}' must have 2 placeholders (taxonomy, sample)",
            self.volume
        );

        Ok(())
    }

    fn view_files(
        &self,
        taxonomy_id: &str,
        sample_name: &str,
        view_index: usize,
    ) -> Result<ViewFiles> {
        Ok(ViewFiles {
            left_rgb: self
                .left_rgb
                .view_path(taxonomy_id, sample_name, view_index)?,
            right_rgb: self
                .right_rgb
                .view_path(taxonomy_id, sample_name, view_index)?,
            left_disparity: self
                .left_disparity
                .view_path(taxonomy_id, sample_name, view_index)?,
            right_disparity: self
                .right_disparity
                .view_path(taxonomy_id, sample_name, view_index)?,
        })
    }
}

/// The ordered list of samples of a dataset split.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    pub split: DatasetSplit,
    pub num_views: usize,
    pub descriptors: Vec<Arc<SampleDescriptor>>,
}

impl SampleIndex {
    /// Collect sample files in manifest order.
    ///
    /// Samples without a volume file are skipped with a warning. View files are
    /// not checked here, missing ones fail at load time.
    pub fn build(
        manifest: &TaxonomyManifest,
        split: DatasetSplit,
        num_views: usize,
        templates: &PathTemplates,
    ) -> Result<Self> {
        ensure!(num_views > 0, "num_views must be positive");
        templates.validate()?;

        let mut descriptors = vec![];

        for taxonomy in manifest.iter() {
            let Taxonomy {
                taxonomy_id,
                taxonomy_name,
                ..
            } = taxonomy;
            info!(
                "collecting files of taxonomy[id={}, name={}]",
                taxonomy_id, taxonomy_name
            );

            for sample_name in taxonomy.samples(split) {
                let volume = templates.volume.sample_path(taxonomy_id, sample_name)?;

                if !volume.exists() {
                    warn!(
                        "ignore sample {}/{} since voxel file '{}' does not exist",
                        taxonomy_id,
                        sample_name,
                        volume.display()
                    );
                    continue;
                }

                let views: Vec<_> = (0..num_views)
                    .map(|view_index| templates.view_files(taxonomy_id, sample_name, view_index))
                    .try_collect()?;

                descriptors.push(Arc::new(SampleDescriptor {
                    taxonomy_id: taxonomy_id.clone(),
                    sample_name: sample_name.clone(),
                    views,
                    volume,
                }));
            }
        }

        info!(
            "complete collecting files of the {} split, total samples: {}",
            split,
            descriptors.len()
        );

        Ok(Self {
            split,
            num_views,
            descriptors,
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
