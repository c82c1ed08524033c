use super::*;
use crate::{common::*, dataset::TaxonomyManifest};
use prettytable::{Cell, Row, Table};

/// The mean IoU of one taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyReport {
    pub taxonomy_id: String,
    pub taxonomy_name: String,
    pub num_samples: usize,
    pub mean_iou: Vec<f64>,
}

/// The terminal result of an evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub thresholds: Vec<R64>,
    pub taxonomies: Vec<TaxonomyReport>,
    /// Sample-count-weighted mean of the per-taxonomy IoU vectors.
    pub overall_iou: Vec<f64>,
    pub num_samples: usize,
    pub disparity_loss: f64,
    pub voxel_loss: f64,
    /// The largest entry in `overall_iou`, or NaN if any entry is NaN.
    pub max_iou: f64,
}

impl AggregateReport {
    pub fn new(accumulator: &MetricAccumulator, manifest: &TaxonomyManifest) -> Result<Self> {
        let num_thresholds = accumulator.thresholds().len();
        let num_samples = accumulator.num_samples();
        ensure!(num_samples > 0, "no samples were evaluated");

        let taxonomies: Vec<_> = accumulator
            .buckets()
            .iter()
            .filter_map(|(taxonomy_id, bucket)| {
                let mean_iou = bucket.mean_iou(num_thresholds)?;
                Some(TaxonomyReport {
                    taxonomy_id: taxonomy_id.clone(),
                    taxonomy_name: manifest.name_of(taxonomy_id).to_owned(),
                    num_samples: bucket.num_samples(),
                    mean_iou,
                })
            })
            .collect();

        let weighted_sum = taxonomies
            .iter()
            .fold(vec![0.0; num_thresholds], |mut sum, taxonomy| {
                let weight = taxonomy.num_samples as f64;
                izip!(&mut sum, &taxonomy.mean_iou).for_each(|(sum, iou)| *sum += iou * weight);
                sum
            });
        let overall_iou: Vec<_> = weighted_sum
            .into_iter()
            .map(|sum| sum / num_samples as f64)
            .collect();

        let max_iou = overall_iou
            .iter()
            .try_fold(f64::NEG_INFINITY, |max, &iou| {
                (!iou.is_nan()).then(|| max.max(iou))
            })
            .unwrap_or(f64::NAN);

        Ok(Self {
            thresholds: accumulator.thresholds().to_vec(),
            taxonomies,
            overall_iou,
            num_samples,
            disparity_loss: accumulator.disparity_loss().avg,
            voxel_loss: accumulator.voxel_loss().avg,
            max_iou,
        })
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();

        let titles = ["Taxonomy".to_owned(), "#Samples".to_owned()]
            .into_iter()
            .chain(
                self.thresholds
                    .iter()
                    .map(|threshold| format!("t={:.2}", threshold.raw())),
            )
            .map(|title| Cell::new(&title))
            .collect();
        table.set_titles(Row::new(titles));

        let rows = self
            .taxonomies
            .iter()
            .map(|taxonomy| {
                (
                    taxonomy.taxonomy_name.as_str(),
                    taxonomy.num_samples,
                    &taxonomy.mean_iou,
                )
            })
            .chain(iter::once(("Overall", self.num_samples, &self.overall_iou)));

        for (name, num_samples, ious) in rows {
            let cells = [name.to_owned(), num_samples.to_string()]
                .into_iter()
                .chain(ious.iter().map(|iou| format!("{:.4}", iou)))
                .map(|text| Cell::new(&text))
                .collect();
            table.add_row(Row::new(cells));
        }

        table
    }
}

impl MetricAccumulator {
    pub fn aggregate(&self, manifest: &TaxonomyManifest) -> Result<AggregateReport> {
        AggregateReport::new(self, manifest)
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table())
    }
}
