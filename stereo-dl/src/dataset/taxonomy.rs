use crate::common::*;

/// The dataset split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetSplit {
    Train,
    Test,
    Val,
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Train => "train",
            Self::Test => "test",
            Self::Val => "val",
        };
        write!(f, "{}", text)
    }
}

/// A dataset category and its sample names per split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub taxonomy_id: String,
    pub taxonomy_name: String,
    #[serde(default)]
    pub train: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(default)]
    pub val: Vec<String>,
}

impl Taxonomy {
    pub fn samples(&self, split: DatasetSplit) -> &[String] {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Test => &self.test,
            DatasetSplit::Val => &self.val,
        }
    }
}

/// The list of taxonomies, kept in manifest order.
#[derive(Debug, Clone)]
pub struct TaxonomyManifest {
    taxonomies: IndexMap<String, Taxonomy>,
}

impl TaxonomyManifest {
    pub fn new(taxonomies: impl IntoIterator<Item = Taxonomy>) -> Result<Self> {
        let mut map = IndexMap::new();

        for taxonomy in taxonomies {
            let id = taxonomy.taxonomy_id.clone();
            ensure!(
                map.insert(id.clone(), taxonomy).is_none(),
                "duplicated taxonomy id '{}'",
                id
            );
        }

        Ok(Self { taxonomies: map })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let taxonomies: Vec<Taxonomy> = serde_json::from_str(text)?;
        Self::new(taxonomies)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read taxonomy file '{}'", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse taxonomy file '{}'", path.display()))
    }

    pub fn get(&self, taxonomy_id: &str) -> Option<&Taxonomy> {
        self.taxonomies.get(taxonomy_id)
    }

    /// Get the display name of a taxonomy, falling back to the id itself.
    pub fn name_of<'a>(&'a self, taxonomy_id: &'a str) -> &'a str {
        self.get(taxonomy_id)
            .map(|taxonomy| taxonomy.taxonomy_name.as_str())
            .unwrap_or(taxonomy_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Taxonomy> {
        self.taxonomies.values()
    }

    pub fn len(&self) -> usize {
        self.taxonomies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxonomies.is_empty()
    }
}
