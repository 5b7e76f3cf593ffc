//! Figure-to-image resolution table

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lookup key: document name plus figure index inside that document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageKey {
    pub source_label: String,
    pub figure_index: String,
}

impl ImageKey {
    pub fn new(source_label: impl AsRef<str>, figure_index: impl AsRef<str>) -> Self {
        Self {
            source_label: source_label.as_ref().trim().to_string(),
            figure_index: canonical_figure(figure_index.as_ref()),
        }
    }
}

/// Numeric figure references are compared by value ("012" == "12").
fn canonical_figure(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// A concrete image file for a figure reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl ImageAsset {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), page: None }
    }
}

/// Mapping from `(source_label, figure_index)` to an image asset.
///
/// Lookups are pure; a missing entry means no image is available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageIndex {
    entries: HashMap<ImageKey, ImageAsset>,
}

impl ImageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ImageKey, asset: ImageAsset) -> Option<ImageAsset> {
        self.entries.insert(key, asset)
    }

    pub fn resolve(&self, source_label: &str, figure_index: &str) -> Option<&ImageAsset> {
        self.entries.get(&ImageKey::new(source_label, figure_index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ImageKey, &ImageAsset)> {
        self.entries.iter()
    }
}

impl FromIterator<(ImageKey, ImageAsset)> for ImageIndex {
    fn from_iter<T: IntoIterator<Item = (ImageKey, ImageAsset)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(ImageKey, ImageAsset)> for ImageIndex {
    fn extend<T: IntoIterator<Item = (ImageKey, ImageAsset)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for ImageIndex {
    type Item = (ImageKey, ImageAsset);
    type IntoIter = std::collections::hash_map::IntoIter<ImageKey, ImageAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
