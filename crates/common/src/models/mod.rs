//! Catalog data model
//!
//! Part records, image-resolution entries and search result views

mod image;
mod part;
mod search;

pub use image::{ImageAsset, ImageIndex, ImageKey};
pub use part::{Origin, PartRecord};
pub use search::{SearchResult, SourceFilter};
