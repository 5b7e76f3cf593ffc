//! Catalog Store
//!
//! Owns the current catalog and publishes it as immutable snapshots:
//! - every write builds a complete new snapshot and swaps it in
//! - readers keep whatever snapshot they loaded, untouched by later writes
//! - no per-record edits or deletes; corrections arrive as re-uploads
//!
//! The store does not validate records. Batches are expected to be
//! normalized by the ingestion layer before they get here.

mod snapshot;

pub use snapshot::{CatalogSnapshot, CatalogStats};

use crate::metrics;
use crate::models::{ImageIndex, Origin, PartRecord};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory catalog shared by the query engine and the loaders
pub struct CatalogStore {
    current: ArcSwap<CatalogSnapshot>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty, not-yet-loaded store
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(CatalogSnapshot::unloaded()),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_loaded()
    }

    pub fn stats(&self) -> CatalogStats {
        self.current.load().stats()
    }

    /// Publish a complete catalog at once (startup bulk load)
    pub fn load(
        &self,
        structured: Vec<PartRecord>,
        documents: Vec<PartRecord>,
        images: ImageIndex,
    ) -> Arc<CatalogSnapshot> {
        let structured: Arc<[PartRecord]> = Arc::from(structured);
        let documents: Arc<[PartRecord]> = Arc::from(documents);
        let images = Arc::new(images);

        let published = self.publish(|current| {
            current.with_everything(
                Arc::clone(&structured),
                Arc::clone(&documents),
                Arc::clone(&images),
            )
        });

        info!(
            structured = published.structured().len(),
            documents = published.documents().len(),
            images = published.images().len(),
            generation = published.generation(),
            "Catalog loaded"
        );
        published
    }

    /// Replace every record of `origin` with `records`
    pub fn replace(&self, origin: Origin, records: Vec<PartRecord>) -> Arc<CatalogSnapshot> {
        let records: Arc<[PartRecord]> = Arc::from(records);
        let published = self.publish(|current| current.with_records(origin, Arc::clone(&records)));

        info!(
            origin = %origin,
            count = records.len(),
            generation = published.generation(),
            "Catalog origin replaced"
        );
        published
    }

    /// Add `records` after the existing records of `origin`
    pub fn append(&self, origin: Origin, records: Vec<PartRecord>) -> Arc<CatalogSnapshot> {
        let added = records.len();
        let published = self.publish(|current| current.with_appended(origin, &records));

        info!(
            origin = %origin,
            added,
            total = published.records(origin).len(),
            generation = published.generation(),
            "Catalog origin appended"
        );
        published
    }

    /// Replace the image-resolution table wholesale
    pub fn set_image_index(&self, images: ImageIndex) -> Arc<CatalogSnapshot> {
        let images = Arc::new(images);
        let published = self.publish(|current| current.with_images(Arc::clone(&images)));

        info!(
            images = published.images().len(),
            generation = published.generation(),
            "Image index replaced"
        );
        published
    }

    /// Build the successor of the current snapshot and swap it in.
    ///
    /// `build` may run more than once when writers race.
    fn publish<F>(&self, build: F) -> Arc<CatalogSnapshot>
    where
        F: Fn(&CatalogSnapshot) -> CatalogSnapshot,
    {
        let mut published = None;
        self.current.rcu(|current| {
            let next = Arc::new(build(current.as_ref()));
            published = Some(Arc::clone(&next));
            next
        });

        let published = published.unwrap_or_else(|| self.current.load_full());
        debug!(generation = published.generation(), "Catalog snapshot published");
        metrics::record_catalog_size(
            published.structured().len(),
            published.documents().len(),
            published.images().len(),
        );
        published
    }
}
