//! Immutable catalog snapshots

use crate::models::{ImageIndex, Origin, PartRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read-only view of the catalog at a point in time.
///
/// Record sequences are shared between successive snapshots when a write
/// only touches the other origin.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    structured: Arc<[PartRecord]>,
    documents: Arc<[PartRecord]>,
    images: Arc<ImageIndex>,
    loaded: bool,
    generation: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl CatalogSnapshot {
    /// The snapshot a store starts with, before any load
    pub fn unloaded() -> Self {
        Self {
            structured: Arc::from(Vec::<PartRecord>::new()),
            documents: Arc::from(Vec::<PartRecord>::new()),
            images: Arc::new(ImageIndex::new()),
            loaded: false,
            generation: 0,
            updated_at: None,
        }
    }

    pub fn records(&self, origin: Origin) -> &[PartRecord] {
        match origin {
            Origin::Structured => &self.structured,
            Origin::Document => &self.documents,
        }
    }

    pub fn structured(&self) -> &[PartRecord] {
        &self.structured
    }

    pub fn documents(&self) -> &[PartRecord] {
        &self.documents
    }

    pub fn images(&self) -> &ImageIndex {
        &self.images
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            structured_count: self.structured.len(),
            document_count: self.documents.len(),
            total_count: self.structured.len() + self.documents.len(),
            image_count: self.images.len(),
            loaded: self.loaded,
            generation: self.generation,
            updated_at: self.updated_at,
        }
    }

    /// Successor snapshot; every write marks the catalog loaded.
    fn next(&self) -> Self {
        Self {
            structured: Arc::clone(&self.structured),
            documents: Arc::clone(&self.documents),
            images: Arc::clone(&self.images),
            loaded: true,
            generation: self.generation + 1,
            updated_at: Some(Utc::now()),
        }
    }

    pub(super) fn with_records(&self, origin: Origin, records: Arc<[PartRecord]>) -> Self {
        let mut next = self.next();
        match origin {
            Origin::Structured => next.structured = records,
            Origin::Document => next.documents = records,
        }
        next
    }

    pub(super) fn with_appended(&self, origin: Origin, records: &[PartRecord]) -> Self {
        let combined: Vec<PartRecord> = self
            .records(origin)
            .iter()
            .chain(records.iter())
            .cloned()
            .collect();
        self.with_records(origin, Arc::from(combined))
    }

    pub(super) fn with_images(&self, images: Arc<ImageIndex>) -> Self {
        let mut next = self.next();
        next.images = images;
        next
    }

    pub(super) fn with_everything(
        &self,
        structured: Arc<[PartRecord]>,
        documents: Arc<[PartRecord]>,
        images: Arc<ImageIndex>,
    ) -> Self {
        Self {
            structured,
            documents,
            images,
            ..self.next()
        }
    }
}

/// Read-only catalog summary for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub structured_count: usize,
    pub document_count: usize,
    pub total_count: usize,
    pub image_count: usize,
    pub loaded: bool,
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}
