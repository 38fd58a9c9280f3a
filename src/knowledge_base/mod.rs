//! Knowledge Base
//!
//! Read-only repository of crops and their ailments, injected into the engine.
//! The engine needs three queries (crop candidates, ailments for a crop, crop
//! names for the not-found hint); the catalogue queries serve the HTTP listing
//! routes and have default implementations built on the first three.

pub mod memory;

use serde::Serialize;

use crate::error::KnowledgeBaseError;
use crate::types::{AilmentId, AilmentRecord, CropId, CropRecord};

pub use memory::InMemoryKnowledgeBase;

/// Ailment joined with the crop it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    #[serde(flatten)]
    pub ailment: AilmentRecord,
    pub crop_name: String,
    pub crop_name_localized: Option<String>,
}

impl CatalogueEntry {
    pub fn new(ailment: AilmentRecord, crop: &CropRecord) -> Self {
        Self {
            ailment,
            crop_name: crop.name.clone(),
            crop_name_localized: crop.name_localized.clone(),
        }
    }
}

pub trait KnowledgeBase: Send + Sync {
    /// Every crop, in the order used for resolution tie-breaks
    fn crop_candidates(&self) -> Result<Vec<CropRecord>, KnowledgeBaseError>;

    /// Ailments owned by `crop_id` (empty for an unknown crop)
    fn ailments_for_crop(&self, crop_id: CropId) -> Result<Vec<AilmentRecord>, KnowledgeBaseError>;

    /// Canonical names of every crop, same order as [`Self::crop_candidates`]
    fn crop_names(&self) -> Result<Vec<String>, KnowledgeBaseError> {
        Ok(self.crop_candidates()?.into_iter().map(|c| c.name).collect())
    }

    /// Whole catalogue, sorted by ailment name
    fn all_ailments(&self) -> Result<Vec<CatalogueEntry>, KnowledgeBaseError> {
        let mut entries = Vec::new();
        for crop in self.crop_candidates()? {
            for ailment in self.ailments_for_crop(crop.id)? {
                entries.push(CatalogueEntry::new(ailment, &crop));
            }
        }
        entries.sort_by(|a, b| a.ailment.name.cmp(&b.ailment.name));
        Ok(entries)
    }

    /// Ailments of the crop named exactly `crop_name` (case-insensitive)
    fn ailments_by_crop_name(&self, crop_name: &str) -> Result<Vec<CatalogueEntry>, KnowledgeBaseError> {
        let wanted = crop_name.trim().to_lowercase();
        Ok(self
            .all_ailments()?
            .into_iter()
            .filter(|entry| entry.crop_name.to_lowercase() == wanted)
            .collect())
    }

    /// Case-insensitive substring search over names and symptom phrases
    fn search_ailments(&self, query: &str) -> Result<Vec<CatalogueEntry>, KnowledgeBaseError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .all_ailments()?
            .into_iter()
            .filter(|entry| matches_query(&entry.ailment, &needle))
            .collect())
    }

    fn ailment(&self, id: AilmentId) -> Result<Option<CatalogueEntry>, KnowledgeBaseError> {
        Ok(self.all_ailments()?.into_iter().find(|entry| entry.ailment.id == id))
    }
}

fn matches_query(ailment: &AilmentRecord, needle: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(needle);

    hit(&ailment.name)
        || ailment.name_localized.as_deref().is_some_and(hit)
        || ailment.symptoms.iter().any(|s| hit(s))
}
