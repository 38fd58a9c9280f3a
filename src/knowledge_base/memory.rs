//! In-memory knowledge base
//!
//! Built either directly from records (tests, embedding) or from the JSON seed
//! files in the data directory:
//!
//! - `crops.json`: `[{ "name": ..., "name_hindi": ... }]`
//! - `diseases.json`: ailment records that name their crop via `crop_name`
//!
//! Crops are kept sorted by name. Seed ailments whose crop is not in
//! `crops.json` are skipped with a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{CatalogueEntry, KnowledgeBase};
use crate::error::KnowledgeBaseError;
use crate::types::{
    AilmentId, AilmentRecord, CropId, CropRecord, FavorableConditions, LeafIndicators,
    PathogenType, PlantPart,
};

pub const CROPS_FILE: &str = "crops.json";
pub const DISEASES_FILE: &str = "diseases.json";

pub struct InMemoryKnowledgeBase {
    /// Sorted by name
    crops: Vec<CropRecord>,
    ailments: Vec<AilmentRecord>,
    crop_index: FxHashMap<CropId, usize>,
    /// Crop ID → indices into `ailments`
    ailments_by_crop: FxHashMap<CropId, Vec<usize>>,
    ailment_index: FxHashMap<AilmentId, usize>,
}

impl InMemoryKnowledgeBase {
    /// Index the given records
    ///
    /// Fails on duplicate crop names (case-insensitive) or an ailment whose
    /// crop is missing.
    pub fn from_records(
        mut crops: Vec<CropRecord>,
        ailments: Vec<AilmentRecord>,
    ) -> Result<Self, KnowledgeBaseError> {
        crops.sort_by(|a, b| a.name.cmp(&b.name));

        let mut seen_names: FxHashMap<String, CropId> = FxHashMap::default();
        let mut crop_index = FxHashMap::default();
        for (idx, crop) in crops.iter().enumerate() {
            if seen_names.insert(crop.name.to_lowercase(), crop.id).is_some() {
                return Err(KnowledgeBaseError::DuplicateCrop(crop.name.clone()));
            }
            crop_index.insert(crop.id, idx);
        }

        let mut ailments_by_crop: FxHashMap<CropId, Vec<usize>> = FxHashMap::default();
        let mut ailment_index = FxHashMap::default();
        for (idx, ailment) in ailments.iter().enumerate() {
            if !crop_index.contains_key(&ailment.crop_id) {
                return Err(KnowledgeBaseError::UnknownCrop {
                    ailment_id: ailment.id,
                    crop_id: ailment.crop_id,
                });
            }
            ailments_by_crop.entry(ailment.crop_id).or_default().push(idx);
            ailment_index.insert(ailment.id, idx);
        }

        Ok(Self {
            crops,
            ailments,
            crop_index,
            ailments_by_crop,
            ailment_index,
        })
    }

    /// Load `crops.json` and `diseases.json` from `data_dir`
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();

        let crop_seeds: Vec<CropSeed> = read_seed(&data_dir.join(CROPS_FILE))?;
        let disease_seeds: Vec<DiseaseSeed> = read_seed(&data_dir.join(DISEASES_FILE))?;

        let crops: Vec<CropRecord> = crop_seeds
            .into_iter()
            .enumerate()
            .map(|(i, seed)| seed.into_record(i as CropId + 1))
            .collect();

        let crop_ids: FxHashMap<String, CropId> =
            crops.iter().map(|c| (c.name.to_lowercase(), c.id)).collect();

        let mut ailments = Vec::with_capacity(disease_seeds.len());
        for seed in disease_seeds {
            let Some(&crop_id) = crop_ids.get(&seed.crop_name.trim().to_lowercase()) else {
                tracing::warn!(
                    "Skipping disease {}: unknown crop '{}'",
                    seed.name,
                    seed.crop_name
                );
                continue;
            };
            let id = ailments.len() as AilmentId + 1;
            ailments.push(seed.into_record(id, crop_id));
        }

        let kb = Self::from_records(crops, ailments)
            .with_context(|| format!("Invalid knowledge base in {:?}", data_dir))?;

        tracing::info!(
            crops = kb.crops.len(),
            ailments = kb.ailments.len(),
            "Loaded knowledge base from {:?}",
            data_dir
        );

        Ok(kb)
    }

    pub fn crop_count(&self) -> usize {
        self.crops.len()
    }

    pub fn ailment_count(&self) -> usize {
        self.ailments.len()
    }

    fn entry(&self, ailment: &AilmentRecord) -> Option<CatalogueEntry> {
        let crop = &self.crops[*self.crop_index.get(&ailment.crop_id)?];
        Some(CatalogueEntry::new(ailment.clone(), crop))
    }
}

impl KnowledgeBase for InMemoryKnowledgeBase {
    fn crop_candidates(&self) -> Result<Vec<CropRecord>, KnowledgeBaseError> {
        Ok(self.crops.clone())
    }

    fn ailments_for_crop(&self, crop_id: CropId) -> Result<Vec<AilmentRecord>, KnowledgeBaseError> {
        Ok(self
            .ailments_by_crop
            .get(&crop_id)
            .map(|indices| indices.iter().map(|&i| self.ailments[i].clone()).collect())
            .unwrap_or_default())
    }

    fn crop_names(&self) -> Result<Vec<String>, KnowledgeBaseError> {
        Ok(self.crops.iter().map(|c| c.name.clone()).collect())
    }

    fn ailment(&self, id: AilmentId) -> Result<Option<CatalogueEntry>, KnowledgeBaseError> {
        Ok(self
            .ailment_index
            .get(&id)
            .and_then(|&i| self.entry(&self.ailments[i])))
    }
}

fn read_seed<T: DeserializeOwned>(path: &Path) -> Result<T, KnowledgeBaseError> {
    let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| KnowledgeBaseError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

// ============================================================================
// Seed file records
// ============================================================================

#[derive(Debug, Deserialize)]
struct CropSeed {
    name: String,
    #[serde(default)]
    name_hindi: Option<String>,
}

impl CropSeed {
    fn into_record(self, id: CropId) -> CropRecord {
        CropRecord {
            id,
            name: self.name.trim().to_string(),
            name_localized: self.name_hindi.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConditionsSeed {
    #[serde(default)]
    humidity_min: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    rainfall: bool,
}

#[derive(Debug, Deserialize)]
struct DiseaseSeed {
    name: String,
    #[serde(default)]
    name_hindi: Option<String>,
    crop_name: String,
    #[serde(default)]
    pathogen_type: PathogenType,
    #[serde(default)]
    symptoms: Vec<String>,
    #[serde(default)]
    leaf_indicators: LeafIndicators,
    #[serde(default)]
    favorable_conditions: ConditionsSeed,
    #[serde(default)]
    treatment: Vec<String>,
    #[serde(default)]
    prevention: Vec<String>,
    #[serde(default)]
    organic_treatment: Vec<String>,
    #[serde(default)]
    severity_levels: Vec<String>,
    #[serde(default)]
    affected_plant_part: Option<PlantPart>,
}

impl DiseaseSeed {
    fn into_record(self, id: AilmentId, crop_id: CropId) -> AilmentRecord {
        let conditions = self.favorable_conditions;
        AilmentRecord {
            id,
            crop_id,
            name: self.name,
            name_localized: self.name_hindi,
            pathogen_type: self.pathogen_type,
            symptoms: self.symptoms,
            leaf_indicators: self.leaf_indicators,
            favorable_conditions: FavorableConditions {
                humidity_min: conditions.humidity_min,
                temp_min: conditions.temp_min,
                temp_max: conditions.temp_max,
                rainfall: conditions.rainfall,
            },
            treatment: self.treatment,
            prevention: self.prevention,
            organic_treatment: self.organic_treatment,
            severity_levels: self.severity_levels,
            // Seeds without a part describe leaf diseases
            affected_part: Some(self.affected_plant_part.unwrap_or(PlantPart::Leaf)),
        }
    }
}
