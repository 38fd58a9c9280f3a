//! Shared domain types for crop ailment diagnosis.
//!
//! Knowledge-base records (crops, ailments) are read-only inputs supplied by the
//! store. Requests and vision results live for a single diagnosis.
//!
//! Categorical fields are closed enums. Values the store or a caller sends that
//! we do not recognise land in an explicit `Other`/`Unknown` variant, which never
//! matches anything during scoring.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

pub type CropId = u32;
pub type AilmentId = u32;

// ============================================================================
// Knowledge-base records
// ============================================================================

/// Crop as known to the knowledge base. Only used for name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecord {
    pub id: CropId,
    pub name: String,
    #[serde(default)]
    pub name_localized: Option<String>,
}

impl CropRecord {
    pub fn new(id: CropId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            name_localized: None,
        }
    }

    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.name_localized = Some(name.into());
        self
    }
}

/// Broad cause of an ailment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathogenType {
    Fungal,
    Bacterial,
    Viral,
    Nematode,
    Nutritional,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PathogenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathogenType::Fungal => "fungal",
            PathogenType::Bacterial => "bacterial",
            PathogenType::Viral => "viral",
            PathogenType::Nematode => "nematode",
            PathogenType::Nutritional => "nutritional",
            PathogenType::Unknown => "unknown",
        }
    }
}

/// Part of the plant where symptoms show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantPart {
    Leaf,
    Stem,
    Root,
    Fruit,
    Flower,
    Grain,
    WholePlant,
    #[serde(other)]
    Other,
}

/// Colour of lesions or spots on the affected tissue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotColor {
    Brown,
    Yellow,
    Black,
    White,
    Orange,
    Red,
    #[serde(alias = "grey")]
    Gray,
    Green,
    Purple,
    #[serde(other)]
    Other,
}

/// Shape of lesions or spots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotShape {
    Circular,
    Irregular,
    Streaks,
    Rings,
    Diamond,
    Elliptical,
    #[serde(other)]
    Other,
}

/// Visual markers on the leaf that point at an ailment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafIndicators {
    #[serde(default)]
    pub colors: Vec<SpotColor>,
    #[serde(default)]
    pub shapes: Vec<SpotShape>,
}

/// Weather thresholds under which an ailment thrives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavorableConditions {
    /// Relative humidity floor (%)
    #[serde(default)]
    pub humidity_min: Option<f64>,
    /// Temperature floor (°C)
    #[serde(default)]
    pub temp_min: Option<f64>,
    /// Temperature ceiling (°C)
    #[serde(default)]
    pub temp_max: Option<f64>,
    /// Spread is favoured by rain or splashing water
    #[serde(default)]
    pub rainfall: bool,
}

/// Ailment record. Every ailment belongs to exactly one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AilmentRecord {
    pub id: AilmentId,
    pub crop_id: CropId,
    pub name: String,
    #[serde(default)]
    pub name_localized: Option<String>,
    #[serde(default)]
    pub pathogen_type: PathogenType,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub leaf_indicators: LeafIndicators,
    #[serde(default)]
    pub favorable_conditions: FavorableConditions,
    #[serde(default)]
    pub treatment: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
    #[serde(default)]
    pub organic_treatment: Vec<String>,
    #[serde(default)]
    pub severity_levels: Vec<String>,
    #[serde(default)]
    pub affected_part: Option<PlantPart>,
}

impl AilmentRecord {
    /// Bare record with no symptoms or indicators (fill in the rest directly)
    pub fn new(id: AilmentId, crop_id: CropId, name: impl Into<String>) -> Self {
        Self {
            id,
            crop_id,
            name: name.into(),
            name_localized: None,
            pathogen_type: PathogenType::Unknown,
            symptoms: Vec::new(),
            leaf_indicators: LeafIndicators::default(),
            favorable_conditions: FavorableConditions::default(),
            treatment: Vec::new(),
            prevention: Vec::new(),
            organic_treatment: Vec::new(),
            severity_levels: Vec::new(),
            affected_part: None,
        }
    }
}

// ============================================================================
// Diagnosis request
// ============================================================================

/// Whether the farmer saw fungal growth (powder, fuzz, mould)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FungalGrowth {
    Present,
    Absent,
    #[default]
    Unknown,
}

impl From<bool> for FungalGrowth {
    fn from(observed: bool) -> Self {
        if observed {
            FungalGrowth::Present
        } else {
            FungalGrowth::Absent
        }
    }
}

// Accepts the tri-state tag as well as the older boolean form.
impl<'de> Deserialize<'de> for FungalGrowth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Tag(String),
            Null(()),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Flag(observed) => observed.into(),
            Repr::Tag(tag) => match tag.trim().to_ascii_lowercase().as_str() {
                "present" | "true" | "yes" => FungalGrowth::Present,
                "absent" | "false" | "no" => FungalGrowth::Absent,
                _ => FungalGrowth::Unknown,
            },
            Repr::Null(()) => FungalGrowth::Unknown,
        })
    }
}

/// Recent weather the farmer reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Humid,
    Rainy,
    Dry,
    Cold,
}

/// Caller-constructed diagnosis request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    #[serde(default)]
    pub crop_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_symptoms")]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub affected_part: Option<PlantPart>,
    #[serde(default)]
    pub spot_color: Option<SpotColor>,
    #[serde(default)]
    pub spot_shape: Option<SpotShape>,
    #[serde(default, alias = "hasFungalGrowth")]
    pub fungal_growth: FungalGrowth,
    #[serde(default)]
    pub weather_recent: Option<WeatherCategory>,
    /// Uploaded image; absent means no vision fusion is attempted.
    /// Never read from a request body: only the upload boundary sets it.
    #[serde(skip_deserializing)]
    pub image_path: Option<PathBuf>,
}

impl DiagnosisRequest {
    pub fn for_crop(crop_name: impl Into<String>) -> Self {
        Self {
            crop_name: Some(crop_name.into()),
            ..Self::default()
        }
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_affected_part(mut self, part: PlantPart) -> Self {
        self.affected_part = Some(part);
        self
    }

    pub fn with_spot_color(mut self, color: SpotColor) -> Self {
        self.spot_color = Some(color);
        self
    }

    pub fn with_spot_shape(mut self, shape: SpotShape) -> Self {
        self.spot_shape = Some(shape);
        self
    }

    pub fn with_fungal_growth(mut self, growth: FungalGrowth) -> Self {
        self.fungal_growth = growth;
        self
    }

    pub fn with_weather(mut self, weather: WeatherCategory) -> Self {
        self.weather_recent = Some(weather);
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Crop name as typed, if the caller gave a non-blank one
    pub fn crop_name_input(&self) -> Option<&str> {
        self.crop_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Number of distinct non-blank symptom phrases (case-insensitive)
    pub fn distinct_symptom_count(&self) -> usize {
        let mut seen: Vec<String> = Vec::with_capacity(self.symptoms.len());
        for symptom in &self.symptoms {
            let key = symptom.trim().to_lowercase();
            if !key.is_empty() && !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen.len()
    }
}

/// Symptoms arrive as a JSON array, a JSON-encoded array inside a string
/// (multipart form fields), a single plain string, or null.
fn deserialize_symptoms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<String>),
        Text(String),
        Null(()),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::List(list) => list,
        Repr::Text(text) => match serde_json::from_str::<Vec<String>>(&text) {
            Ok(list) => list,
            Err(_) if text.trim().is_empty() => Vec::new(),
            Err(_) => vec![text],
        },
        Repr::Null(()) => Vec::new(),
    })
}

// ============================================================================
// Vision result
// ============================================================================

/// Severity as judged from the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionSeverity {
    Mild,
    Severe,
    /// Also the fallback for labels the model invents
    #[default]
    #[serde(other)]
    Moderate,
}

/// Normalized output of the image classifier. Created once per request that
/// carries an image and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionResult {
    pub healthy: bool,
    pub disease_name: String,
    pub crop_name: String,
    /// 0-99
    pub confidence: u8,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
    pub organic_treatment: Vec<String>,
    pub pathogen_type: PathogenType,
    pub severity: VisionSeverity,
    pub description: String,
}

impl VisionResult {
    /// Diseased verdict with empty advice lists
    pub fn diseased(disease_name: impl Into<String>, crop_name: impl Into<String>) -> Self {
        Self {
            healthy: false,
            disease_name: disease_name.into(),
            crop_name: crop_name.into(),
            confidence: 50,
            symptoms: Vec::new(),
            treatment: Vec::new(),
            prevention: Vec::new(),
            organic_treatment: Vec::new(),
            pathogen_type: PathogenType::Unknown,
            severity: VisionSeverity::Moderate,
            description: String::new(),
        }
    }

    /// Healthy verdict
    pub fn healthy(crop_name: impl Into<String>) -> Self {
        Self {
            healthy: true,
            ..Self::diseased("Healthy Plant", crop_name)
        }
    }

    pub fn with_severity(mut self, severity: VisionSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(99);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fungal_growth_accepts_bool_and_tag() {
        let present: FungalGrowth = serde_json::from_str("true").unwrap();
        let absent: FungalGrowth = serde_json::from_str("\"absent\"").unwrap();
        let unknown: FungalGrowth = serde_json::from_str("\"not sure\"").unwrap();
        let null: FungalGrowth = serde_json::from_str("null").unwrap();

        assert_eq!(present, FungalGrowth::Present);
        assert_eq!(absent, FungalGrowth::Absent);
        assert_eq!(unknown, FungalGrowth::Unknown);
        assert_eq!(null, FungalGrowth::Unknown);
    }

    #[test]
    fn test_request_symptom_forms() {
        let from_array: DiagnosisRequest =
            serde_json::from_str(r#"{"cropName": "Tomato", "symptoms": ["wilting", "yellow"]}"#).unwrap();
        assert_eq!(from_array.symptoms, vec!["wilting", "yellow"]);

        let from_encoded: DiagnosisRequest =
            serde_json::from_str(r#"{"cropName": "Tomato", "symptoms": "[\"wilting\"]"}"#).unwrap();
        assert_eq!(from_encoded.symptoms, vec!["wilting"]);

        let from_text: DiagnosisRequest =
            serde_json::from_str(r#"{"cropName": "Tomato", "symptoms": "leaf curl"}"#).unwrap();
        assert_eq!(from_text.symptoms, vec!["leaf curl"]);

        let missing: DiagnosisRequest = serde_json::from_str(r#"{"cropName": "Tomato"}"#).unwrap();
        assert!(missing.symptoms.is_empty());
        assert_eq!(missing.fungal_growth, FungalGrowth::Unknown);
    }

    #[test]
    fn test_request_enums_and_alias() {
        let request: DiagnosisRequest = serde_json::from_str(
            r#"{
                "cropName": "Rice",
                "affectedPart": "whole_plant",
                "spotColor": "grey",
                "spotShape": "diamond",
                "hasFungalGrowth": false,
                "weatherRecent": "humid"
            }"#,
        )
        .unwrap();

        assert_eq!(request.affected_part, Some(PlantPart::WholePlant));
        assert_eq!(request.spot_color, Some(SpotColor::Gray));
        assert_eq!(request.spot_shape, Some(SpotShape::Diamond));
        assert_eq!(request.fungal_growth, FungalGrowth::Absent);
        assert_eq!(request.weather_recent, Some(WeatherCategory::Humid));
    }

    #[test]
    fn test_unrecognised_categories_fall_to_other() {
        let pathogen: PathogenType = serde_json::from_str("\"oomycete\"").unwrap();
        let color: SpotColor = serde_json::from_str("\"dark brown\"").unwrap();
        assert_eq!(pathogen, PathogenType::Unknown);
        assert_eq!(color, SpotColor::Other);
    }

    #[test]
    fn test_vision_severity_labels() {
        let severe: VisionSeverity = serde_json::from_str("\"severe\"").unwrap();
        let mild: VisionSeverity = serde_json::from_str("\"mild\"").unwrap();
        let invented: VisionSeverity = serde_json::from_str("\"catastrophic\"").unwrap();
        assert_eq!(severe, VisionSeverity::Severe);
        assert_eq!(mild, VisionSeverity::Mild);
        assert_eq!(invented, VisionSeverity::Moderate);
        assert_eq!(serde_json::to_string(&VisionSeverity::Moderate).unwrap(), "\"moderate\"");

        let verdict = VisionResult::diseased("Blast", "Rice").with_severity(VisionSeverity::Severe);
        let decoded: VisionResult = serde_json::from_value(serde_json::to_value(&verdict).unwrap()).unwrap();
        assert_eq!(decoded.severity, VisionSeverity::Severe);
    }

    #[test]
    fn test_request_body_cannot_name_an_image() {
        let request: DiagnosisRequest =
            serde_json::from_str(r#"{"cropName": "Tomato", "imagePath": "/etc/passwd"}"#).unwrap();
        assert!(request.image_path.is_none());
    }

    #[test]
    fn test_crop_name_input_and_distinct_symptoms() {
        let request = DiagnosisRequest::for_crop("   ")
            .with_symptoms(["Wilting", "wilting ", "", "yellow leaves"]);
        assert_eq!(request.crop_name_input(), None);
        assert_eq!(request.distinct_symptom_count(), 2);

        let named = DiagnosisRequest::for_crop("  Potato ");
        assert_eq!(named.crop_name_input(), Some("Potato"));
    }
}
