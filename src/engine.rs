//! Diagnosis Engine
//!
//! Runs one diagnosis start to finish:
//!
//! 1. Image classification, when the request carries an image (awaited first:
//!    the crop fallback, healthy short-circuit and fusion all depend on it)
//! 2. Healthy verdict → short-circuit
//! 3. Crop resolution (request name, else the image's crop guess)
//! 4. Scoring, fusion, severity, composition
//!
//! The engine holds no per-request state; the knowledge base is read-only and
//! shared across concurrent diagnoses.

use std::sync::Arc;
use std::time::Duration;

use crate::composer::{self, DiagnosisResult};
use crate::error::DiagnosisError;
use crate::knowledge_base::KnowledgeBase;
use crate::resolver;
use crate::scoring;
use crate::severity;
use crate::types::{CropRecord, DiagnosisRequest, VisionResult};
use crate::vision::{apply_fusion, classify_within, DisabledClassifier, VisionClassifier};

#[derive(Clone)]
pub struct DiagnosisEngine {
    kb: Arc<dyn KnowledgeBase>,
    vision: Arc<dyn VisionClassifier>,
    vision_deadline: Option<Duration>,
}

impl DiagnosisEngine {
    /// Rule-based only; images are ignored
    pub fn new(kb: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            kb,
            vision: Arc::new(DisabledClassifier),
            vision_deadline: None,
        }
    }

    pub fn with_vision(mut self, vision: Arc<dyn VisionClassifier>) -> Self {
        self.vision = vision;
        self
    }

    /// Default deadline for the image step
    pub fn with_vision_deadline(mut self, deadline: Duration) -> Self {
        self.vision_deadline = Some(deadline);
        self
    }

    pub async fn diagnose(&self, request: &DiagnosisRequest) -> Result<DiagnosisResult, DiagnosisError> {
        self.diagnose_within(request, self.vision_deadline).await
    }

    /// Diagnose with an explicit deadline on the image step
    ///
    /// Expiry degrades to a rule-based diagnosis instead of failing.
    pub async fn diagnose_within(
        &self,
        request: &DiagnosisRequest,
        deadline: Option<Duration>,
    ) -> Result<DiagnosisResult, DiagnosisError> {
        let vision = match &request.image_path {
            Some(image) => classify_within(self.vision.as_ref(), image, deadline).await,
            None => None,
        };

        let crops = self.kb.crop_candidates();

        // The healthy shape only needs a display name, so a store failure falls
        // back to the image's own crop guess.
        if let Some(verdict) = vision.as_ref().filter(|v| v.healthy) {
            let resolved = match &crops {
                Ok(crops) => resolve_crop(request, vision.as_ref(), crops).map(|c| c.name.clone()),
                Err(e) => {
                    tracing::warn!("Crop lookup failed, keeping the image's crop guess: {}", e);
                    None
                }
            };
            let crop_name = resolved.unwrap_or_else(|| verdict.crop_name.clone());
            tracing::debug!(crop = %crop_name, "Image shows a healthy plant, skipping scoring");
            return Ok(composer::healthy(crop_name, verdict.clone()));
        }

        let crops = crops?;
        let Some(crop) = resolve_crop(request, vision.as_ref(), &crops) else {
            return Ok(match vision {
                Some(verdict) => {
                    let severity = severity::classify(request, 0, Some(&verdict));
                    composer::vision_only(None, verdict, severity)
                }
                None => {
                    tracing::debug!(input = ?request.crop_name_input(), "Crop not resolved");
                    composer::crop_not_found(request.crop_name_input(), &self.kb.crop_names()?)
                }
            });
        };

        let ailments = self.kb.ailments_for_crop(crop.id)?;
        if ailments.is_empty() {
            return Ok(match vision {
                Some(verdict) => {
                    let severity = severity::classify(request, 0, Some(&verdict));
                    composer::vision_only(Some(crop), verdict, severity)
                }
                None => composer::no_ailments(crop),
            });
        }

        let mut candidates = scoring::score(&ailments, request);
        let corroborated = vision
            .as_ref()
            .map_or(0, |verdict| apply_fusion(&mut candidates, verdict));

        let severity = severity::classify(request, candidates.len(), vision.as_ref());

        tracing::debug!(
            crop = %crop.name,
            candidates = candidates.len(),
            corroborated,
            "Scored ailments"
        );

        Ok(composer::compose(candidates, crop, vision, corroborated, severity))
    }
}

/// Request name first, then the image's crop guess
fn resolve_crop<'a>(
    request: &DiagnosisRequest,
    vision: Option<&VisionResult>,
    crops: &'a [CropRecord],
) -> Option<&'a CropRecord> {
    let from_request = request
        .crop_name_input()
        .and_then(|name| resolver::resolve_with_kind(name, crops));

    if let Some(found) = from_request {
        tracing::debug!(crop = %found.crop.name, kind = ?found.kind, "Resolved crop");
        return Some(found.crop);
    }

    let guess = vision.map(|v| v.crop_name.as_str())?;
    let found = resolver::resolve_with_kind(guess, crops)?;
    tracing::debug!(crop = %found.crop.name, kind = ?found.kind, "Resolved crop from image guess");
    Some(found.crop)
}
