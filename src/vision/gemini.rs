//! Gemini image classifier
//!
//! Sends the image inline (base64) with a fixed pathologist prompt and
//! normalizes the model's JSON reply into a [`VisionResult`]. Every failure
//! (I/O, HTTP, malformed reply) is logged and reported as `None`.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use super::VisionClassifier;
use crate::types::{PathogenType, VisionResult, VisionSeverity};
use crate::utils::clamp_confidence;

const VISION_PROMPT: &str = include_str!("../../templates/vision_prompt.md");

/// Used when the model omits or garbles its confidence
const DEFAULT_CONFIDENCE: u8 = 50;

#[derive(Debug, Clone)]
pub struct GeminiClassifier {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    client: reqwest::Client,
}

impl GeminiClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    async fn try_classify(&self, image: &Path) -> Result<Option<VisionResult>> {
        let bytes = tokio::fs::read(image)
            .await
            .with_context(|| format!("Failed to read image: {:?}", image))?;

        let payload = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": VISION_PROMPT },
                    {
                        "inline_data": {
                            "mime_type": mime_type_for(image),
                            "data": STANDARD.encode(&bytes),
                        }
                    }
                ]
            }]
        });

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Vision request failed")?
            .error_for_status()
            .context("Vision service returned an error status")?;

        let body: Value = response.json().await.context("Vision response was not JSON")?;

        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("Vision response had no text part"))?;

        Ok(parse_vision_reply(text))
    }
}

#[async_trait]
impl VisionClassifier for GeminiClassifier {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn classify(&self, image: &Path) -> Option<VisionResult> {
        match self.try_classify(image).await {
            Ok(Some(result)) => {
                tracing::info!(
                    disease = %result.disease_name,
                    crop = %result.crop_name,
                    healthy = result.healthy,
                    confidence = result.confidence,
                    "Image classified"
                );
                Some(result)
            }
            Ok(None) => {
                tracing::warn!("Image analysis failed: reply missing a disease name or not valid JSON");
                None
            }
            Err(e) => {
                tracing::warn!("Image analysis failed: {:#}", e);
                None
            }
        }
    }
}

/// MIME type from the file extension (JPEG when unknown)
pub fn mime_type_for(image: &Path) -> &'static str {
    let ext = image
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Remove a surrounding Markdown code fence, if any
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVisionReply {
    #[serde(default)]
    is_healthy: Option<bool>,
    #[serde(default)]
    disease_name: Option<String>,
    #[serde(default)]
    crop_name: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    symptoms: Option<Value>,
    #[serde(default)]
    treatment: Option<Value>,
    #[serde(default)]
    prevention: Option<Value>,
    #[serde(default)]
    organic_treatment: Option<Value>,
    #[serde(default)]
    pathogen_type: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Normalize the model's reply; `None` unless it is JSON with a disease name
pub fn parse_vision_reply(reply: &str) -> Option<VisionResult> {
    let raw: RawVisionReply = serde_json::from_str(strip_code_fences(reply)).ok()?;

    let disease_name = raw.disease_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;

    let crop_name = raw
        .crop_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    Some(VisionResult {
        healthy: raw.is_healthy.unwrap_or(false),
        disease_name,
        crop_name,
        confidence: parse_confidence(raw.confidence.as_ref()),
        symptoms: string_list(raw.symptoms),
        treatment: string_list(raw.treatment),
        prevention: string_list(raw.prevention),
        organic_treatment: string_list(raw.organic_treatment),
        pathogen_type: parse_label::<PathogenType>(raw.pathogen_type.as_deref()).unwrap_or_default(),
        severity: parse_label::<VisionSeverity>(raw.severity.as_deref()).unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
    })
}

fn parse_confidence(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(v) if v.is_finite() => clamp_confidence(v.trunc() as i64),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Strings from a JSON array; anything else is an empty list
fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Case-insensitive enum label
fn parse_label<T: serde::de::DeserializeOwned>(label: Option<&str>) -> Option<T> {
    let label = label?.trim().to_ascii_lowercase();
    serde_json::from_value(Value::String(label)).ok()
}
