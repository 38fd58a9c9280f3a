//! Vision Fusion Adapter
//!
//! Wraps the external image classifier. The classifier never errors: missing
//! credentials, unreadable images, network failures and malformed replies all
//! come back as `None`, which the engine treats exactly like "no image".
//!
//! - `gemini`: HTTP classifier backed by the Gemini generateContent API
//! - `fusion`: folds a disease verdict into rule-based candidate scores

pub mod fusion;
pub mod gemini;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::VisionConfig;
use crate::types::VisionResult;

pub use fusion::{apply_fusion, names_related};
pub use gemini::{parse_vision_reply, GeminiClassifier};

/// External image classifier
#[async_trait]
pub trait VisionClassifier: Send + Sync {
    /// Short tag for logs
    fn name(&self) -> &'static str;

    /// Classify the image at `image`. Failures yield `None`, never an error.
    async fn classify(&self, image: &Path) -> Option<VisionResult>;
}

/// Stand-in used when no vision credentials are configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl VisionClassifier for DisabledClassifier {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn classify(&self, image: &Path) -> Option<VisionResult> {
        tracing::debug!("Vision disabled, ignoring image {:?}", image);
        None
    }
}

/// Build the classifier the configuration asks for
pub fn classifier_from_config(config: &VisionConfig) -> Arc<dyn VisionClassifier> {
    match &config.api_key {
        Some(key) => {
            tracing::info!("Vision classifier: gemini ({})", config.model);
            Arc::new(GeminiClassifier::new(&config.endpoint, key, &config.model))
        }
        None => {
            tracing::info!("Vision classifier: disabled (GEMINI_API_KEY not set)");
            Arc::new(DisabledClassifier)
        }
    }
}

/// Run the classifier, giving up after `deadline`
///
/// Expiry degrades to `None` so the diagnosis continues rule-based only.
pub async fn classify_within(
    classifier: &dyn VisionClassifier,
    image: &Path,
    deadline: Option<Duration>,
) -> Option<VisionResult> {
    let Some(limit) = deadline else {
        return classifier.classify(image).await;
    };

    match tokio::time::timeout(limit, classifier.classify(image)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                classifier = classifier.name(),
                "Image analysis exceeded {:?}, continuing without it",
                limit
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowClassifier;

    #[async_trait]
    impl VisionClassifier for SlowClassifier {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn classify(&self, _image: &Path) -> Option<VisionResult> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Some(VisionResult::diseased("Blast", "Rice"))
        }
    }

    #[tokio::test]
    async fn test_disabled_classifier_returns_none() {
        assert!(DisabledClassifier.classify(Path::new("leaf.jpg")).await.is_none());
    }

    #[tokio::test]
    async fn test_deadline_expiry_degrades_to_none() {
        let result =
            classify_within(&SlowClassifier, Path::new("leaf.jpg"), Some(Duration::from_millis(20))).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_no_deadline_waits() {
        struct Quick;

        #[async_trait]
        impl VisionClassifier for Quick {
            fn name(&self) -> &'static str {
                "quick"
            }

            async fn classify(&self, _image: &Path) -> Option<VisionResult> {
                Some(VisionResult::healthy("Rice"))
            }
        }

        let result = classify_within(&Quick, Path::new("leaf.jpg"), None).await;
        assert!(result.unwrap().healthy);
    }

    #[test]
    fn test_classifier_from_config() {
        let mut config = VisionConfig::default();
        assert_eq!(classifier_from_config(&config).name(), "disabled");

        config.api_key = Some("key".to_string());
        assert_eq!(classifier_from_config(&config).name(), "gemini");
    }
}
