//! Runtime configuration from environment variables
//!
//! | Variable | Default |
//! |---|---|
//! | `DATA_DIR` | `data` |
//! | `PORT` | `3000` |
//! | `UPLOAD_DIR` | `uploads` |
//! | `GEMINI_API_KEY` | unset (vision disabled) |
//! | `GEMINI_MODEL` | `gemini-2.5-flash` |
//! | `GEMINI_ENDPOINT` | Generative Language v1beta |
//! | `VISION_TIMEOUT_SECS` | `30` |
//!
//! Unparseable numbers fall back to their defaults.

use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 30;

/// Vision collaborator settings
#[derive(Debug, Clone, PartialEq)]
pub struct VisionConfig {
    /// `None` disables image analysis
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Deadline for the whole vision step
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: String,
    pub port: u16,
    /// Where uploaded leaf images are written while they are analysed
    pub upload_dir: String,
    pub vision: VisionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            port: DEFAULT_PORT,
            upload_dir: DEFAULT_UPLOAD_DIR.to_string(),
            vision: VisionConfig::default(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = non_blank("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let timeout_secs = non_blank("VISION_TIMEOUT_SECS")
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_VISION_TIMEOUT_SECS);

        Self {
            data_dir: non_blank("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            port,
            upload_dir: non_blank("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            vision: VisionConfig {
                api_key: non_blank("GEMINI_API_KEY"),
                model: non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                endpoint: non_blank("GEMINI_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, Config::default());
        assert!(config.vision.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATA_DIR", "/opt/kisan/data"),
            ("PORT", "8080"),
            ("UPLOAD_DIR", "/var/tmp/leaves"),
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-pro-vision"),
            ("VISION_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(config.data_dir, "/opt/kisan/data");
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, "/var/tmp/leaves");
        assert_eq!(config.vision.api_key.as_deref(), Some("secret"));
        assert_eq!(config.vision.model, "gemini-pro-vision");
        assert_eq!(config.vision.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_and_blank_values_use_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "eighty"),
            ("VISION_TIMEOUT_SECS", "-1"),
            ("GEMINI_API_KEY", "   "),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.vision.timeout, Duration::from_secs(DEFAULT_VISION_TIMEOUT_SECS));
        assert!(config.vision.api_key.is_none());
    }
}
