//! OCR configuration and factory.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use koreksi_core::traits::TextExtractor;

use crate::plain::PlainTextExtractor;
use crate::vision::VisionExtractor;

/// Environment variable that overrides the Vision API key.
pub const VISION_KEY_ENV: &str = "KOREKSI_VISION_KEY";

/// Configuration for the OCR backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OcrConfig {
    Vision {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Plain,
}

impl std::fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrConfig::Vision {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Vision")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            OcrConfig::Plain => f.write_str("Plain"),
        }
    }
}

impl OcrConfig {
    /// Resolve `${VAR}` references from the environment.
    pub fn resolved(&self) -> OcrConfig {
        match self {
            OcrConfig::Vision { api_key, base_url } => OcrConfig::Vision {
                api_key: resolve_env_vars(api_key),
                base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            },
            OcrConfig::Plain => OcrConfig::Plain,
        }
    }
}

/// Apply the `KOREKSI_VISION_KEY` override and resolve env references.
///
/// Setting the variable selects the Vision backend when nothing else is
/// configured. An explicit `plain` backend is left alone.
pub fn apply_env_overrides(config: Option<OcrConfig>) -> Option<OcrConfig> {
    let config = match (config, std::env::var(VISION_KEY_ENV).ok()) {
        (Some(OcrConfig::Vision { base_url, .. }), Some(key)) => Some(OcrConfig::Vision {
            api_key: key,
            base_url,
        }),
        (None, Some(key)) => Some(OcrConfig::Vision {
            api_key: key,
            base_url: None,
        }),
        (config, _) => config,
    };
    config.map(|c| c.resolved())
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Create an extractor from its configuration.
pub fn create_extractor(config: &OcrConfig) -> Result<Arc<dyn TextExtractor>> {
    match config {
        OcrConfig::Vision { api_key, base_url } => {
            if api_key.trim().is_empty() {
                anyhow::bail!(
                    "the vision OCR backend needs an api_key (set it in the config or via {VISION_KEY_ENV})"
                );
            }
            Ok(Arc::new(VisionExtractor::new(api_key, base_url.clone())?))
        }
        OcrConfig::Plain => Ok(Arc::new(PlainTextExtractor)),
    }
}
