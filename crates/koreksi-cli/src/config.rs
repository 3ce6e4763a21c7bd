//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use koreksi_ocr::{apply_env_overrides, OcrConfig};
use koreksi_store::StoreConfig;

/// Top-level koreksi configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KoreksiConfig {
    /// Answer-key store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// OCR backend used by `--ocr` inputs.
    #[serde(default)]
    pub ocr: Option<OcrConfig>,
    /// Max student sheets graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Directory for saved check reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./koreksi-results")
}

impl Default for KoreksiConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            ocr: None,
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `koreksi.toml` in the current directory
/// 2. `~/.config/koreksi/config.toml`
///
/// Environment variable override: `KOREKSI_VISION_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<KoreksiConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("koreksi.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<KoreksiConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => KoreksiConfig::default(),
    };

    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");
    config.ocr = apply_env_overrides(config.ocr.take());

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("koreksi"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = KoreksiConfig::default();
        assert_eq!(config.parallelism, 4);
        assert!(config.ocr.is_none());
        assert!(matches!(config.store, StoreConfig::Json { .. }));
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
parallelism = 8
output_dir = "reports"

[store]
type = "json"
path = "data/keys.json"

[ocr]
type = "vision"
api_key = "k"
"#;
        let config: KoreksiConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(
            config.store,
            StoreConfig::Json {
                path: PathBuf::from("data/keys.json")
            }
        );
        assert!(matches!(config.ocr, Some(OcrConfig::Vision { .. })));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: KoreksiConfig = toml::from_str("").unwrap();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.output_dir, PathBuf::from("./koreksi-results"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/koreksi.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("koreksi.toml");
        std::fs::write(&path, "parallelism = 0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("parallelism"));
    }
}
