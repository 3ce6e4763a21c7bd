//! Store configuration and factory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use koreksi_core::traits::AnswerKeyStore;

use crate::file::JsonFileStore;
use crate::memory::MemoryStore;

/// Which answer-key store backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Keep everything in process memory; lost on exit.
    Memory,
    /// Persist to a JSON snapshot file.
    Json {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./koreksi-data/store.json")
}

/// Open the store described by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn AnswerKeyStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Json { path } => {
            let store = JsonFileStore::open(path)
                .with_context(|| format!("failed to open store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}
