//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use koreksi_core::{EngineConfig, ExamEngine};
use koreksi_ocr::create_extractor;
use koreksi_store::open_store;

use crate::config::{load_config_from, KoreksiConfig};

pub mod check;
pub mod create_exam;
pub mod ingest_key;
pub mod init;
pub mod keys;
pub mod verify;

/// Load the config and wire an engine to its store.
///
/// The OCR backend is only built when `with_ocr` is set, so commands that
/// never read images work without OCR credentials.
pub(crate) fn build_engine(
    config_path: Option<PathBuf>,
    with_ocr: bool,
) -> Result<(ExamEngine, KoreksiConfig)> {
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config.store)?;
    let mut engine = ExamEngine::new(
        store,
        EngineConfig {
            parallelism: config.parallelism,
        },
    );

    if with_ocr {
        let ocr = config.ocr.as_ref().context(
            "--ocr needs an [ocr] section in the config (or KOREKSI_VISION_KEY in the environment)",
        )?;
        engine = engine.with_extractor(create_extractor(ocr)?);
    }

    Ok((engine, config))
}

pub(crate) fn read_transcript(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript: {}", path.display()))
}

pub(crate) fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read image: {}", path.display()))
}
