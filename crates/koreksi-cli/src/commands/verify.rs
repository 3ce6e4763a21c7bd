//! The `koreksi verify` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use koreksi_core::model::KeyCorrection;

use super::build_engine;

pub async fn execute(
    exam_id: u64,
    corrections_path: Option<PathBuf>,
    accept_all: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (engine, _) = build_engine(config_path, false)?;

    let corrections: Vec<KeyCorrection> = match corrections_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read corrections: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse corrections: {}", path.display()))?
        }
        None if accept_all => engine
            .keys(exam_id)
            .await?
            .into_iter()
            .map(|entry| KeyCorrection {
                key_id: entry.id,
                question_number: entry.question_number,
                corrected_text: entry.corrected_text.unwrap_or(entry.raw_text),
            })
            .collect(),
        None => anyhow::bail!("either --corrections or --accept-all is required"),
    };

    if corrections.is_empty() {
        println!("Nothing to verify for exam {exam_id}.");
        return Ok(());
    }

    engine.verify_keys(exam_id, &corrections).await?;
    println!("Verified {} keys for exam {exam_id}.", corrections.len());
    Ok(())
}
