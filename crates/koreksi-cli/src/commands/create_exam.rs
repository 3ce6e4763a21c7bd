//! The `koreksi create-exam` command.

use std::path::PathBuf;

use anyhow::Result;

use super::build_engine;

pub async fn execute(title: String, config_path: Option<PathBuf>) -> Result<()> {
    let (engine, _) = build_engine(config_path, false)?;
    let exam = engine.create_exam(&title).await?;
    println!("Created exam {}: {}", exam.id, exam.title);
    Ok(())
}
