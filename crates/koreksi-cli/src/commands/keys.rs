//! The `koreksi keys` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use super::build_engine;

pub async fn execute(exam_id: u64, all: bool, config_path: Option<PathBuf>) -> Result<()> {
    let (engine, _) = build_engine(config_path, false)?;
    let exam = engine
        .exam(exam_id)
        .await?
        .with_context(|| format!("exam {exam_id} not found"))?;
    println!("Exam {}: {}", exam.id, exam.title);

    let mut table = Table::new();
    if all {
        let mut entries = engine.keys(exam_id).await?;
        entries.sort_by_key(|entry| (entry.question_number, entry.id));

        table.set_header(vec!["Key ID", "Question", "Raw", "Corrected", "Verified"]);
        for entry in &entries {
            table.add_row(vec![
                Cell::new(entry.id),
                Cell::new(entry.question_number),
                Cell::new(&entry.raw_text),
                Cell::new(entry.corrected_text.as_deref().unwrap_or("-")),
                Cell::new(if entry.verified { "yes" } else { "no" }),
            ]);
        }
        println!("{table}");
        println!("{} keys for exam {exam_id}", entries.len());
    } else {
        let verified = engine.verified_keys(exam_id).await?;

        table.set_header(vec!["Question", "Answer"]);
        for key in &verified {
            table.add_row(vec![
                Cell::new(key.question_number),
                Cell::new(&key.corrected_text),
            ]);
        }
        println!("{table}");
        println!("{} verified keys for exam {exam_id}", verified.len());
    }

    Ok(())
}
