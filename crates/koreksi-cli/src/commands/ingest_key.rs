//! The `koreksi ingest-key` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{build_engine, read_image, read_transcript};

pub async fn execute(
    exam_id: u64,
    input: PathBuf,
    ocr: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (engine, _) = build_engine(config_path, ocr)?;

    let entries = if ocr {
        engine.ingest_key_image(exam_id, &read_image(&input)?).await?
    } else {
        engine.ingest_key(exam_id, &read_transcript(&input)?).await?
    };

    let mut table = Table::new();
    table.set_header(vec!["Key ID", "Question", "Answer (as read)"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.question_number),
            Cell::new(&entry.raw_text),
        ]);
    }

    println!("{table}");
    println!(
        "Stored {} unverified keys for exam {exam_id}. Review them, then run `koreksi verify`.",
        entries.len()
    );
    Ok(())
}
