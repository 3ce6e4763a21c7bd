//! The `koreksi init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("koreksi.toml").exists() {
        println!("koreksi.toml already exists, skipping.");
    } else {
        std::fs::write("koreksi.toml", SAMPLE_CONFIG)?;
        println!("Created koreksi.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set KOREKSI_VISION_KEY (or edit [ocr] in koreksi.toml) to read images");
    println!("  2. Run: koreksi create-exam --title \"Midterm\"");
    println!("  3. Run: koreksi ingest-key --exam 1 --input key.png --ocr");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# koreksi configuration

parallelism = 4
output_dir = "./koreksi-results"

[store]
type = "json"
path = "./koreksi-data/store.json"

[ocr]
type = "vision"
api_key = "${GOOGLE_VISION_API_KEY}"
"#;
