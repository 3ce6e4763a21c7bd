//! The `koreksi check` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use koreksi_core::model::CorrectionStatus;
use koreksi_core::report::CheckReport;
use koreksi_core::EngineError;

use super::{build_engine, read_image, read_transcript};

pub async fn execute(
    exam_id: u64,
    inputs: Vec<PathBuf>,
    ocr: bool,
    output: Option<PathBuf>,
    save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (engine, config) = build_engine(config_path, ocr)?;

    let outcomes: Vec<Result<CheckReport, EngineError>> = if ocr {
        let mut outcomes = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let image = read_image(input)?;
            outcomes.push(engine.check_answers_image(exam_id, &image).await);
        }
        outcomes
    } else {
        let transcripts = inputs
            .iter()
            .map(|input| read_transcript(input))
            .collect::<Result<Vec<_>>>()?;
        engine.check_batch(exam_id, &transcripts).await
    };

    let output_dir = match output {
        Some(dir) => Some(dir),
        None if save => Some(config.output_dir.clone()),
        None => None,
    };
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let mut failed = 0;
    for (input, outcome) in inputs.iter().zip(outcomes) {
        match outcome {
            Ok(report) => {
                print_report(input, &report);
                if let Some(dir) = &output_dir {
                    let path = dir.join(format!("check-{exam_id}-{timestamp}-{}.json", report.id));
                    report.save_json(&path)?;
                    println!("Report saved to: {}", path.display());
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e:#}", input.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} sheets could not be graded", inputs.len());
    }
    Ok(())
}

fn print_report(input: &Path, report: &CheckReport) {
    println!("\n{}", input.display());
    if report.details.is_empty() {
        println!("{}", report.summary.summary_text);
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Question", "Student Answer", "Score", "Status"]);
    for detail in &report.details {
        let status = match detail.status {
            CorrectionStatus::Correct => "correct",
            CorrectionStatus::Incorrect => "incorrect",
            CorrectionStatus::KeyMissing => "no key",
        };
        table.add_row(vec![
            Cell::new(detail.question_number),
            Cell::new(&detail.student_answer),
            Cell::new(format!("{:.3}", detail.score)),
            Cell::new(status),
        ]);
    }

    println!("{table}");
    println!(
        "{} ({:.1}%)",
        report.summary.summary_text,
        report.score_ratio() * 100.0
    );
}
