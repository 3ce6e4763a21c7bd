//! Check report types with JSON persistence.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CorrectionResult, ExamId, QuestionNumber};

/// Summary text used when a student sheet yields no numbered answers.
pub const NO_ANSWERS_DETECTED: &str = "No answers were detected on the student sheet.";

/// The graded result of one student sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// The exam the sheet was graded against.
    pub exam_id: ExamId,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Per-question results in sheet order.
    pub details: Vec<CorrectionResult>,
    /// Totals over `details`.
    pub summary: CheckSummary,
}

/// Totals for a graded sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub total_correct: usize,
    pub total_questions: usize,
    pub summary_text: String,
}

impl CheckSummary {
    /// Summarize graded results against the verified key map.
    ///
    /// The question total is the number of verified keys; with no keys at all
    /// it falls back to the number of graded answers.
    pub fn compute(
        results: &[CorrectionResult],
        keys: &HashMap<QuestionNumber, String>,
    ) -> Self {
        let total_correct = results.iter().filter(|r| r.is_correct).count();
        let total_questions = if keys.is_empty() {
            results.len()
        } else {
            keys.len()
        };

        Self {
            total_correct,
            total_questions,
            summary_text: format!("Correct: {total_correct} of {total_questions} questions"),
        }
    }

    /// Summary for a sheet with no detected answers.
    pub fn no_answers() -> Self {
        Self {
            total_correct: 0,
            total_questions: 0,
            summary_text: NO_ANSWERS_DETECTED.to_string(),
        }
    }
}

impl CheckReport {
    pub fn new(exam_id: ExamId, details: Vec<CorrectionResult>, summary: CheckSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            exam_id,
            created_at: Utc::now(),
            details,
            summary,
        }
    }

    /// Fraction of the question total answered correctly.
    pub fn score_ratio(&self) -> f64 {
        if self.summary.total_questions == 0 {
            return 0.0;
        }
        self.summary.total_correct as f64 / self.summary.total_questions as f64
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: CheckReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
