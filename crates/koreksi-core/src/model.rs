//! Core data model types for koreksi.
//!
//! These are the types shared by the parser, the answer-key workflows, the
//! grading engine, and every store and OCR implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Question number as written on the sheet.
pub type QuestionNumber = u64;

/// Store-assigned exam identifier.
pub type ExamId = u64;

/// Store-assigned answer-key entry identifier.
pub type KeyId = u64;

/// One numbered answer recovered from an OCR transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnswer {
    /// The leading number of the line.
    pub question_number: QuestionNumber,
    /// Everything after the number, trimmed.
    pub text: String,
}

impl ParsedAnswer {
    pub fn new(question_number: QuestionNumber, text: impl Into<String>) -> Self {
        Self {
            question_number,
            text: text.into(),
        }
    }
}

/// An exam that owns a set of answer-key entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub title: String,
}

/// A persisted answer-key entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    /// Unique identifier assigned by the store.
    pub id: KeyId,
    /// The exam this entry belongs to.
    pub exam_id: ExamId,
    /// Question number (may be renumbered during verification).
    pub question_number: QuestionNumber,
    /// Answer text as read from the key sheet.
    pub raw_text: String,
    /// Human-corrected answer, set on verification.
    #[serde(default)]
    pub corrected_text: Option<String>,
    /// Whether a human has confirmed this entry.
    #[serde(default)]
    pub verified: bool,
}

impl AnswerKeyEntry {
    /// Build a fresh, unverified entry from a parsed answer.
    pub fn unverified(id: KeyId, exam_id: ExamId, answer: &ParsedAnswer) -> Self {
        Self {
            id,
            exam_id,
            question_number: answer.question_number,
            raw_text: answer.text.clone(),
            corrected_text: None,
            verified: false,
        }
    }

    /// Apply a human correction. Verification is one-way.
    pub fn apply(&mut self, correction: &KeyCorrection) {
        self.question_number = correction.question_number;
        self.corrected_text = Some(correction.corrected_text.clone());
        self.verified = true;
    }
}

/// A human-supplied correction for one answer-key entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCorrection {
    pub key_id: KeyId,
    pub question_number: QuestionNumber,
    pub corrected_text: String,
}

/// A verified key as exposed to graders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedKey {
    pub question_number: QuestionNumber,
    pub corrected_text: String,
}

/// Outcome of grading a single student answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStatus {
    Correct,
    Incorrect,
    KeyMissing,
}

impl fmt::Display for CorrectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionStatus::Correct => write!(f, "correct"),
            CorrectionStatus::Incorrect => write!(f, "incorrect"),
            CorrectionStatus::KeyMissing => write!(f, "key_missing"),
        }
    }
}

impl FromStr for CorrectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "correct" => Ok(CorrectionStatus::Correct),
            "incorrect" => Ok(CorrectionStatus::Incorrect),
            "key_missing" | "key-missing" => Ok(CorrectionStatus::KeyMissing),
            other => Err(format!("unknown correction status: {other}")),
        }
    }
}

/// Per-question grading result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionResult {
    pub question_number: QuestionNumber,
    pub student_answer: String,
    pub is_correct: bool,
    /// Similarity in `[0.0, 1.0]`; zero when no key exists.
    pub score: f64,
    pub status: CorrectionStatus,
}

impl CorrectionResult {
    /// Result for a student answer whose question has no verified key.
    pub fn key_missing(answer: &ParsedAnswer) -> Self {
        Self {
            question_number: answer.question_number,
            student_answer: answer.text.clone(),
            is_correct: false,
            score: 0.0,
            status: CorrectionStatus::KeyMissing,
        }
    }
}
