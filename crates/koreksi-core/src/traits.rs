//! Collaborator traits for answer-key storage and OCR.
//!
//! These async traits are implemented by the `koreksi-store` and
//! `koreksi-ocr` crates respectively.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{AnswerKeyEntry, Exam, ExamId, KeyCorrection, ParsedAnswer, VerifiedKey};

// ---------------------------------------------------------------------------
// Answer key store
// ---------------------------------------------------------------------------

/// Persistent storage for exams and their answer keys.
///
/// Every method is one atomic unit of work: either all of its changes become
/// visible or none do, and concurrent readers never observe a half-applied
/// change.
#[async_trait]
pub trait AnswerKeyStore: Send + Sync {
    /// Create a new exam.
    async fn create_exam(&self, title: &str) -> Result<Exam, StoreError>;

    /// Look up an exam by id.
    async fn exam(&self, exam_id: ExamId) -> Result<Option<Exam>, StoreError>;

    /// Delete every key of the exam (verified or not) and insert one
    /// unverified entry per answer, in the given order.
    async fn replace_keys(
        &self,
        exam_id: ExamId,
        answers: &[ParsedAnswer],
    ) -> Result<Vec<AnswerKeyEntry>, StoreError>;

    /// Apply every correction to keys of the exam and mark them verified.
    ///
    /// Fails with [`StoreError::KeyNotFound`] on the first key that does not
    /// belong to the exam, leaving all keys untouched.
    async fn apply_corrections(
        &self,
        exam_id: ExamId,
        corrections: &[KeyCorrection],
    ) -> Result<(), StoreError>;

    /// Verified keys of the exam, ordered by question number then key id.
    /// An unknown exam has no verified keys.
    async fn verified_keys(&self, exam_id: ExamId) -> Result<Vec<VerifiedKey>, StoreError>;

    /// All keys of the exam in id order.
    async fn keys(&self, exam_id: ExamId) -> Result<Vec<AnswerKeyEntry>, StoreError>;
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

/// Turns a scanned sheet into raw text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Human-readable backend name (e.g. "vision").
    fn name(&self) -> &str;

    /// Extract the full text of an image. No text is an empty string, not an error.
    async fn extract_text(&self, image: &[u8]) -> anyhow::Result<String>;
}
