//! Error types for the answer-key store and the grading workflows.
//!
//! `StoreError` lives here rather than in `koreksi-store` so the engine can
//! classify store failures (for example, naming the key that broke a
//! verification batch) without string matching.

use thiserror::Error;

use crate::model::{ExamId, KeyId};

/// Errors raised by an [`AnswerKeyStore`](crate::traits::AnswerKeyStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The exam does not exist.
    #[error("exam {0} not found")]
    ExamNotFound(ExamId),

    /// The key does not exist, or belongs to a different exam.
    #[error("answer key {key_id} not found for exam {exam_id}")]
    KeyNotFound { exam_id: ExamId, key_id: KeyId },

    /// Reading or writing the backing storage failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing storage holds data that cannot be decoded.
    #[error("corrupt store data: {0}")]
    Corrupt(String),

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// The key id this error is about, if any.
    pub fn key_id(&self) -> Option<KeyId> {
        match self {
            StoreError::KeyNotFound { key_id, .. } => Some(*key_id),
            _ => None,
        }
    }
}

/// Errors returned by the [`ExamEngine`](crate::engine::ExamEngine) workflows.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transcript contained no numbered answers.
    #[error("no numbered answers could be parsed from the transcript")]
    NoAnswersParsed,

    /// An exam needs a non-blank title.
    #[error("exam title is required")]
    MissingTitle,

    /// A correction in a verification batch could not be applied; the
    /// whole batch was rolled back.
    #[error("failed to verify answer key {key_id}: {source}")]
    VerificationFailure {
        key_id: KeyId,
        #[source]
        source: StoreError,
    },

    /// The store failed; any in-flight change was rolled back.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The OCR collaborator failed.
    #[error("text extraction failed: {0:#}")]
    Extraction(#[source] anyhow::Error),
}

impl EngineError {
    /// Returns `true` if the caller sent something unusable, as opposed to
    /// the system failing to serve a valid request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, EngineError::NoAnswersParsed | EngineError::MissingTitle)
    }
}
