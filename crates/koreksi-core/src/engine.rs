//! Exam workflow orchestrator.
//!
//! Wires the parser and the grading engine to an answer-key store and an
//! optional OCR backend. Each method is one request-scoped unit of work.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::error::{EngineError, StoreError};
use crate::grading::{grade_answer, key_map};
use crate::model::{AnswerKeyEntry, Exam, ExamId, KeyCorrection, VerifiedKey};
use crate::parser;
use crate::report::{CheckReport, CheckSummary};
use crate::traits::{AnswerKeyStore, TextExtractor};

/// Configuration for the exam engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum student sheets graded concurrently by [`ExamEngine::check_batch`].
    pub parallelism: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// The answer-key and grading workflows.
pub struct ExamEngine {
    store: Arc<dyn AnswerKeyStore>,
    extractor: Option<Arc<dyn TextExtractor>>,
    config: EngineConfig,
}

impl ExamEngine {
    pub fn new(store: Arc<dyn AnswerKeyStore>, config: EngineConfig) -> Self {
        Self {
            store,
            extractor: None,
            config,
        }
    }

    /// Attach an OCR backend for the `*_image` workflows.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Create a new exam.
    pub async fn create_exam(&self, title: &str) -> Result<Exam, EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::MissingTitle);
        }

        let exam = self.store.create_exam(title).await?;
        tracing::info!("created exam {} ({})", exam.id, exam.title);
        Ok(exam)
    }

    /// Look up an exam by id.
    pub async fn exam(&self, exam_id: ExamId) -> Result<Option<Exam>, EngineError> {
        Ok(self.store.exam(exam_id).await?)
    }

    /// Replace the exam's answer key with the answers in an OCR transcript.
    ///
    /// Every existing key of the exam is deleted, including verified ones.
    pub async fn ingest_key(
        &self,
        exam_id: ExamId,
        transcript: &str,
    ) -> Result<Vec<AnswerKeyEntry>, EngineError> {
        let deduped = parser::parse_unique(transcript);
        if deduped.is_empty() {
            return Err(EngineError::NoAnswersParsed);
        }

        let entries = self.store.replace_keys(exam_id, &deduped.answers).await?;
        tracing::info!(
            "stored {} unverified keys for exam {exam_id} ({} duplicates discarded)",
            entries.len(),
            deduped.discarded.len()
        );
        Ok(entries)
    }

    /// Run OCR on a key sheet image, then [`ingest_key`](Self::ingest_key).
    pub async fn ingest_key_image(
        &self,
        exam_id: ExamId,
        image: &[u8],
    ) -> Result<Vec<AnswerKeyEntry>, EngineError> {
        let transcript = self.extract(image).await?;
        self.ingest_key(exam_id, &transcript).await
    }

    /// Apply human corrections to the exam's keys and mark them verified.
    ///
    /// All-or-nothing: if any correction fails, none are applied.
    pub async fn verify_keys(
        &self,
        exam_id: ExamId,
        corrections: &[KeyCorrection],
    ) -> Result<(), EngineError> {
        if corrections.is_empty() {
            return Ok(());
        }

        self.store
            .apply_corrections(exam_id, corrections)
            .await
            .map_err(|e| match e.key_id() {
                Some(key_id) => EngineError::VerificationFailure { key_id, source: e },
                None => EngineError::Persistence(e),
            })?;

        tracing::info!("verified {} keys for exam {exam_id}", corrections.len());
        Ok(())
    }

    /// Verified keys of the exam, ordered by question number.
    pub async fn verified_keys(&self, exam_id: ExamId) -> Result<Vec<VerifiedKey>, EngineError> {
        Ok(self.store.verified_keys(exam_id).await?)
    }

    /// Every key of the exam, verified or not.
    pub async fn keys(&self, exam_id: ExamId) -> Result<Vec<AnswerKeyEntry>, EngineError> {
        Ok(self.store.keys(exam_id).await?)
    }

    /// Grade a student transcript against the exam's verified keys.
    ///
    /// A transcript with no numbered answers is not an error: it yields an
    /// empty report. The store is never written.
    pub async fn check_answers(
        &self,
        exam_id: ExamId,
        transcript: &str,
    ) -> Result<CheckReport, EngineError> {
        let deduped = parser::parse_unique(transcript);
        if deduped.is_empty() {
            tracing::info!("no answers detected on student sheet for exam {exam_id}");
            return Ok(CheckReport::new(exam_id, vec![], CheckSummary::no_answers()));
        }

        let keys = key_map(self.store.verified_keys(exam_id).await?);
        if keys.is_empty() {
            tracing::warn!("exam {exam_id} has no verified keys; every answer is ungraded");
        }

        let details: Vec<_> = deduped
            .answers
            .iter()
            .map(|answer| grade_answer(answer, &keys))
            .collect();
        let summary = CheckSummary::compute(&details, &keys);

        tracing::info!("exam {exam_id}: {}", summary.summary_text);
        Ok(CheckReport::new(exam_id, details, summary))
    }

    /// Run OCR on a student sheet image, then [`check_answers`](Self::check_answers).
    pub async fn check_answers_image(
        &self,
        exam_id: ExamId,
        image: &[u8],
    ) -> Result<CheckReport, EngineError> {
        let transcript = self.extract(image).await?;
        self.check_answers(exam_id, &transcript).await
    }

    /// Grade many student transcripts concurrently.
    ///
    /// Outcomes are returned in input order; one failing sheet does not
    /// affect the others.
    pub async fn check_batch(
        &self,
        exam_id: ExamId,
        transcripts: &[String],
    ) -> Vec<Result<CheckReport, EngineError>> {
        let semaphore = Semaphore::new(self.config.parallelism.max(1));
        let semaphore = &semaphore;
        let mut futures = FuturesUnordered::new();

        for (index, transcript) in transcripts.iter().enumerate() {
            futures.push(async move {
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => self.check_answers(exam_id, transcript).await,
                    Err(_) => Err(EngineError::Persistence(StoreError::Unavailable(
                        "semaphore closed".into(),
                    ))),
                };
                (index, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(transcripts.len());
        while let Some((index, outcome)) = futures.next().await {
            if let Err(e) = &outcome {
                tracing::error!("sheet {index} failed for exam {exam_id}: {e}");
            }
            outcomes.push((index, outcome));
        }

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    async fn extract(&self, image: &[u8]) -> Result<String, EngineError> {
        let Some(extractor) = &self.extractor else {
            return Err(EngineError::Extraction(anyhow::anyhow!(
                "no OCR backend configured"
            )));
        };

        let text = extractor
            .extract_text(image)
            .await
            .map_err(EngineError::Extraction)?;
        tracing::debug!("{} extracted {} bytes of text", extractor.name(), text.len());
        Ok(text)
    }
}
