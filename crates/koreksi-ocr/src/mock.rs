//! Fixed extractor for testing.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use koreksi_core::traits::TextExtractor;

/// An extractor that returns the same transcript for every image.
///
/// Lets the engine's image workflows run without a real OCR service.
pub struct FixedExtractor {
    transcript: String,
    call_count: AtomicU32,
    last_image_len: AtomicU32,
}

impl FixedExtractor {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            call_count: AtomicU32::new(0),
            last_image_len: AtomicU32::new(0),
        }
    }

    /// Number of images extracted so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Size in bytes of the last image received.
    pub fn last_image_len(&self) -> u32 {
        self.last_image_len.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextExtractor for FixedExtractor {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn extract_text(&self, image: &[u8]) -> anyhow::Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.last_image_len
            .store(u32::try_from(image.len()).unwrap_or(u32::MAX), Ordering::Relaxed);
        Ok(self.transcript.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use koreksi_core::error::{EngineError, StoreError};
    use koreksi_core::model::{
        AnswerKeyEntry, Exam, ExamId, KeyCorrection, ParsedAnswer, VerifiedKey,
    };
    use koreksi_core::traits::AnswerKeyStore;
    use koreksi_core::{EngineConfig, ExamEngine};

    use super::*;

    #[tokio::test]
    async fn fixed_transcript() {
        let extractor = FixedExtractor::new("1. Paris");
        assert_eq!(extractor.extract_text(b"abc").await.unwrap(), "1. Paris");
        assert_eq!(extractor.extract_text(b"").await.unwrap(), "1. Paris");
        assert_eq!(extractor.call_count(), 2);
        assert_eq!(extractor.last_image_len(), 0);
    }

    /// Any store call fails; only the OCR path should be exercised.
    struct NoStore;

    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("offline".into()))
    }

    #[async_trait]
    impl AnswerKeyStore for NoStore {
        async fn create_exam(&self, _: &str) -> Result<Exam, StoreError> {
            offline()
        }
        async fn exam(&self, _: ExamId) -> Result<Option<Exam>, StoreError> {
            offline()
        }
        async fn replace_keys(
            &self,
            _: ExamId,
            _: &[ParsedAnswer],
        ) -> Result<Vec<AnswerKeyEntry>, StoreError> {
            offline()
        }
        async fn apply_corrections(&self, _: ExamId, _: &[KeyCorrection]) -> Result<(), StoreError> {
            offline()
        }
        async fn verified_keys(&self, _: ExamId) -> Result<Vec<VerifiedKey>, StoreError> {
            offline()
        }
        async fn keys(&self, _: ExamId) -> Result<Vec<AnswerKeyEntry>, StoreError> {
            offline()
        }
    }

    #[tokio::test]
    async fn engine_runs_ocr_before_parsing() {
        let extractor = Arc::new(FixedExtractor::new("ANSWER KEY\n(no numbers)"));
        let engine = ExamEngine::new(Arc::new(NoStore), EngineConfig::default())
            .with_extractor(extractor.clone());

        let err = engine.ingest_key_image(1, b"png-bytes").await.unwrap_err();
        assert!(matches!(err, EngineError::NoAnswersParsed));
        assert_eq!(extractor.call_count(), 1);
        assert_eq!(extractor.last_image_len(), 9);
    }
}
