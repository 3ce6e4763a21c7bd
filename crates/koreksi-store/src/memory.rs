//! In-process answer-key store.

use std::sync::Mutex;

use async_trait::async_trait;

use koreksi_core::error::StoreError;
use koreksi_core::model::{AnswerKeyEntry, Exam, ExamId, KeyCorrection, ParsedAnswer, VerifiedKey};
use koreksi_core::traits::AnswerKeyStore;

use crate::state::StoreState;

/// An [`AnswerKeyStore`] held entirely in memory.
///
/// Each operation runs under one lock and works on a staged copy that
/// replaces the live state only on success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        Ok(f(&state))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        let mut staged = state.clone();
        let out = f(&mut staged)?;
        *state = staged;
        Ok(out)
    }
}

#[async_trait]
impl AnswerKeyStore for MemoryStore {
    async fn create_exam(&self, title: &str) -> Result<Exam, StoreError> {
        self.write(|state| Ok(state.create_exam(title)))
    }

    async fn exam(&self, exam_id: ExamId) -> Result<Option<Exam>, StoreError> {
        self.read(|state| state.exam(exam_id))
    }

    async fn replace_keys(
        &self,
        exam_id: ExamId,
        answers: &[ParsedAnswer],
    ) -> Result<Vec<AnswerKeyEntry>, StoreError> {
        self.write(|state| state.replace_keys(exam_id, answers))
    }

    async fn apply_corrections(
        &self,
        exam_id: ExamId,
        corrections: &[KeyCorrection],
    ) -> Result<(), StoreError> {
        self.write(|state| state.apply_corrections(exam_id, corrections))
    }

    async fn verified_keys(&self, exam_id: ExamId) -> Result<Vec<VerifiedKey>, StoreError> {
        self.read(|state| state.verified_keys(exam_id))
    }

    async fn keys(&self, exam_id: ExamId) -> Result<Vec<AnswerKeyEntry>, StoreError> {
        self.read(|state| state.keys(exam_id))
    }
}
