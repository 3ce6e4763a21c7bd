//! Store state shared by the memory and file backends.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use koreksi_core::error::StoreError;
use koreksi_core::model::{
    AnswerKeyEntry, Exam, ExamId, KeyCorrection, KeyId, ParsedAnswer, VerifiedKey,
};

/// Every exam and key, plus the id counters.
///
/// Mutating methods either succeed completely or leave `self` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    last_exam_id: ExamId,
    #[serde(default)]
    last_key_id: KeyId,
    #[serde(default)]
    exams: BTreeMap<ExamId, Exam>,
    #[serde(default)]
    keys: BTreeMap<KeyId, AnswerKeyEntry>,
}

impl StoreState {
    pub(crate) fn create_exam(&mut self, title: &str) -> Exam {
        self.last_exam_id += 1;
        let exam = Exam {
            id: self.last_exam_id,
            title: title.to_string(),
        };
        self.exams.insert(exam.id, exam.clone());
        exam
    }

    pub(crate) fn exam(&self, exam_id: ExamId) -> Option<Exam> {
        self.exams.get(&exam_id).cloned()
    }

    pub(crate) fn replace_keys(
        &mut self,
        exam_id: ExamId,
        answers: &[ParsedAnswer],
    ) -> Result<Vec<AnswerKeyEntry>, StoreError> {
        if !self.exams.contains_key(&exam_id) {
            return Err(StoreError::ExamNotFound(exam_id));
        }

        let before = self.keys.len();
        self.keys.retain(|_, key| key.exam_id != exam_id);
        let removed = before - self.keys.len();
        if removed > 0 {
            tracing::debug!("removed {removed} existing keys of exam {exam_id}");
        }

        let mut created = Vec::with_capacity(answers.len());
        for answer in answers {
            self.last_key_id += 1;
            let entry = AnswerKeyEntry::unverified(self.last_key_id, exam_id, answer);
            self.keys.insert(entry.id, entry.clone());
            created.push(entry);
        }

        Ok(created)
    }

    pub(crate) fn apply_corrections(
        &mut self,
        exam_id: ExamId,
        corrections: &[KeyCorrection],
    ) -> Result<(), StoreError> {
        // Check the whole batch before touching anything.
        let owned: HashSet<KeyId> = self
            .keys
            .values()
            .filter(|key| key.exam_id == exam_id)
            .map(|key| key.id)
            .collect();
        if let Some(missing) = corrections.iter().find(|c| !owned.contains(&c.key_id)) {
            return Err(StoreError::KeyNotFound {
                exam_id,
                key_id: missing.key_id,
            });
        }

        for correction in corrections {
            if let Some(entry) = self.keys.get_mut(&correction.key_id) {
                entry.apply(correction);
            }
        }

        Ok(())
    }

    pub(crate) fn verified_keys(&self, exam_id: ExamId) -> Vec<VerifiedKey> {
        let mut verified: Vec<&AnswerKeyEntry> = self
            .keys
            .values()
            .filter(|key| key.exam_id == exam_id && key.verified)
            .collect();
        verified.sort_by_key(|key| (key.question_number, key.id));

        verified
            .into_iter()
            .map(|key| VerifiedKey {
                question_number: key.question_number,
                corrected_text: key.corrected_text.clone().unwrap_or_default(),
            })
            .collect()
    }

    pub(crate) fn keys(&self, exam_id: ExamId) -> Vec<AnswerKeyEntry> {
        self.keys
            .values()
            .filter(|key| key.exam_id == exam_id)
            .cloned()
            .collect()
    }
}
