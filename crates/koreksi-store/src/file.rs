//! Answer-key store persisted as a JSON snapshot.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fd_lock::RwLock;

use koreksi_core::error::StoreError;
use koreksi_core::model::{AnswerKeyEntry, Exam, ExamId, KeyCorrection, ParsedAnswer, VerifiedKey};
use koreksi_core::traits::AnswerKeyStore;

use crate::state::StoreState;

/// An [`AnswerKeyStore`] that rewrites a JSON file after every change.
///
/// Nothing is cached between calls. Every operation takes an advisory lock on
/// a sidecar `<file>.lock` (shared for reads, exclusive for writes) and reads
/// the snapshot from disk under it, so several handles or processes pointed at
/// the same file see each other's changes and never hand out the same id.
///
/// The snapshot is written to a temporary file next to the target and then
/// renamed over it, so the file on disk is always a complete snapshot. A
/// failed operation leaves the file as it was.
///
/// File I/O runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`, checking the snapshot if one exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let store = Self {
            lock_path: path.with_file_name(lock_name),
            path,
        };

        store.read_blocking(|_| ())?;
        tracing::debug!("opened answer-key store at {}", store.path.display());
        Ok(store)
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn lock_file(&self) -> Result<RwLock<File>, StoreError> {
        std::fs::create_dir_all(self.dir())?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(RwLock::new(file))
    }

    fn load(&self) -> Result<StoreState, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreState::default())
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    fn read_blocking<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        let lock = self.lock_file()?;
        let _guard = lock.read()?;
        let state = self.load()?;
        Ok(f(&state))
    }

    fn write_blocking<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write()?;
        let mut state = self.load()?;
        let out = f(&mut state)?;
        self.persist(&state)?;
        Ok(out)
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| StoreError::Corrupt(format!("failed to serialize store: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(self.dir())?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&StoreState) -> T + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.read_blocking(f))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }

    async fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut StoreState) -> Result<T, StoreError> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.write_blocking(f))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl AnswerKeyStore for JsonFileStore {
    async fn create_exam(&self, title: &str) -> Result<Exam, StoreError> {
        let title = title.to_string();
        self.write(move |state| Ok(state.create_exam(&title))).await
    }

    async fn exam(&self, exam_id: ExamId) -> Result<Option<Exam>, StoreError> {
        self.read(move |state| state.exam(exam_id)).await
    }

    async fn replace_keys(
        &self,
        exam_id: ExamId,
        answers: &[ParsedAnswer],
    ) -> Result<Vec<AnswerKeyEntry>, StoreError> {
        let answers = answers.to_vec();
        self.write(move |state| state.replace_keys(exam_id, &answers))
            .await
    }

    async fn apply_corrections(
        &self,
        exam_id: ExamId,
        corrections: &[KeyCorrection],
    ) -> Result<(), StoreError> {
        let corrections = corrections.to_vec();
        self.write(move |state| state.apply_corrections(exam_id, &corrections))
            .await
    }

    async fn verified_keys(&self, exam_id: ExamId) -> Result<Vec<VerifiedKey>, StoreError> {
        self.read(move |state| state.verified_keys(exam_id)).await
    }

    async fn keys(&self, exam_id: ExamId) -> Result<Vec<AnswerKeyEntry>, StoreError> {
        self.read(move |state| state.keys(exam_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let exam_id = {
            let store = JsonFileStore::open(&path).unwrap();
            let exam = store.create_exam("Biology").await.unwrap();
            let keys = store
                .replace_keys(exam.id, &[ParsedAnswer::new(1, "mitokondria")])
                .await
                .unwrap();
            store
                .apply_corrections(
                    exam.id,
                    &[KeyCorrection {
                        key_id: keys[0].id,
                        question_number: 1,
                        corrected_text: "mitochondria".into(),
                    }],
                )
                .await
                .unwrap();
            exam.id
        };

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.exam(exam_id).await.unwrap().unwrap().title, "Biology");
        let verified = reopened.verified_keys(exam_id).await.unwrap();
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].corrected_text, "mitochondria");
    }

    #[tokio::test]
    async fn missing_parent_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("keys.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.create_exam("History").await.unwrap();
        assert!(path.exists());
        assert!(dir.path().join("data").join("keys.json.lock").exists());
    }

    #[tokio::test]
    async fn two_handles_share_one_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let a = JsonFileStore::open(&path).unwrap();
        let b = JsonFileStore::open(&path).unwrap();

        let from_a = a.create_exam("From A").await.unwrap();
        let from_b = b.create_exam("From B").await.unwrap();
        assert_eq!(from_a.id, 1);
        assert_eq!(from_b.id, 2);

        let keys = a
            .replace_keys(from_a.id, &[ParsedAnswer::new(1, "Paris")])
            .await
            .unwrap();
        b.apply_corrections(
            from_a.id,
            &[KeyCorrection {
                key_id: keys[0].id,
                question_number: 1,
                corrected_text: "Paris".into(),
            }],
        )
        .await
        .unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.exam(1).await.unwrap().unwrap().title, "From A");
        assert_eq!(reopened.exam(2).await.unwrap().unwrap().title, "From B");
        assert_eq!(a.verified_keys(from_a.id).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_handles_never_reuse_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut tasks = Vec::new();
        for worker in 0..2 {
            let store = JsonFileStore::open(&path).unwrap();
            tasks.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..10 {
                    let exam = store
                        .create_exam(&format!("worker {worker} exam {i}"))
                        .await
                        .unwrap();
                    ids.push(exam.id);
                }
                ids
            }));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.extend(task.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());

        let store = JsonFileStore::open(&path).unwrap();
        for id in 1..=20 {
            assert!(store.exam(id).await.unwrap().is_some(), "exam {id} lost");
        }
    }

    #[tokio::test]
    async fn failed_operation_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        let exam = store.create_exam("A").await.unwrap();
        store
            .replace_keys(exam.id, &[ParsedAnswer::new(1, "a")])
            .await
            .unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = store
            .apply_corrections(
                exam.id,
                &[KeyCorrection {
                    key_id: 404,
                    question_number: 1,
                    corrected_text: "x".into(),
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound { key_id: 404, .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
