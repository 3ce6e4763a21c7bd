//! koreksi-core: Answer parsing, answer-key workflows, and fuzzy grading.
//!
//! This crate defines the data model, the transcript parser, the grading
//! engine, and the collaborator traits that the rest of koreksi builds on.

pub mod engine;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod report;
pub mod traits;

pub use engine::{EngineConfig, ExamEngine};
pub use error::{EngineError, StoreError};
