//! koreksi-ocr: OCR backends.
//!
//! Implements the `TextExtractor` trait for Google Cloud Vision and for
//! sheets that were already transcribed, plus a fixed extractor for tests.

pub mod config;
pub mod error;
pub mod mock;
pub mod plain;
pub mod vision;

pub use config::{apply_env_overrides, create_extractor, OcrConfig};
pub use error::OcrError;
pub use mock::FixedExtractor;
pub use plain::PlainTextExtractor;
pub use vision::VisionExtractor;
