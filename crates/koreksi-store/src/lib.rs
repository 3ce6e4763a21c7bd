//! koreksi-store: Answer-key storage backends.
//!
//! Implements the `AnswerKeyStore` trait with an in-memory store and a
//! JSON-snapshot file store.

pub mod config;
pub mod file;
pub mod memory;
mod state;

pub use config::{open_store, StoreConfig};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
