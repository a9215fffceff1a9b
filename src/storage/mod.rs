//! Local storage module for Calm Tools
//!
//! Provides SQLite-based persistence for completed and aborted sessions,
//! following the Local First architecture principle.

mod database;
mod error;
mod repository;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use store::{SessionStore, SqliteStore};
