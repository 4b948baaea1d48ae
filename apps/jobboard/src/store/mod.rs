#![allow(dead_code)]

//! Record Store — the async contract for the backing store of records and
//! saved marks.
//!
//! The session holds an `Arc<dyn RecordStore>`; `MemoryStore` is the
//! in-process implementation used by the binary and by tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::record::{NewRecord, Record};
use crate::models::saved::SavedMark;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self, order: OrderBy, limit: usize) -> Result<Vec<Record>, StoreError>;

    /// The store assigns id and timestamps; the returned record is authoritative.
    async fn create_record(&self, owner: &str, draft: NewRecord) -> Result<Record, StoreError>;

    async fn list_saved_marks(&self, user_id: &str) -> Result<Vec<SavedMark>, StoreError>;

    /// Returns the mark as confirmed by the store.
    async fn create_saved_mark(&self, mark: SavedMark) -> Result<SavedMark, StoreError>;

    async fn delete_saved_mark(&self, id: &str) -> Result<(), StoreError>;
}
