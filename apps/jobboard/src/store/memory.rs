#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{debug, info};
use uuid::Uuid;

use super::{OrderBy, RecordStore};
use crate::errors::StoreError;
use crate::models::record::{NewRecord, Record, RecordRow};
use crate::models::saved::SavedMark;

/// Store operations, used to inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListRecords,
    CreateRecord,
    ListSavedMarks,
    CreateSavedMark,
    DeleteSavedMark,
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub records: Vec<RecordRow>,
    #[serde(default)]
    pub saved_marks: Vec<SavedMark>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<RecordRow>,
    marks: Vec<SavedMark>,
    failing: HashSet<StoreOp>,
    calls: HashMap<StoreOp, usize>,
}

/// In-memory record store.
///
/// Records are held in their transport form and decoded on every read, so
/// tag parsing runs exactly as it would against a remote store. Like the
/// remote store it stands in for, it does not enforce uniqueness of
/// (user_id, record_id) on saved marks.
///
/// A gated store applies saved-mark creates and deletes immediately but holds
/// each response until `release` hands out a permit (FIFO), like a server
/// that has committed a write whose reply is still in flight.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    gate: Option<Semaphore>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            gate: None,
        }
    }

    pub fn gated() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            gate: Some(Semaphore::new(0)),
        }
    }

    pub fn from_seed(seed: SeedFile) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            inner.rows = seed.records;
            inner.marks = seed.saved_marks;
        }
        store
    }

    pub async fn load_seed_file(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: SeedFile = serde_json::from_str(&raw)?;
        info!(
            "Seeded memory store from {}: {} records, {} saved marks",
            path.display(),
            seed.records.len(),
            seed.saved_marks.len()
        );
        Ok(Self::from_seed(seed))
    }

    pub fn insert_row(&self, row: RecordRow) {
        self.lock().rows.push(row);
    }

    /// Inserts a saved mark as-is, bypassing any checks.
    pub fn insert_saved_mark(&self, mark: SavedMark) {
        self.lock().marks.push(mark);
    }

    pub fn saved_marks(&self) -> Vec<SavedMark> {
        self.lock().marks.clone()
    }

    pub fn fail_on(&self, op: StoreOp) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.lock().failing.remove(&op);
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Lets `permits` held saved-mark responses through. No-op on an ungated store.
    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        let mut inner = self.lock();
        *inner.calls.entry(op).or_insert(0) += 1;
        if inner.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("simulated {op:?} failure")));
        }
        Ok(())
    }

    async fn hold_response(&self) -> Result<(), StoreError> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| StoreError::Unavailable("store gate closed".to_string()))?
                .forget();
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_records(&self, order: OrderBy, limit: usize) -> Result<Vec<Record>, StoreError> {
        self.enter(StoreOp::ListRecords)?;
        let mut records: Vec<Record> = self
            .lock()
            .rows
            .iter()
            .cloned()
            .map(Record::from)
            .collect();

        match order {
            OrderBy::CreatedAtDesc => records.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            OrderBy::CreatedAtAsc => records.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        records.truncate(limit);
        debug!("Listed {} records", records.len());
        Ok(records)
    }

    async fn create_record(&self, owner: &str, draft: NewRecord) -> Result<Record, StoreError> {
        self.enter(StoreOp::CreateRecord)?;
        let record = draft.into_record(Uuid::new_v4().to_string(), owner, Utc::now());
        self.lock().rows.push(RecordRow::from(&record));
        debug!("Created record {}", record.id);
        Ok(record)
    }

    async fn list_saved_marks(&self, user_id: &str) -> Result<Vec<SavedMark>, StoreError> {
        self.enter(StoreOp::ListSavedMarks)?;
        Ok(self
            .lock()
            .marks
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_saved_mark(&self, mark: SavedMark) -> Result<SavedMark, StoreError> {
        let outcome = self.enter(StoreOp::CreateSavedMark).map(|()| {
            let confirmed = SavedMark {
                created_at: Utc::now(),
                ..mark
            };
            self.lock().marks.push(confirmed.clone());
            confirmed
        });
        self.hold_response().await?;
        let confirmed = outcome?;
        debug!("Created saved mark {}", confirmed.id);
        Ok(confirmed)
    }

    async fn delete_saved_mark(&self, id: &str) -> Result<(), StoreError> {
        let outcome = self.enter(StoreOp::DeleteSavedMark).and_then(|()| {
            let mut inner = self.lock();
            let before = inner.marks.len();
            inner.marks.retain(|m| m.id != id);
            if inner.marks.len() == before {
                return Err(StoreError::NotFound(format!("saved mark {id}")));
            }
            Ok(())
        });
        self.hold_response().await?;
        outcome?;
        debug!("Deleted saved mark {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::io::Write;

    fn row(id: &str, minutes: i64, tags: Option<&str>) -> RecordRow {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RecordRow {
            id: id.to_string(),
            user_id: "owner".to_string(),
            title: format!("Job {id}"),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            employment_type: String::new(),
            experience_level: String::new(),
            salary_min: None,
            salary_max: None,
            salary_currency: None,
            tags: tags.map(str::to_string),
            created_at: base + Duration::minutes(minutes),
            updated_at: base + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_limits() {
        let store = MemoryStore::new();
        store.insert_row(row("old", 0, None));
        store.insert_row(row("new", 10, None));
        store.insert_row(row("mid", 5, None));

        let records = store.list_records(OrderBy::CreatedAtDesc, 2).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);

        let records = store.list_records(OrderBy::CreatedAtAsc, 10).await.unwrap();
        assert_eq!(records[0].id, "old");
    }

    #[tokio::test]
    async fn test_list_decodes_tags_leniently() {
        let store = MemoryStore::new();
        store.insert_row(row("a", 0, Some(r#"["Rust"]"#)));
        store.insert_row(row("b", 1, Some("Rust;Go")));

        let records = store.list_records(OrderBy::CreatedAtAsc, 10).await.unwrap();
        assert_eq!(records[0].tags, vec!["Rust"]);
        assert!(records[1].tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_record_assigns_identity() {
        let store = MemoryStore::new();
        let draft = NewRecord {
            title: "Writer".to_string(),
            tags: vec!["docs".to_string()],
            ..Default::default()
        };
        let record = store.create_record("u-1", draft).await.unwrap();
        assert!(!record.id.is_empty());
        assert_eq!(record.user_id, "u-1");

        let listed = store.list_records(OrderBy::CreatedAtDesc, 10).await.unwrap();
        assert_eq!(listed, vec![record]);
    }

    #[tokio::test]
    async fn test_saved_marks_scoped_to_user() {
        let store = MemoryStore::new();
        store.insert_saved_mark(SavedMark::new("alice", "job-1"));
        store.insert_saved_mark(SavedMark::new("bob", "job-1"));

        let marks = store.list_saved_marks("alice").await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].user_id, "alice");
    }

    #[tokio::test]
    async fn test_delete_unknown_mark_is_not_found() {
        let store = MemoryStore::new();
        let err = store.delete_saved_mark("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let store = MemoryStore::new();
        store.fail_on(StoreOp::ListRecords);
        assert!(store.list_records(OrderBy::CreatedAtDesc, 5).await.is_err());

        store.recover(StoreOp::ListRecords);
        assert!(store.list_records(OrderBy::CreatedAtDesc, 5).await.is_ok());
        assert_eq!(store.calls(StoreOp::ListRecords), 2);
    }

    #[tokio::test]
    async fn test_gated_create_applies_then_holds_response() {
        let store = MemoryStore::gated();
        let mark = SavedMark::new("alice", "job-1");
        let answered = std::sync::atomic::AtomicBool::new(false);

        let (created, _) = tokio::join!(
            async {
                let created = store.create_saved_mark(mark.clone()).await;
                answered.store(true, std::sync::atomic::Ordering::SeqCst);
                created
            },
            async {
                while store.calls(StoreOp::CreateSavedMark) == 0 {
                    tokio::task::yield_now().await;
                }
                assert_eq!(store.saved_marks().len(), 1);
                assert!(!answered.load(std::sync::atomic::Ordering::SeqCst));
                store.release(1);
            }
        );

        assert_eq!(created.unwrap().id, mark.id);
        assert!(answered.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_gated_failure_is_held_too() {
        let store = MemoryStore::gated();
        store.fail_on(StoreOp::DeleteSavedMark);
        store.release(1);
        let err = store.delete_saved_mark("m-1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "records": [{{
                    "id": "job-1",
                    "title": "Seeded",
                    "tags": "[\"a\",\"b\"]",
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z"
                }}],
                "saved_marks": [{{
                    "id": "m-1",
                    "user_id": "alice",
                    "record_id": "job-1",
                    "created_at": "2024-01-02T00:00:00Z"
                }}]
            }}"#
        )
        .unwrap();

        let store = MemoryStore::load_seed_file(file.path()).await.unwrap();
        let records = store.list_records(OrderBy::CreatedAtDesc, 10).await.unwrap();
        assert_eq!(records[0].tags, vec!["a", "b"]);
        assert_eq!(store.list_saved_marks("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_seed_file_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = MemoryStore::load_seed_file(file.path()).await.err().unwrap();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
