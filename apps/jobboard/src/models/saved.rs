#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's bookmark on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMark {
    pub id: String,
    pub user_id: String,
    pub record_id: String,
    pub created_at: DateTime<Utc>,
}

impl SavedMark {
    /// Builds a mark with a freshly generated provisional id.
    pub fn new(user_id: &str, record_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            record_id: record_id.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_for(&self, user_id: &str, record_id: &str) -> bool {
        self.user_id == user_id && self.record_id == record_id
    }
}

/// Outcome of a confirmed toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    Saved { mark: SavedMark },
    Unsaved { record_id: String, mark_id: String },
}

impl SaveEvent {
    pub fn record_id(&self) -> &str {
        match self {
            SaveEvent::Saved { mark } => &mark.record_id,
            SaveEvent::Unsaved { record_id, .. } => record_id,
        }
    }
}
