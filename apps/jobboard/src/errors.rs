#![allow(dead_code)]

use serde::Serialize;
use thiserror::Error;

/// Failures reported by a `RecordStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Board-level error taxonomy.
/// None of these are fatal; callers turn them into a `Notice` for the user.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Load failed: {0}")]
    LoadFailed(#[source] StoreError),

    #[error("Saving record {record_id} failed: {source}")]
    SaveFailed {
        record_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Removing saved record {record_id} failed: {source}")]
    UnsaveFailed {
        record_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Posting record failed: {0}")]
    PostFailed(#[source] StoreError),

    #[error("Not authenticated")]
    NotAuthenticated,
}

/// A user-visible notification derived from a `BoardError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: &'static str,
    pub message: String,
}

impl BoardError {
    pub fn notice(&self) -> Notice {
        let (code, message) = match self {
            BoardError::LoadFailed(e) => {
                tracing::error!("Load error: {e}");
                (
                    "LOAD_FAILED",
                    "Could not load listings. Showing the last loaded results.".to_string(),
                )
            }
            BoardError::SaveFailed { record_id, source } => {
                tracing::error!("Save error for {record_id}: {source}");
                ("SAVE_FAILED", "Could not save this job.".to_string())
            }
            BoardError::UnsaveFailed { record_id, source } => {
                tracing::error!("Unsave error for {record_id}: {source}");
                (
                    "UNSAVE_FAILED",
                    "Could not remove this job from your saved list.".to_string(),
                )
            }
            BoardError::PostFailed(e) => {
                tracing::error!("Post error: {e}");
                ("POST_FAILED", "Could not post this job.".to_string())
            }
            BoardError::NotAuthenticated => (
                "NOT_AUTHENTICATED",
                "Sign in to save or post jobs.".to_string(),
            ),
        };

        Notice { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authenticated_notice() {
        let notice = BoardError::NotAuthenticated.notice();
        assert_eq!(notice.code, "NOT_AUTHENTICATED");
        assert!(notice.message.contains("Sign in"));
    }

    #[test]
    fn test_save_failed_keeps_record_id_in_display() {
        let err = BoardError::SaveFailed {
            record_id: "job-7".to_string(),
            source: StoreError::Unavailable("timeout".to_string()),
        };
        assert!(err.to_string().contains("job-7"));
        assert!(err.to_string().contains("timeout"));
        assert_eq!(err.notice().code, "SAVE_FAILED");
    }

    #[test]
    fn test_load_failed_notice_mentions_last_results() {
        let err = BoardError::LoadFailed(StoreError::Unavailable("down".to_string()));
        let notice = err.notice();
        assert_eq!(notice.code, "LOAD_FAILED");
        assert!(notice.message.contains("last loaded"));
    }
}
