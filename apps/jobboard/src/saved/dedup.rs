use std::collections::HashSet;

use tracing::debug;

use crate::models::saved::SavedMark;

/// Narrows a fetched mark set to one mark per record for `user_id`.
/// Marks of other users are dropped; among duplicates the first seen wins.
pub fn dedupe_marks(user_id: &str, marks: Vec<SavedMark>) -> Vec<SavedMark> {
    let fetched = marks.len();
    let mut seen = HashSet::new();
    let kept: Vec<SavedMark> = marks
        .into_iter()
        .filter(|m| m.user_id == user_id)
        .filter(|m| seen.insert(m.record_id.clone()))
        .collect();

    if kept.len() != fetched {
        debug!(
            "Dropped {} duplicate or foreign saved marks for user {user_id}",
            fetched - kept.len()
        );
    }
    kept
}
