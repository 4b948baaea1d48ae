#![allow(dead_code)]

//! Save-State Reconciler — per-user bookmark state with optimistic toggles.
//!
//! Each (user, record) pair is either Unsaved or Saved. `toggle_save` flips the
//! local state first, then asks the store to persist the change, and undoes the
//! local flip if the store refuses. A second toggle issued while the first is
//! still in flight sees the optimistic state, so rapid double toggles alternate
//! instead of racing two creates. In-flight store calls are never cancelled.
//!
//! Every local mutation bumps a version counter. A bulk load remembers the
//! version it started at; `LoadPolicy` decides whether a snapshot fetched
//! while toggles happened still replaces local state.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::BoardError;
use crate::models::saved::{SaveEvent, SavedMark};
use crate::saved::dedup::dedupe_marks;
use crate::store::RecordStore;

/// What to do with a saved-set load that finishes after local toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// The load replaces local state regardless of toggles made meanwhile.
    #[default]
    LastWriterWins,
    /// A load that started before the latest local mutation is discarded.
    RejectStale,
}

impl FromStr for LoadPolicy {
    type Err = serde_json::Error;

    /// Accepts the same snake_case names the policy serializes to.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { marks: usize },
    Discarded,
}

/// Handed out by `begin_load`, redeemed by `finish_load`.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    user_id: String,
    version: u64,
}

impl LoadTicket {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Default)]
struct SavedState {
    user_id: Option<String>,
    marks: Vec<SavedMark>,
    version: u64,
}

impl SavedState {
    fn position(&self, user_id: &str, record_id: &str) -> Option<usize> {
        self.marks.iter().position(|m| m.is_for(user_id, record_id))
    }
}

enum Pending {
    Save(SavedMark),
    Unsave { index: usize, mark: SavedMark },
}

pub struct SaveReconciler {
    store: Arc<dyn RecordStore>,
    policy: LoadPolicy,
    state: Mutex<SavedState>,
}

impl SaveReconciler {
    pub fn new(store: Arc<dyn RecordStore>, policy: LoadPolicy) -> Self {
        Self {
            store,
            policy,
            state: Mutex::new(SavedState::default()),
        }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    pub fn user_id(&self) -> Option<String> {
        self.lock().user_id.clone()
    }

    /// Binds the reconciler to `user_id` with an empty saved set.
    pub fn attach(&self, user_id: &str) {
        let mut state = self.lock();
        state.user_id = Some(user_id.to_string());
        state.marks.clear();
        state.version += 1;
    }

    pub fn detach(&self) {
        let mut state = self.lock();
        state.user_id = None;
        state.marks.clear();
        state.version += 1;
    }

    pub fn is_saved(&self, record_id: &str) -> bool {
        let state = self.lock();
        match &state.user_id {
            Some(user_id) => state.position(user_id, record_id).is_some(),
            None => false,
        }
    }

    /// Record ids the current user has saved, in the order the marks were added.
    pub fn saved_record_ids(&self) -> Vec<String> {
        self.lock()
            .marks
            .iter()
            .map(|m| m.record_id.clone())
            .collect()
    }

    pub fn saved_count(&self) -> usize {
        self.lock().marks.len()
    }

    pub fn mark_for(&self, record_id: &str) -> Option<SavedMark> {
        let state = self.lock();
        let user_id = state.user_id.as_deref()?;
        state
            .position(user_id, record_id)
            .map(|i| state.marks[i].clone())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Bulk load
    // ────────────────────────────────────────────────────────────────────────

    /// Fetches the current user's saved set and replaces the local snapshot,
    /// subject to the load policy.
    pub async fn load(&self) -> Result<LoadOutcome, BoardError> {
        let ticket = self.begin_load().ok_or(BoardError::NotAuthenticated)?;
        let marks = self
            .store
            .list_saved_marks(ticket.user_id())
            .await
            .map_err(BoardError::LoadFailed)?;
        Ok(self.finish_load(ticket, marks))
    }

    pub fn begin_load(&self) -> Option<LoadTicket> {
        let state = self.lock();
        let user_id = state.user_id.clone()?;
        Some(LoadTicket {
            user_id,
            version: state.version,
        })
    }

    /// Replaces the local snapshot wholesale. A snapshot fetched for a user who
    /// is no longer signed in is always dropped.
    pub fn finish_load(&self, ticket: LoadTicket, marks: Vec<SavedMark>) -> LoadOutcome {
        let mut state = self.lock();

        if state.user_id.as_deref() != Some(ticket.user_id.as_str()) {
            debug!("Dropping saved-set load for signed-out user {}", ticket.user_id);
            return LoadOutcome::Discarded;
        }

        if state.version != ticket.version {
            match self.policy {
                LoadPolicy::RejectStale => {
                    warn!(
                        "Discarding stale saved-set load for user {} (started at v{}, now v{})",
                        ticket.user_id, ticket.version, state.version
                    );
                    return LoadOutcome::Discarded;
                }
                LoadPolicy::LastWriterWins => {
                    warn!(
                        "Saved-set load for user {} overwrites {} local change(s)",
                        ticket.user_id,
                        state.version - ticket.version
                    );
                }
            }
        }

        state.marks = dedupe_marks(&ticket.user_id, marks);
        state.version += 1;
        let count = state.marks.len();
        info!("Loaded {count} saved records for user {}", ticket.user_id);
        LoadOutcome::Applied { marks: count }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Toggle
    // ────────────────────────────────────────────────────────────────────────

    pub async fn toggle_save(&self, record_id: &str) -> Result<SaveEvent, BoardError> {
        let pending = {
            let mut state = self.lock();
            let Some(user_id) = state.user_id.clone() else {
                warn!("Rejected save toggle for {record_id}: no signed-in user");
                return Err(BoardError::NotAuthenticated);
            };
            state.version += 1;

            match state.position(&user_id, record_id) {
                Some(index) => Pending::Unsave {
                    index,
                    mark: state.marks.remove(index),
                },
                None => {
                    let mark = SavedMark::new(&user_id, record_id);
                    state.marks.push(mark.clone());
                    Pending::Save(mark)
                }
            }
        };

        match pending {
            Pending::Save(mark) => self.confirm_save(mark).await,
            Pending::Unsave { index, mark } => self.confirm_unsave(index, mark).await,
        }
    }

    async fn confirm_save(&self, provisional: SavedMark) -> Result<SaveEvent, BoardError> {
        debug!("Saving record {} as {}", provisional.record_id, provisional.id);

        match self.store.create_saved_mark(provisional.clone()).await {
            Ok(confirmed) => {
                let mut state = self.lock();
                // Absent if the pair was toggled off or the user signed out meanwhile.
                if let Some(slot) = state.marks.iter_mut().find(|m| m.id == provisional.id) {
                    *slot = confirmed.clone();
                }
                info!("Saved record {}", confirmed.record_id);
                Ok(SaveEvent::Saved { mark: confirmed })
            }
            Err(source) => {
                let mut state = self.lock();
                let before = state.marks.len();
                state.marks.retain(|m| m.id != provisional.id);
                if state.marks.len() != before {
                    state.version += 1;
                }
                warn!(
                    "Rolled back save of record {}: {source}",
                    provisional.record_id
                );
                Err(BoardError::SaveFailed {
                    record_id: provisional.record_id,
                    source,
                })
            }
        }
    }

    async fn confirm_unsave(&self, index: usize, mark: SavedMark) -> Result<SaveEvent, BoardError> {
        debug!("Unsaving record {} ({})", mark.record_id, mark.id);

        match self.store.delete_saved_mark(&mark.id).await {
            Ok(()) => {
                info!("Unsaved record {}", mark.record_id);
                Ok(SaveEvent::Unsaved {
                    record_id: mark.record_id,
                    mark_id: mark.id,
                })
            }
            Err(source) => {
                let mut state = self.lock();
                let same_user = state.user_id.as_deref() == Some(mark.user_id.as_str());
                if same_user && state.position(&mark.user_id, &mark.record_id).is_none() {
                    let at = index.min(state.marks.len());
                    state.marks.insert(at, mark.clone());
                    state.version += 1;
                }
                warn!("Restored saved record {}: {source}", mark.record_id);
                Err(BoardError::UnsaveFailed {
                    record_id: mark.record_id,
                    source,
                })
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SavedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
