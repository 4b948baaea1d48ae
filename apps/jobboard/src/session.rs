#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::BoardError;
use crate::filters::{compute_visible, filter_options, FilterField, FilterOptions, FilterState};
use crate::models::record::{NewRecord, Record};
use crate::models::saved::SaveEvent;
use crate::models::user::{AuthState, AuthUser};
use crate::saved::{LoadPolicy, SaveReconciler};
use crate::store::{OrderBy, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub list_limit: usize,
    pub load_policy: LoadPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            list_limit: 100,
            load_policy: LoadPolicy::default(),
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            list_limit: config.list_limit,
            load_policy: config.load_policy,
        }
    }
}

/// The signed-in user's view of the board: who they are, which records are
/// loaded, which filters are active, and what they have saved.
///
/// Initialized on sign-in and torn down on sign-out. The visible list and the
/// filter choices are computed from the loaded records on every call.
pub struct Session {
    store: Arc<dyn RecordStore>,
    options: SessionOptions,
    user: Option<AuthUser>,
    records: Vec<Record>,
    filters: FilterState,
    saved: SaveReconciler,
}

impl Session {
    pub fn new(store: Arc<dyn RecordStore>, options: SessionOptions) -> Self {
        let saved = SaveReconciler::new(store.clone(), options.load_policy);
        Self {
            store,
            options,
            user: None,
            records: Vec::new(),
            filters: FilterState::default(),
            saved,
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    // ────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ────────────────────────────────────────────────────────────────────────

    /// Binds the session to `user` and loads records plus their saved set.
    /// Both loads are attempted; the first failure is returned.
    pub async fn sign_in(&mut self, user: AuthUser) -> Result<(), BoardError> {
        info!("Session: signing in {} ({})", user.email, user.id);
        self.saved.attach(&user.id);
        self.user = Some(user);

        let records = self.refresh_records().await;
        let saved = self.saved.load().await.map(|outcome| {
            debug!("Saved-set load outcome: {outcome:?}");
        });
        records?;
        saved
    }

    /// Keeps the loaded records readable; drops user, saved set and filters.
    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!("Session: signed out {}", user.email);
        }
        self.saved.detach();
        self.filters.clear();
    }

    pub async fn apply_auth_state(&mut self, state: AuthState) -> Result<(), BoardError> {
        if state.is_loading {
            debug!("Auth state loading; session unchanged");
            return Ok(());
        }
        match state.user {
            Some(user) if self.user.as_ref().map(|u| &u.id) == Some(&user.id) => Ok(()),
            Some(user) => self.sign_in(user).await,
            None => {
                if self.user.is_some() {
                    self.sign_out();
                }
                Ok(())
            }
        }
    }

    /// Applies every auth state the provider publishes until it goes away.
    pub async fn follow_auth(&mut self, mut rx: watch::Receiver<AuthState>) {
        loop {
            let state = rx.borrow_and_update().clone();
            if let Err(e) = self.apply_auth_state(state).await {
                let notice = e.notice();
                warn!("{}: {}", notice.code, notice.message);
            }
            if rx.changed().await.is_err() {
                debug!("Auth provider closed");
                break;
            }
        }
    }

    /// Reloads the record set. On failure the last loaded records stay.
    pub async fn refresh_records(&mut self) -> Result<(), BoardError> {
        let records = self
            .store
            .list_records(OrderBy::CreatedAtDesc, self.options.list_limit)
            .await
            .map_err(BoardError::LoadFailed)?;
        info!("Loaded {} records", records.len());
        self.records = records;
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Filtering
    // ────────────────────────────────────────────────────────────────────────

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.filters.set(field, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn visible_records(&self) -> Vec<&Record> {
        compute_visible(&self.records, &self.filters)
    }

    pub fn filter_options(&self) -> FilterOptions {
        filter_options(&self.records)
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Saving and posting
    // ────────────────────────────────────────────────────────────────────────

    pub fn is_saved(&self, record_id: &str) -> bool {
        self.saved.is_saved(record_id)
    }

    pub async fn toggle_save(&self, record_id: &str) -> Result<SaveEvent, BoardError> {
        self.saved.toggle_save(record_id).await
    }

    /// Loaded records the user has saved, in listing order.
    pub fn saved_records(&self) -> Vec<&Record> {
        let saved: HashSet<String> = self.saved.saved_record_ids().into_iter().collect();
        self.records
            .iter()
            .filter(|r| saved.contains(&r.id))
            .collect()
    }

    pub async fn post_record(&mut self, draft: NewRecord) -> Result<&Record, BoardError> {
        let Some(owner) = self.user.as_ref().map(|u| u.id.clone()) else {
            warn!("Rejected post: no signed-in user");
            return Err(BoardError::NotAuthenticated);
        };
        let record = self
            .store
            .create_record(&owner, draft)
            .await
            .map_err(BoardError::PostFailed)?;
        info!("Posted record {} ({})", record.id, record.title);
        self.records.insert(0, record);
        Ok(&self.records[0])
    }
}
