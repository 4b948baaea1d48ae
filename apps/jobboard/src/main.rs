mod auth;
mod config;
mod errors;
mod filters;
mod models;
mod saved;
mod session;
mod store;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{AuthProvider, LocalAuth};
use crate::config::Config;
use crate::filters::FilterField;
use crate::models::user::AuthUser;
use crate::session::{Session, SessionOptions};
use crate::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job board v{}", env!("CARGO_PKG_VERSION"));

    let store = MemoryStore::load_seed_file(&config.seed_path)
        .await
        .with_context(|| format!("Failed to seed store from {}", config.seed_path.display()))?;
    let mut session = Session::new(Arc::new(store), SessionOptions::from(&config));

    // The provider is dropped once the user is signed in, which ends the stream.
    let auth_stream = {
        let auth = LocalAuth::new();
        let rx = auth.subscribe();
        auth.sign_in(AuthUser::new(config.user_id.clone(), config.user_email.clone()));
        rx
    };
    session.follow_auth(auth_stream).await;

    for field in FilterField::ALL {
        let value = config.initial_filters.get(field);
        if !value.is_empty() {
            session.set_filter(field, value);
        }
    }

    let options = session.filter_options();
    info!(
        "Filter choices: locations={:?} employment_types={:?} experience_levels={:?}",
        options.locations, options.employment_types, options.experience_levels
    );

    let visible = session.visible_records();
    info!(
        "{} of {} jobs match {} active filter(s)",
        visible.len(),
        session.records().len(),
        session.filters().active_count()
    );
    for record in &visible {
        let marker = if session.is_saved(&record.id) { "*" } else { " " };
        info!(
            "{marker} {} | {} | {} | {}",
            record.title, record.company, record.location, record.employment_type
        );
    }

    info!("{} saved job(s)", session.saved_records().len());

    Ok(())
}
