use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::filters::{FilterField, FilterState};
use crate::saved::LoadPolicy;

const DEFAULT_LIST_LIMIT: usize = 100;

/// Board configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub seed_path: PathBuf,
    pub user_id: String,
    pub user_email: String,
    /// Passed to the store as the record list limit.
    pub list_limit: usize,
    pub load_policy: LoadPolicy,
    /// Filters applied right after sign-in.
    pub initial_filters: FilterState,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed_path: PathBuf::new(),
            user_id: "demo-user".to_string(),
            user_email: "demo@example.com".to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
            load_policy: LoadPolicy::default(),
            initial_filters: FilterState::default(),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let seed_path = lookup("JOBBOARD_SEED_PATH")
            .map(PathBuf::from)
            .context("Required environment variable 'JOBBOARD_SEED_PATH' is not set")?;

        let list_limit = match lookup("JOBBOARD_LIST_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .context("JOBBOARD_LIST_LIMIT must be a non-negative integer")?,
            None => defaults.list_limit,
        };

        let load_policy = match lookup("JOBBOARD_LOAD_POLICY") {
            Some(raw) => raw.parse::<LoadPolicy>().with_context(|| {
                format!(
                    "JOBBOARD_LOAD_POLICY must be 'last_writer_wins' or 'reject_stale', got '{raw}'"
                )
            })?,
            None => defaults.load_policy,
        };

        let mut initial_filters = FilterState::default();
        for (key, field) in [
            ("JOBBOARD_QUERY", FilterField::Query),
            ("JOBBOARD_LOCATION", FilterField::Location),
            ("JOBBOARD_EMPLOYMENT_TYPE", FilterField::EmploymentType),
            ("JOBBOARD_EXPERIENCE_LEVEL", FilterField::ExperienceLevel),
            ("JOBBOARD_MIN_SALARY", FilterField::MinSalary),
        ] {
            if let Some(value) = lookup(key) {
                initial_filters.set(field, value);
            }
        }

        Ok(Config {
            seed_path,
            user_id: lookup("JOBBOARD_USER_ID").unwrap_or(defaults.user_id),
            user_email: lookup("JOBBOARD_USER_EMAIL").unwrap_or(defaults.user_email),
            list_limit,
            load_policy,
            initial_filters,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}
