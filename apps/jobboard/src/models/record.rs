#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "USD";

/// A job posting as held in session memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Draft submitted by a signed-in user. The store assigns identity and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_currency: Option<String>,
    pub tags: Vec<String>,
}

impl NewRecord {
    pub fn into_record(self, id: String, owner: &str, now: DateTime<Utc>) -> Record {
        Record {
            id,
            user_id: owner.to_string(),
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            employment_type: self.employment_type,
            experience_level: self.experience_level,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency: currency_or_default(self.salary_currency),
            tags: self.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Flat transport form of a record. `tags` travels as a serialized JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub salary_currency: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RecordRow> for Record {
    fn from(row: RecordRow) -> Self {
        let tags = parse_tags(row.tags.as_deref());
        Record {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            employment_type: row.employment_type,
            experience_level: row.experience_level,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            salary_currency: currency_or_default(row.salary_currency),
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        RecordRow {
            id: record.id.clone(),
            user_id: record.user_id.clone(),
            title: record.title.clone(),
            company: record.company.clone(),
            location: record.location.clone(),
            description: record.description.clone(),
            employment_type: record.employment_type.clone(),
            experience_level: record.experience_level.clone(),
            salary_min: record.salary_min,
            salary_max: record.salary_max,
            salary_currency: Some(record.salary_currency.clone()),
            tags: Some(serialize_tags(&record.tags)),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Parses the serialized tag column. Anything that is not a JSON array of
/// strings reads as no tags.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

pub fn serialize_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn currency_or_default(currency: Option<String>) -> String {
    match currency {
        Some(c) if !c.trim().is_empty() => c,
        _ => DEFAULT_CURRENCY.to_string(),
    }
}
