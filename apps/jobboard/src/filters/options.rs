use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::record::Record;

/// Choice lists for the exact-match filter controls.
/// Built from the records currently loaded, never from a global catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub employment_types: Vec<String>,
    pub experience_levels: Vec<String>,
}

pub fn filter_options(records: &[Record]) -> FilterOptions {
    FilterOptions {
        locations: distinct_sorted(records.iter().map(|r| r.location.as_str())),
        employment_types: distinct_sorted(records.iter().map(|r| r.employment_type.as_str())),
        experience_levels: distinct_sorted(records.iter().map(|r| r.experience_level.as_str())),
    }
}

// Empty values are skipped: an empty predicate already means "all".
fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
