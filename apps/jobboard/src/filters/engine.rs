//! Filter state and the predicate composition over records.
//!
//! Every predicate is a string; an empty string means "match all". A record is
//! visible iff every non-empty predicate matches it.

use serde::{Deserialize, Serialize};

use crate::models::record::Record;

/// The filter controls a user can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Query,
    Location,
    EmploymentType,
    ExperienceLevel,
    MinSalary,
}

/// Current value of every filter control. Fields change only through `set`
/// and `clear`; there is no per-field reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    query: String,
    location: String,
    employment_type: String,
    experience_level: String,
    min_salary: String,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Query,
        FilterField::Location,
        FilterField::EmploymentType,
        FilterField::ExperienceLevel,
        FilterField::MinSalary,
    ];
}

impl FilterState {
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Query => self.query = value,
            FilterField::Location => self.location = value,
            FilterField::EmploymentType => self.employment_type = value,
            FilterField::ExperienceLevel => self.experience_level = value,
            FilterField::MinSalary => self.min_salary = value,
        }
    }

    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Query => &self.query,
            FilterField::Location => &self.location,
            FilterField::EmploymentType => &self.employment_type,
            FilterField::ExperienceLevel => &self.experience_level,
            FilterField::MinSalary => &self.min_salary,
        }
    }

    /// Resets every predicate at once.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn active_count(&self) -> usize {
        FilterField::ALL
            .iter()
            .filter(|f| !self.get(**f).is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn matches(&self, record: &Record) -> bool {
        matches_text(&self.query, record)
            && matches_exact(&self.location, &record.location)
            && matches_exact(&self.employment_type, &record.employment_type)
            && matches_exact(&self.experience_level, &record.experience_level)
            && matches_min_salary(&self.min_salary, record.salary_min)
    }
}

/// Returns the records passing every active predicate, in input order.
pub fn compute_visible<'a>(records: &'a [Record], filters: &FilterState) -> Vec<&'a Record> {
    records.iter().filter(|r| filters.matches(r)).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Predicates
// ────────────────────────────────────────────────────────────────────────────

fn matches_text(query: &str, record: &Record) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&record.title)
        || hit(&record.company)
        || hit(&record.description)
        || record.tags.iter().any(|t| hit(t))
}

fn matches_exact(wanted: &str, actual: &str) -> bool {
    wanted.is_empty() || wanted == actual
}

/// Only `salary_min` is consulted. A record advertising just a maximum fails
/// any non-empty threshold, and an unparsable threshold matches nothing.
fn matches_min_salary(threshold: &str, salary_min: Option<f64>) -> bool {
    let threshold = threshold.trim();
    if threshold.is_empty() {
        return true;
    }
    let Ok(threshold) = threshold.parse::<f64>() else {
        return false;
    };
    matches!(salary_min, Some(min) if min >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::NewRecord;
    use chrono::Utc;

    fn job(id: &str, draft: NewRecord) -> Record {
        draft.into_record(id.to_string(), "owner", Utc::now())
    }

    fn fixture() -> Vec<Record> {
        vec![
            job(
                "1",
                NewRecord {
                    title: "Frontend Engineer".into(),
                    company: "Pixel Labs".into(),
                    location: "Remote".into(),
                    description: "Build dashboards".into(),
                    employment_type: "Full-time".into(),
                    experience_level: "Mid".into(),
                    salary_min: Some(70000.0),
                    salary_max: Some(90000.0),
                    tags: vec!["React".into(), "TypeScript".into()],
                    ..Default::default()
                },
            ),
            job(
                "2",
                NewRecord {
                    title: "Data Analyst".into(),
                    company: "Numbers Inc".into(),
                    location: "London".into(),
                    description: "SQL and reporting".into(),
                    employment_type: "Contract".into(),
                    experience_level: "Junior".into(),
                    salary_min: None,
                    salary_max: Some(60000.0),
                    tags: vec!["SQL".into()],
                    ..Default::default()
                },
            ),
            job(
                "3",
                NewRecord {
                    title: "Platform Engineer".into(),
                    company: "Cloudworks".into(),
                    location: "Berlin".into(),
                    description: "Own the react-to-incident tooling".into(),
                    employment_type: "Full-time".into(),
                    experience_level: "Senior".into(),
                    salary_min: Some(50000.0),
                    salary_max: None,
                    tags: vec![],
                    ..Default::default()
                },
            ),
            job(
                "4",
                NewRecord {
                    title: "Support Specialist".into(),
                    company: "Helpful".into(),
                    location: "Remote".into(),
                    description: "Customer care".into(),
                    employment_type: "Part-time".into(),
                    experience_level: "Junior".into(),
                    ..Default::default()
                },
            ),
        ]
    }

    fn ids(visible: &[&Record]) -> Vec<String> {
        visible.iter().map(|r| r.id.clone()).collect()
    }

    fn all_ids(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_empty_filters_are_identity() {
        let records = fixture();
        let visible = compute_visible(&records, &FilterState::default());
        assert_eq!(ids(&visible), all_ids(&records));
    }

    #[test]
    fn test_empty_record_set_yields_empty() {
        let mut filters = FilterState::default();
        filters.set(FilterField::Query, "rust");
        assert!(compute_visible(&[], &filters).is_empty());
        assert!(compute_visible(&[], &FilterState::default()).is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive_against_tags() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::Query, "REACT");
        // "1" via tag, "3" via description
        assert_eq!(ids(&compute_visible(&records, &filters)), vec!["1", "3"]);
    }

    #[test]
    fn test_query_matches_title_and_company() {
        let records = fixture();
        let mut filters = FilterState::default();

        filters.set(FilterField::Query, "engineer");
        assert_eq!(ids(&compute_visible(&records, &filters)), vec!["1", "3"]);

        filters.set(FilterField::Query, "numbers");
        assert_eq!(ids(&compute_visible(&records, &filters)), vec!["2"]);
    }

    #[test]
    fn test_query_does_not_search_location() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::Query, "london");
        assert!(compute_visible(&records, &filters).is_empty());
    }

    #[test]
    fn test_exact_location_match() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::Location, "Remote");
        assert_eq!(ids(&compute_visible(&records, &filters)), vec!["1", "4"]);

        filters.set(FilterField::Location, "remote");
        assert!(compute_visible(&records, &filters).is_empty());
    }

    #[test]
    fn test_employment_and_experience_compose_with_and() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::EmploymentType, "Full-time");
        filters.set(FilterField::ExperienceLevel, "Senior");
        assert_eq!(ids(&compute_visible(&records, &filters)), vec!["3"]);
    }

    #[test]
    fn test_min_salary_excludes_max_only_record() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::MinSalary, "50000");
        let visible = ids(&compute_visible(&records, &filters));
        assert_eq!(visible, vec!["1", "3"]);
        assert!(!visible.contains(&"2".to_string()));
    }

    #[test]
    fn test_min_salary_boundary_is_inclusive() {
        assert!(matches_min_salary("50000", Some(50000.0)));
        assert!(!matches_min_salary("50001", Some(50000.0)));
        assert!(!matches_min_salary("1", None));
        assert!(matches_min_salary("", None));
    }

    #[test]
    fn test_unparsable_min_salary_matches_nothing() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::MinSalary, "lots");
        assert!(compute_visible(&records, &filters).is_empty());
    }

    #[test]
    fn test_adding_predicates_never_grows_result() {
        let records = fixture();
        let steps = [
            (FilterField::Query, "e"),
            (FilterField::EmploymentType, "Full-time"),
            (FilterField::MinSalary, "60000"),
            (FilterField::Location, "Remote"),
            (FilterField::ExperienceLevel, "Mid"),
        ];

        let mut filters = FilterState::default();
        let mut previous = compute_visible(&records, &filters).len();
        for (field, value) in steps {
            filters.set(field, value);
            let current = compute_visible(&records, &filters).len();
            assert!(current <= previous, "{field:?} grew the result");
            previous = current;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn test_clear_restores_identity() {
        let records = fixture();
        let mut filters = FilterState::default();
        filters.set(FilterField::Query, "zzz");
        filters.set(FilterField::Location, "Berlin");
        filters.set(FilterField::MinSalary, "1");
        assert!(compute_visible(&records, &filters).is_empty());
        assert_eq!(filters.active_count(), 3);

        filters.clear();
        assert!(filters.is_empty());
        assert_eq!(ids(&compute_visible(&records, &filters)), all_ids(&records));
    }

    #[test]
    fn test_visible_preserves_input_order() {
        let mut records = fixture();
        records.reverse();
        let mut filters = FilterState::default();
        filters.set(FilterField::Location, "Remote");
        assert_eq!(ids(&compute_visible(&records, &filters)), vec!["4", "1"]);
    }

    #[test]
    fn test_get_returns_what_set_stored() {
        let mut filters = FilterState::default();
        filters.set(FilterField::ExperienceLevel, "Senior");
        assert_eq!(filters.get(FilterField::ExperienceLevel), "Senior");
        assert_eq!(filters.get(FilterField::Query), "");
    }

    #[test]
    fn test_filter_field_serde_snake_case() {
        let field: FilterField = serde_json::from_str(r#""employment_type""#).unwrap();
        assert_eq!(field, FilterField::EmploymentType);
    }
}
