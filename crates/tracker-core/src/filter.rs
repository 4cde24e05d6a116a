//! Entry filters.
//!
//! [`EntryFilter`] is the base filter shared by every statistics pass:
//! optional exact club and member matches plus an inclusive `entry_date`
//! range. [`EntryQuery`] extends it with the extra criteria accepted by the
//! entry listing endpoint.
//!
//! Dates are compared as strings. This is only calendar-correct because
//! every stored `entry_date` is validated as `YYYY-MM-DD` on write; filter
//! bounds themselves are never parsed.

use serde::Deserialize;

use crate::models::Entry;

/// Club / member / date-range predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryFilter {
    pub club: Option<String>,
    pub member_name: Option<String>,
    /// Inclusive lower bound on `entry_date`.
    pub start_date: Option<String>,
    /// Inclusive upper bound on `entry_date`.
    pub end_date: Option<String>,
}

impl EntryFilter {
    /// Build the base filter from optional request parameters. Empty strings
    /// impose no constraint.
    pub fn new(
        club: Option<String>,
        member_name: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Self {
        Self {
            club: non_empty(club),
            member_name: non_empty(member_name),
            start_date: non_empty(start_date),
            end_date: non_empty(end_date),
        }
    }

    /// Drop empty-string parameters, as produced by `?club=&member_name=`.
    pub fn normalized(self) -> Self {
        Self::new(self.club, self.member_name, self.start_date, self.end_date)
    }

    /// Compose an additional lower bound. The tighter of the existing and the
    /// new bound wins; the upper bound and equality constraints are kept.
    pub fn since(&self, date: &str) -> Self {
        let start_date = match &self.start_date {
            Some(existing) if existing.as_str() >= date => existing.clone(),
            _ => date.to_string(),
        };
        Self {
            start_date: Some(start_date),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.club.is_none()
            && self.member_name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Evaluate the predicate against one entry.
    pub fn matches(&self, entry: &Entry) -> bool {
        if let Some(club) = &self.club {
            if entry.club.as_str() != club.as_str() {
                return false;
            }
        }
        if let Some(member) = &self.member_name {
            if &entry.member_name != member {
                return false;
            }
        }
        if let Some(start) = &self.start_date {
            if entry.entry_date.as_str() < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end_date {
            if entry.entry_date.as_str() > end.as_str() {
                return false;
            }
        }
        true
    }
}

/// Listing criteria: the base filter plus status, and case-insensitive
/// substring matches on company and opportunity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub filter: EntryFilter,
    pub status: Option<String>,
    pub company: Option<String>,
    pub opportunity_type: Option<String>,
}

impl EntryQuery {
    pub fn new(
        filter: EntryFilter,
        status: Option<String>,
        company: Option<String>,
        opportunity_type: Option<String>,
    ) -> Self {
        Self {
            filter: filter.normalized(),
            status: non_empty(status),
            company: non_empty(company),
            opportunity_type: non_empty(opportunity_type),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if !self.filter.matches(entry) {
            return false;
        }
        if let Some(status) = &self.status {
            if entry.status.as_str() != status.as_str() {
                return false;
            }
        }
        if let Some(company) = &self.company {
            if !contains_ignore_case(&entry.company, company) {
                return false;
            }
        }
        if let Some(kind) = &self.opportunity_type {
            match &entry.opportunity_type {
                Some(value) if contains_ignore_case(value, kind) => {}
                _ => return false,
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Club, Status};

    fn entry(club: Club, member: &str, date: &str) -> Entry {
        Entry {
            id: format!("{}-{}", member, date),
            member_name: member.to_string(),
            club,
            company: "Acme Robotics".to_string(),
            opportunity_type: Some("Internship".to_string()),
            contact_person: None,
            email: Some("hr@acme.io".to_string()),
            linkedin: None,
            phone: None,
            status: Status::InProgress,
            status_notes: None,
            entry_date: date.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EntryFilter::new(Some(String::new()), None, Some(String::new()), None);
        assert!(filter.is_empty());
        assert!(filter.matches(&entry(Club::NatureWatch, "Ravi", "2020-01-01")));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filter = EntryFilter::new(
            None,
            None,
            Some("2024-03-01".into()),
            Some("2024-03-31".into()),
        );
        assert!(filter.matches(&entry(Club::Others, "A", "2024-03-01")));
        assert!(filter.matches(&entry(Club::Others, "A", "2024-03-31")));
        assert!(!filter.matches(&entry(Club::Others, "A", "2024-02-29")));
        assert!(!filter.matches(&entry(Club::Others, "A", "2024-04-01")));
    }

    #[test]
    fn test_club_and_member_are_exact() {
        let filter = EntryFilter::new(Some("8x8".into()), Some("Ravi".into()), None, None);
        assert!(filter.matches(&entry(Club::EightByEight, "Ravi", "2024-01-01")));
        assert!(!filter.matches(&entry(Club::EightByEight, "ravi", "2024-01-01")));
        assert!(!filter.matches(&entry(Club::TheBigO, "Ravi", "2024-01-01")));
    }

    #[test]
    fn test_since_composes_with_existing_bounds() {
        let base = EntryFilter::new(
            Some("8x8".into()),
            None,
            Some("2024-05-20".into()),
            Some("2024-06-30".into()),
        );
        let later = base.since("2024-06-01");
        assert_eq!(later.start_date.as_deref(), Some("2024-06-01"));
        assert_eq!(later.end_date.as_deref(), Some("2024-06-30"));
        assert_eq!(later.club.as_deref(), Some("8x8"));

        let earlier = base.since("2024-01-01");
        assert_eq!(earlier.start_date.as_deref(), Some("2024-05-20"));
    }

    #[test]
    fn test_malformed_bounds_compare_as_strings() {
        let filter = EntryFilter::new(None, None, Some("2024".into()), None);
        assert!(filter.matches(&entry(Club::Others, "A", "2024-01-01")));
        assert!(!filter.matches(&entry(Club::Others, "A", "2023-12-31")));
    }

    #[test]
    fn test_query_substring_matches_ignore_case() {
        let query = EntryQuery::new(
            EntryFilter::default(),
            Some("In progress".into()),
            Some("acme".into()),
            Some("INTERN".into()),
        );
        assert!(query.matches(&entry(Club::Others, "A", "2024-01-01")));

        let query = EntryQuery::new(EntryFilter::default(), Some("Rejected".into()), None, None);
        assert!(!query.matches(&entry(Club::Others, "A", "2024-01-01")));
    }
}
