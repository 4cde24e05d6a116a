//! Statistics aggregation engine.
//!
//! Every pass is a pure function over a slice of entries, so each can be
//! tested against a fixed entry set. [`build_report`] fetches the inputs
//! from an [`EntryStore`] and runs the passes one after another.
//!
//! # Passes
//!
//! 1. Total count over the base filter.
//! 2. Recency counts: entries dated within the last 7 and 30 days.
//! 3. Status distribution, descending by count.
//! 4. Club distribution, descending by count.
//! 5. Member contributions per (member, club), top 20, with per-status counts.
//! 6. Top 15 companies.
//! 7. Daily timeline over the 30-day window, ascending by date.
//! 8. Contact-method coverage.
//! 9. Top 10 opportunity types (blank types excluded).
//! 10. Club performance: distinct members and companies, active count,
//!     success rate.
//!
//! Grouped passes keep first-seen order among equal counts (stable sort over
//! the store's iteration order).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::filter::EntryFilter;
use crate::models::{Club, Entry, Status};
use crate::store::EntryStore;

pub const TOP_MEMBERS: usize = 20;
pub const TOP_COMPANIES: usize = 15;
pub const TOP_OPPORTUNITY_TYPES: usize = 10;

pub const RECENT_WINDOW_DAYS: i64 = 7;
pub const MONTH_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_entries: u64,
    pub recent_entries_7days: u64,
    pub recent_entries_30days: u64,
    pub average_per_member: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClubCount {
    pub club: Club,
    pub count: u64,
}

/// Per-(member, club) totals. `Others` is only reflected in `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberContribution {
    pub member_name: String,
    pub club: Club,
    pub count: u64,
    pub yet_to_contact: u64,
    pub in_progress: u64,
    pub rejected: u64,
    pub requested_linkedin: u64,
    pub requested_mail: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyCount {
    pub company: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactMethods {
    pub email: u64,
    pub linkedin: u64,
    pub phone: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpportunityTypeCount {
    pub opportunity_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubPerformance {
    pub club: Club,
    pub total_entries: u64,
    pub unique_members_count: u64,
    pub unique_companies_count: u64,
    pub active_count: u64,
    /// Percentage of entries in an active status, in `[0, 100]`.
    pub success_rate: f64,
}

/// The full statistics response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub summary: Summary,
    pub status_distribution: Vec<StatusCount>,
    pub club_distribution: Vec<ClubCount>,
    pub member_contributions: Vec<MemberContribution>,
    pub top_companies: Vec<CompanyCount>,
    pub daily_timeline: Vec<DailyCount>,
    pub contact_methods: ContactMethods,
    pub opportunity_types: Vec<OpportunityTypeCount>,
    pub club_performance: Vec<ClubPerformance>,
}

/// Compute the report for `filter`, treating `today` as the current
/// calendar date for the recency windows.
///
/// Any failed read fails the whole report.
pub async fn build_report<S>(store: &S, filter: &EntryFilter, today: NaiveDate) -> Result<StatsReport>
where
    S: EntryStore + ?Sized,
{
    let week_filter = filter.since(&window_start(today, RECENT_WINDOW_DAYS));
    let month_filter = filter.since(&window_start(today, MONTH_WINDOW_DAYS));

    let total_entries = store.count_entries(filter).await?;
    let recent_entries_7days = store.count_entries(&week_filter).await?;
    let recent_entries_30days = store.count_entries(&month_filter).await?;

    let entries = store.find_entries(filter).await?;
    let month_entries = store.find_entries(&month_filter).await?;

    let member_contributions = member_contributions(&entries, TOP_MEMBERS);
    let average_per_member = average_per_member(&member_contributions);

    log::debug!(
        "stats computed over {} entries ({} in the 30-day window)",
        entries.len(),
        month_entries.len()
    );

    Ok(StatsReport {
        summary: Summary {
            total_entries,
            recent_entries_7days,
            recent_entries_30days,
            average_per_member,
        },
        status_distribution: status_distribution(&entries),
        club_distribution: club_distribution(&entries),
        member_contributions,
        top_companies: top_companies(&entries, TOP_COMPANIES),
        daily_timeline: daily_timeline(&month_entries),
        contact_methods: contact_methods(&entries),
        opportunity_types: opportunity_types(&entries, TOP_OPPORTUNITY_TYPES),
        club_performance: club_performance(&entries),
    })
}

/// First `entry_date` inside a window of `days` ending today.
pub fn window_start(today: NaiveDate, days: i64) -> String {
    (today - Duration::days(days)).format("%Y-%m-%d").to_string()
}

pub fn status_distribution(entries: &[Entry]) -> Vec<StatusCount> {
    count_by(entries, |e| Some(e.status))
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

pub fn club_distribution(entries: &[Entry]) -> Vec<ClubCount> {
    count_by(entries, |e| Some(e.club))
        .into_iter()
        .map(|(club, count)| ClubCount { club, count })
        .collect()
}

pub fn member_contributions(entries: &[Entry], limit: usize) -> Vec<MemberContribution> {
    let mut index: HashMap<(&str, Club), usize> = HashMap::new();
    let mut groups: Vec<MemberContribution> = Vec::new();

    for entry in entries {
        let key = (entry.member_name.as_str(), entry.club);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(MemberContribution {
                member_name: entry.member_name.clone(),
                club: entry.club,
                count: 0,
                yet_to_contact: 0,
                in_progress: 0,
                rejected: 0,
                requested_linkedin: 0,
                requested_mail: 0,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.count += 1;
        match entry.status {
            Status::YetToContact => group.yet_to_contact += 1,
            Status::InProgress => group.in_progress += 1,
            Status::Rejected => group.rejected += 1,
            Status::RequestedOnLinkedIn => group.requested_linkedin += 1,
            Status::RequestedOnMail => group.requested_mail += 1,
            Status::Others => {}
        }
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(limit);
    groups
}

pub fn top_companies(entries: &[Entry], limit: usize) -> Vec<CompanyCount> {
    let mut counts = count_by(entries, |e| Some(e.company.as_str()));
    counts.truncate(limit);
    counts
        .into_iter()
        .map(|(company, count)| CompanyCount {
            company: company.to_string(),
            count,
        })
        .collect()
}

/// Per-day counts, ascending by date. Callers pass the 30-day window set.
pub fn daily_timeline(entries: &[Entry]) -> Vec<DailyCount> {
    let mut days: BTreeMap<&str, u64> = BTreeMap::new();
    for entry in entries {
        *days.entry(entry.entry_date.as_str()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount {
            date: date.to_string(),
            count,
        })
        .collect()
}

pub fn contact_methods(entries: &[Entry]) -> ContactMethods {
    entries
        .iter()
        .fold(ContactMethods::default(), |mut acc, entry| {
            acc.email += u64::from(entry.email.is_some());
            acc.linkedin += u64::from(entry.linkedin.is_some());
            acc.phone += u64::from(entry.phone.is_some());
            acc
        })
}

pub fn opportunity_types(entries: &[Entry], limit: usize) -> Vec<OpportunityTypeCount> {
    let mut counts = count_by(entries, |e| {
        e.opportunity_type.as_deref().filter(|t| !t.is_empty())
    });
    counts.truncate(limit);
    counts
        .into_iter()
        .map(|(kind, count)| OpportunityTypeCount {
            opportunity_type: kind.to_string(),
            count,
        })
        .collect()
}

pub fn club_performance(entries: &[Entry]) -> Vec<ClubPerformance> {
    struct Acc<'a> {
        club: Club,
        total: u64,
        members: HashSet<&'a str>,
        companies: HashSet<&'a str>,
        active: u64,
    }

    let mut index: HashMap<Club, usize> = HashMap::new();
    let mut groups: Vec<Acc<'_>> = Vec::new();
    for entry in entries {
        let slot = *index.entry(entry.club).or_insert_with(|| {
            groups.push(Acc {
                club: entry.club,
                total: 0,
                members: HashSet::new(),
                companies: HashSet::new(),
                active: 0,
            });
            groups.len() - 1
        });
        let acc = &mut groups[slot];
        acc.total += 1;
        acc.members.insert(entry.member_name.as_str());
        acc.companies.insert(entry.company.as_str());
        acc.active += u64::from(entry.status.is_active());
    }

    let mut performance: Vec<ClubPerformance> = groups
        .into_iter()
        .map(|acc| ClubPerformance {
            club: acc.club,
            total_entries: acc.total,
            unique_members_count: acc.members.len() as u64,
            unique_companies_count: acc.companies.len() as u64,
            active_count: acc.active,
            success_rate: success_rate(acc.active, acc.total),
        })
        .collect();
    performance.sort_by(|a, b| b.total_entries.cmp(&a.total_entries));
    performance
}

/// `100 × active / total`, or 0 for an empty group.
pub fn success_rate(active: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        active as f64 * 100.0 / total as f64
    }
}

/// Mean entries per member group, rounded to two decimals.
pub fn average_per_member(groups: &[MemberContribution]) -> f64 {
    if groups.is_empty() {
        return 0.0;
    }
    let total: u64 = groups.iter().map(|g| g.count).sum();
    round2(total as f64 / groups.len() as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group by `key` (skipping `None`), count, and sort descending by count.
/// Equal counts keep first-seen order.
fn count_by<'a, K, F>(entries: &'a [Entry], key: F) -> Vec<(K, u64)>
where
    K: Eq + Hash + Copy,
    F: Fn(&'a Entry) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, u64)> = Vec::new();
    for entry in entries {
        let Some(k) = key(entry) else { continue };
        let slot = *index.entry(k).or_insert_with(|| {
            counts.push((k, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
