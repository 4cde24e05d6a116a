//! Core data models used throughout Outreach Tracker.
//!
//! An [`Entry`] is one outreach record: a club member contacting a company.
//! Clubs and statuses are closed sets, so they are modelled as enums that
//! serialize to the exact display strings clients send and receive.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a string is not one of the fixed club or status values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must be one of: {allowed}")]
pub struct UnknownVariant {
    kind: &'static str,
    allowed: String,
}

/// The five clubs an entry can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Club {
    #[serde(rename = "The Big O")]
    TheBigO,
    #[serde(rename = "Nature Watch")]
    NatureWatch,
    #[serde(rename = "8x8")]
    EightByEight,
    #[serde(rename = "Acharya Gaming Club")]
    AcharyaGamingClub,
    #[serde(rename = "Others")]
    Others,
}

impl Club {
    pub const ALL: [Club; 5] = [
        Club::TheBigO,
        Club::NatureWatch,
        Club::EightByEight,
        Club::AcharyaGamingClub,
        Club::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Club::TheBigO => "The Big O",
            Club::NatureWatch => "Nature Watch",
            Club::EightByEight => "8x8",
            Club::AcharyaGamingClub => "Acharya Gaming Club",
            Club::Others => "Others",
        }
    }
}

impl fmt::Display for Club {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Club {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Club::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "Club",
                allowed: join_all(Club::ALL.iter().map(Club::as_str)),
            })
    }
}

/// Outreach progress for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    #[serde(rename = "Yet to contact")]
    YetToContact,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Requested on LinkedIn")]
    RequestedOnLinkedIn,
    #[serde(rename = "Requested on mail")]
    RequestedOnMail,
    #[serde(rename = "Others")]
    Others,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::YetToContact,
        Status::InProgress,
        Status::Rejected,
        Status::RequestedOnLinkedIn,
        Status::RequestedOnMail,
        Status::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::YetToContact => "Yet to contact",
            Status::InProgress => "In progress",
            Status::Rejected => "Rejected",
            Status::RequestedOnLinkedIn => "Requested on LinkedIn",
            Status::RequestedOnMail => "Requested on mail",
            Status::Others => "Others",
        }
    }

    /// Statuses that count toward a club's success rate.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Status::InProgress | Status::RequestedOnLinkedIn | Status::RequestedOnMail
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "Status",
                allowed: join_all(Status::ALL.iter().map(Status::as_str)),
            })
    }
}

fn join_all<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(", ")
}

/// Validated entry fields supplied by a client, before the store assigns
/// an id and audit timestamps. Produced by [`crate::validate::validate_entry`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub member_name: String,
    pub club: Club,
    pub company: String,
    pub opportunity_type: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
    pub status: Status,
    pub status_notes: Option<String>,
    /// Business date in `YYYY-MM-DD` form.
    pub entry_date: String,
}

/// A persisted outreach record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub member_name: String,
    pub club: Club,
    pub company: String,
    pub opportunity_type: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
    pub status: Status,
    pub status_notes: Option<String>,
    pub entry_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Entry {
    /// Build a fresh record with a new id and both timestamps set to `now`.
    pub fn create(fields: NewEntry, now: &str) -> Self {
        Self::with_id(new_entry_id(), fields, now, now)
    }

    pub fn with_id(id: String, fields: NewEntry, created_at: &str, updated_at: &str) -> Self {
        Self {
            id,
            member_name: fields.member_name,
            club: fields.club,
            company: fields.company,
            opportunity_type: fields.opportunity_type,
            contact_person: fields.contact_person,
            email: fields.email,
            linkedin: fields.linkedin,
            phone: fields.phone,
            status: fields.status,
            status_notes: fields.status_notes,
            entry_date: fields.entry_date,
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
        }
    }

    /// Full replace: every client field is overwritten, `id` and
    /// `created_at` are kept.
    pub fn replace(&self, fields: NewEntry, now: &str) -> Self {
        Self::with_id(self.id.clone(), fields, &self.created_at, now)
    }

    /// Status-only patch.
    pub fn apply_status(&mut self, update: &StatusUpdate, now: &str) {
        self.status = update.status;
        if let NotesUpdate::Set(notes) = &update.notes {
            self.status_notes = notes.clone();
        }
        self.updated_at = now.to_string();
    }
}

/// What a status patch does to the stored notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesUpdate {
    /// Notes were not supplied; leave them as stored.
    Keep,
    /// Overwrite the notes (`None` clears them).
    Set(Option<String>),
}

/// A validated status-only update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: Status,
    pub notes: NotesUpdate,
}

/// Generate a new store identifier.
pub fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

/// Resolve a client-supplied identifier to its stored form.
///
/// Any UUID spelling (braced, simple, upper-case) is normalized to the
/// canonical hyphenated lowercase form; anything else is used verbatim.
pub fn resolve_entry_id(raw: &str) -> String {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => id.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Current UTC time as an ISO 8601 string, used for audit timestamps.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
