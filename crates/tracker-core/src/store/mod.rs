//! Storage abstraction for Outreach Tracker.
//!
//! The [`EntryStore`] trait defines every operation the entry API, the
//! duplicate checker, and the statistics engine need, enabling pluggable
//! backends (SQLite in production, in-memory for tests and embedding).
//!
//! Each write is atomic on its own. Reads are not snapshot-isolated from one
//! another: a statistics report issues several reads and may observe
//! concurrent writes between them.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::filter::{EntryFilter, EntryQuery};
use crate::models::{Entry, NewEntry, StatusUpdate};

/// Free-text columns offered for autocomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestField {
    Company,
    ContactPerson,
}

impl SuggestField {
    pub fn column(&self) -> &'static str {
        match self {
            SuggestField::Company => "company",
            SuggestField::ContactPerson => "contact_person",
        }
    }

    pub fn value<'a>(&self, entry: &'a Entry) -> Option<&'a str> {
        match self {
            SuggestField::Company => Some(entry.company.as_str()),
            SuggestField::ContactPerson => entry.contact_person.as_deref(),
        }
    }
}

/// Contact channels to look up during a duplicate check. Blank values have
/// already been removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactProbe {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

impl ContactProbe {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.linkedin.is_none()
    }

    /// True when any probed channel equals the entry's value exactly.
    pub fn matches(&self, entry: &Entry) -> bool {
        fn same(probe: &Option<String>, stored: &Option<String>) -> bool {
            matches!((probe, stored), (Some(p), Some(s)) if p == s)
        }
        same(&self.email, &entry.email)
            || same(&self.phone, &entry.phone)
            || same(&self.linkedin, &entry.linkedin)
    }
}

/// Exact-company lookup result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyMatches {
    pub count: u64,
    /// One matching entry, if any.
    pub first: Option<Entry>,
}

/// Abstract storage backend for entries.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_entry`](EntryStore::insert_entry) | Persist a new entry |
/// | [`get_entry`](EntryStore::get_entry) | Fetch one entry by id |
/// | [`replace_entry`](EntryStore::replace_entry) | Full replace, keeping id and `created_at` |
/// | [`update_status`](EntryStore::update_status) | Status-only patch |
/// | [`delete_entry`](EntryStore::delete_entry) | Remove one entry |
/// | [`list_entries`](EntryStore::list_entries) | Listing query, newest first |
/// | [`find_entries`](EntryStore::find_entries) | Base-filtered set in store order |
/// | [`count_entries`](EntryStore::count_entries) | Cardinality of a filtered set |
/// | [`suggest_values`](EntryStore::suggest_values) | Distinct prefix matches |
/// | [`find_by_contact`](EntryStore::find_by_contact) | Any-channel contact match |
/// | [`find_by_company`](EntryStore::find_by_company) | Exact company match |
///
/// Ids passed in are already resolved with
/// [`resolve_entry_id`](crate::models::resolve_entry_id).
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn insert_entry(&self, entry: &Entry) -> Result<()>;

    async fn get_entry(&self, id: &str) -> Result<Option<Entry>>;

    /// Returns `None` when no entry has this id.
    async fn replace_entry(&self, id: &str, fields: NewEntry, now: &str) -> Result<Option<Entry>>;

    /// Returns `None` when no entry has this id.
    async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
        now: &str,
    ) -> Result<Option<Entry>>;

    /// Returns `false` when no entry has this id.
    async fn delete_entry(&self, id: &str) -> Result<bool>;

    /// Entries matching `query`, sorted by `created_at` descending.
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>>;

    /// Entries matching `filter` in the store's natural (insertion) order.
    async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>>;

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64>;

    /// Up to `limit` distinct non-null values of `field` starting with
    /// `prefix` (case-insensitive), sorted ascending.
    async fn suggest_values(
        &self,
        field: SuggestField,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>>;

    /// First entry whose email, phone, or linkedin equals a probed value.
    async fn find_by_contact(
        &self,
        probe: &ContactProbe,
        exclude_id: Option<&str>,
    ) -> Result<Option<Entry>>;

    /// Entries whose company equals `company` exactly.
    async fn find_by_company(
        &self,
        company: &str,
        exclude_id: Option<&str>,
    ) -> Result<CompanyMatches>;
}
