//! In-memory [`EntryStore`] implementation for tests and embedding.
//!
//! Entries live in a `Vec` behind `std::sync::RwLock`, so insertion order is
//! the store's natural iteration order.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::filter::{EntryFilter, EntryQuery};
use crate::models::{Entry, NewEntry, StatusUpdate};
use crate::suggest::prefix_matches;

use super::{CompanyMatches, ContactProbe, EntryStore, SuggestField};

/// In-memory entry collection.
pub struct InMemoryStore {
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Build a store pre-populated with `entries`, in order.
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Entry>>> {
        self.entries
            .read()
            .map_err(|_| anyhow!("entry store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Entry>>> {
        self.entries
            .write()
            .map_err(|_| anyhow!("entry store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_excluded(entry: &Entry, exclude_id: Option<&str>) -> bool {
    exclude_id.map_or(true, |id| entry.id != id)
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn insert_entry(&self, entry: &Entry) -> Result<()> {
        let mut entries = self.write()?;
        if entries.iter().any(|e| e.id == entry.id) {
            anyhow::bail!("duplicate entry id: {}", entry.id);
        }
        entries.push(entry.clone());
        Ok(())
    }

    async fn get_entry(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.read()?.iter().find(|e| e.id == id).cloned())
    }

    async fn replace_entry(&self, id: &str, fields: NewEntry, now: &str) -> Result<Option<Entry>> {
        let mut entries = self.write()?;
        let Some(slot) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        *slot = slot.replace(fields, now);
        Ok(Some(slot.clone()))
    }

    async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
        now: &str,
    ) -> Result<Option<Entry>> {
        let mut entries = self.write()?;
        let Some(slot) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        slot.apply_status(update, now);
        Ok(Some(slot.clone()))
    }

    async fn delete_entry(&self, id: &str) -> Result<bool> {
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
        let mut found: Vec<Entry> = self
            .read()?
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        Ok(self
            .read()?
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64> {
        Ok(self.read()?.iter().filter(|e| filter.matches(e)).count() as u64)
    }

    async fn suggest_values(
        &self,
        field: SuggestField,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let entries = self.read()?;
        Ok(prefix_matches(
            entries.iter().filter_map(|e| field.value(e)),
            prefix,
            limit,
        ))
    }

    async fn find_by_contact(
        &self,
        probe: &ContactProbe,
        exclude_id: Option<&str>,
    ) -> Result<Option<Entry>> {
        if probe.is_empty() {
            return Ok(None);
        }
        Ok(self
            .read()?
            .iter()
            .find(|e| not_excluded(e, exclude_id) && probe.matches(e))
            .cloned())
    }

    async fn find_by_company(
        &self,
        company: &str,
        exclude_id: Option<&str>,
    ) -> Result<CompanyMatches> {
        let entries = self.read()?;
        let mut matching = entries
            .iter()
            .filter(|e| not_excluded(e, exclude_id) && e.company == company);
        let first = matching.next().cloned();
        let count = first.as_ref().map_or(0, |_| 1 + matching.count() as u64);
        Ok(CompanyMatches { count, first })
    }
}
