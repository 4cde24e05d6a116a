//! Entry write and lookup operations.
//!
//! These functions sit between the HTTP handlers and an [`EntryStore`]:
//! they validate, screen, stamp timestamps, and resolve identifiers, and
//! report failures as an [`EntryError`] the caller maps to a response.

use thiserror::Error;

use crate::models::{now_iso, resolve_entry_id, Entry};
use crate::screener::{KeywordScreener, ScreenedField};
use crate::store::EntryStore;
use crate::validate::{validate_entry, validate_status_update, EntryInput, ValidationError};

#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{}: {}", .field.rejection_message(), .keywords.join(", "))]
    Blocked {
        field: ScreenedField,
        keywords: Vec<String>,
    },

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type EntryResult<T> = Result<T, EntryError>;

/// Validate, screen, and insert a new entry.
pub async fn create_entry<S>(
    store: &S,
    screener: &KeywordScreener,
    input: &EntryInput,
) -> EntryResult<Entry>
where
    S: EntryStore + ?Sized,
{
    let fields = validate_entry(input)?;
    screen(screener, &fields.company, fields.opportunity_type.as_deref())?;

    let entry = Entry::create(fields, &now_iso());
    store.insert_entry(&entry).await?;
    log::info!("created entry {} for {}", entry.id, entry.company);
    Ok(entry)
}

pub async fn get_entry<S>(store: &S, raw_id: &str) -> EntryResult<Entry>
where
    S: EntryStore + ?Sized,
{
    let id = resolve_entry_id(raw_id);
    store
        .get_entry(&id)
        .await?
        .ok_or(EntryError::NotFound(id))
}

/// Full replace. Validation and screening run before the store is touched.
pub async fn replace_entry<S>(
    store: &S,
    screener: &KeywordScreener,
    raw_id: &str,
    input: &EntryInput,
) -> EntryResult<Entry>
where
    S: EntryStore + ?Sized,
{
    let fields = validate_entry(input)?;
    screen(screener, &fields.company, fields.opportunity_type.as_deref())?;

    let id = resolve_entry_id(raw_id);
    store
        .replace_entry(&id, fields, &now_iso())
        .await?
        .ok_or(EntryError::NotFound(id))
}

/// Status-only patch. `status_notes` of `None` keeps the stored notes.
pub async fn update_status<S>(
    store: &S,
    raw_id: &str,
    status: &str,
    status_notes: Option<&str>,
) -> EntryResult<Entry>
where
    S: EntryStore + ?Sized,
{
    let update = validate_status_update(status, status_notes)?;
    let id = resolve_entry_id(raw_id);
    store
        .update_status(&id, &update, &now_iso())
        .await?
        .ok_or(EntryError::NotFound(id))
}

pub async fn delete_entry<S>(store: &S, raw_id: &str) -> EntryResult<()>
where
    S: EntryStore + ?Sized,
{
    let id = resolve_entry_id(raw_id);
    if store.delete_entry(&id).await? {
        log::info!("deleted entry {}", id);
        Ok(())
    } else {
        Err(EntryError::NotFound(id))
    }
}

fn screen(
    screener: &KeywordScreener,
    company: &str,
    opportunity_type: Option<&str>,
) -> EntryResult<()> {
    match screener.screen_entry(company, opportunity_type) {
        Some((field, keywords)) => Err(EntryError::Blocked { field, keywords }),
        None => Ok(()),
    }
}
