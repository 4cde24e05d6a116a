//! Request payload validation.
//!
//! [`validate_entry`] turns a raw [`EntryInput`] into a typed [`NewEntry`],
//! collecting every field error instead of stopping at the first one.
//! Validation runs before any store interaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Club, NewEntry, NotesUpdate, Status, StatusUpdate};

/// Entry payload as submitted by a client. Every field is optional here so
/// missing fields surface as validation errors rather than decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    pub member_name: Option<String>,
    pub club: Option<String>,
    pub company: Option<String>,
    pub opportunity_type: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub linkedin: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub status_notes: Option<String>,
    pub entry_date: Option<String>,
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Offending field, or `"entry"` for cross-field rules.
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summarize(.0))]
pub struct ValidationError(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Minimum number of digits a phone number must carry.
const MIN_PHONE_DIGITS: usize = 7;

/// Validate and normalize an entry payload.
pub fn validate_entry(input: &EntryInput) -> Result<NewEntry, ValidationError> {
    let mut errors = Vec::new();

    let member_name = required(&mut errors, "member_name", &input.member_name);
    let company = required(&mut errors, "company", &input.company);

    let club = match trimmed(&input.club) {
        None => {
            errors.push(FieldError::new("club", "field required"));
            None
        }
        Some(raw) => match raw.parse::<Club>() {
            Ok(club) => Some(club),
            Err(e) => {
                errors.push(FieldError::new("club", e.to_string()));
                None
            }
        },
    };

    let status = match trimmed(&input.status) {
        None => Some(Status::default()),
        Some(raw) => match raw.parse::<Status>() {
            Ok(status) => Some(status),
            Err(e) => {
                errors.push(FieldError::new("status", e.to_string()));
                None
            }
        },
    };

    let phone = trimmed(&input.phone);
    if let Some(phone) = &phone {
        if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            errors.push(FieldError::new(
                "phone",
                format!("Phone must contain at least {} digits", MIN_PHONE_DIGITS),
            ));
        }
    }

    let email = trimmed(&input.email);
    if let Some(email) = &email {
        if !looks_like_email(email) {
            errors.push(FieldError::new("email", "value is not a valid email address"));
        }
    }

    let entry_date = match trimmed(&input.entry_date) {
        None => {
            errors.push(FieldError::new("entry_date", "field required"));
            None
        }
        Some(raw) => {
            if NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_err() {
                errors.push(FieldError::new(
                    "entry_date",
                    "entry_date must be an ISO date (YYYY-MM-DD)",
                ));
            }
            Some(raw)
        }
    };

    let linkedin = trimmed(&input.linkedin);
    if email.is_none() && linkedin.is_none() && phone.is_none() {
        errors.push(FieldError::new(
            "entry",
            "At least one contact method (email, linkedin, phone) is required",
        ));
    }

    let status_notes = trimmed(&input.status_notes);
    if status == Some(Status::Others) && status_notes.is_none() {
        errors.push(FieldError::new(
            "status_notes",
            "Status notes are required when status is 'Others'",
        ));
    }

    if !errors.is_empty() {
        return Err(ValidationError(errors));
    }

    // Each `None` here has already recorded an error above.
    match (member_name, company, club, status, entry_date) {
        (Some(member_name), Some(company), Some(club), Some(status), Some(entry_date)) => {
            Ok(NewEntry {
                member_name,
                club,
                company,
                opportunity_type: trimmed(&input.opportunity_type),
                contact_person: trimmed(&input.contact_person),
                email,
                linkedin,
                phone,
                status,
                status_notes,
                entry_date,
            })
        }
        _ => Err(ValidationError(vec![FieldError::new(
            "entry",
            "incomplete entry",
        )])),
    }
}

/// Validate the parameters of a status-only patch.
///
/// `status_notes` of `None` leaves stored notes untouched; an empty string
/// clears them unless the new status is `Others`, which requires notes.
pub fn validate_status_update(
    status: &str,
    status_notes: Option<&str>,
) -> Result<StatusUpdate, ValidationError> {
    let status = status.trim().parse::<Status>().map_err(|_| {
        ValidationError(vec![FieldError::new("status", "Invalid status provided")])
    })?;

    let notes = status_notes.map(str::trim);
    if status == Status::Others {
        return match notes.filter(|n| !n.is_empty()) {
            Some(n) => Ok(StatusUpdate {
                status,
                notes: NotesUpdate::Set(Some(n.to_string())),
            }),
            None => Err(ValidationError(vec![FieldError::new(
                "status_notes",
                "Status notes required when status is 'Others'",
            )])),
        };
    }

    let notes = match notes {
        None => NotesUpdate::Keep,
        Some("") => NotesUpdate::Set(None),
        Some(n) => NotesUpdate::Set(Some(n.to_string())),
    };
    Ok(StatusUpdate { status, notes })
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>) -> Option<String> {
    let value = trimmed(value);
    if value.is_none() {
        errors.push(FieldError::new(field, "field required"));
    }
    value
}

fn looks_like_email(value: &str) -> bool {
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !value.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
