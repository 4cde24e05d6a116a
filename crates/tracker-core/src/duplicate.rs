//! Duplicate and conflict checks run before a client submits an entry.
//!
//! Three checks run independently over the same request: an exact match on
//! any contact channel, an exact company match, and the company keyword
//! screener. None short-circuits another.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{resolve_entry_id, Status};
use crate::screener::KeywordScreener;
use crate::store::{ContactProbe, EntryStore};

/// Query parameters of a duplicate check. Any combination may be given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DuplicateCheckRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    /// Entry to ignore, typically the one being edited.
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactDetails {
    pub company: String,
    pub member_name: String,
    pub status: Status,
    pub entry_date: String,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateContact {
    pub exists: bool,
    pub details: Option<ContactDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetails {
    pub member_name: String,
    pub status: Status,
    pub entry_date: String,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyExists {
    pub exists: bool,
    pub count: u64,
    pub details: Option<CompanyDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub duplicate_contact: DuplicateContact,
    pub company_exists: CompanyExists,
    pub is_financial: bool,
    pub blocked_keywords: Vec<String>,
}

/// Run all three checks for `req`.
pub async fn check_duplicates<S>(
    store: &S,
    screener: &KeywordScreener,
    req: &DuplicateCheckRequest,
) -> Result<DuplicateReport>
where
    S: EntryStore + ?Sized,
{
    let probe = ContactProbe {
        email: trimmed(&req.email),
        phone: trimmed(&req.phone),
        linkedin: trimmed(&req.linkedin),
    };
    let company = trimmed(&req.company);
    let exclude_id = trimmed(&req.exclude_id).map(|id| resolve_entry_id(&id));
    let exclude_id = exclude_id.as_deref();

    let mut report = DuplicateReport::default();

    if !probe.is_empty() {
        if let Some(found) = store.find_by_contact(&probe, exclude_id).await? {
            report.duplicate_contact = DuplicateContact {
                exists: true,
                details: Some(ContactDetails {
                    company: found.company,
                    member_name: found.member_name,
                    status: found.status,
                    entry_date: found.entry_date,
                    contact_person: found.contact_person,
                }),
            };
        }
    }

    if let Some(company) = company.as_deref() {
        let matches = store.find_by_company(company, exclude_id).await?;
        report.company_exists = CompanyExists {
            exists: matches.count > 0,
            count: matches.count,
            details: matches.first.map(|found| CompanyDetails {
                member_name: found.member_name,
                status: found.status,
                entry_date: found.entry_date,
                contact_person: found.contact_person,
            }),
        };

        report.blocked_keywords = screener.company_matches(Some(company));
        report.is_financial = !report.blocked_keywords.is_empty();
    }

    Ok(report)
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
