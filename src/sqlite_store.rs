//! SQLite-backed [`EntryStore`] implementation.
//!
//! Every operation maps to one or more statements against the `entries`
//! table created by [`crate::migrate`]. Read-modify-write operations run in
//! a transaction; insertion order is `rowid` order.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Arguments, Row, SqliteConnection, SqlitePool};

use tracker_core::filter::{EntryFilter, EntryQuery};
use tracker_core::models::{Club, Entry, NewEntry, Status, StatusUpdate};
use tracker_core::store::{CompanyMatches, ContactProbe, EntryStore, SuggestField};
use tracker_core::suggest::prefix_matches;

const COLUMNS: &str = "id, member_name, club, company, opportunity_type, contact_person, \
                       email, linkedin, phone, status, status_notes, entry_date, \
                       created_at, updated_at";

/// SQLite implementation of the [`EntryStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Accumulates `WHERE` clauses and their positional string binds.
#[derive(Default)]
struct Conditions {
    clauses: Vec<&'static str>,
    binds: Vec<String>,
}

impl Conditions {
    fn push(&mut self, clause: &'static str, value: &str) {
        self.clauses.push(clause);
        self.binds.push(value.to_string());
    }

    fn push_filter(&mut self, filter: &EntryFilter) {
        if let Some(club) = &filter.club {
            self.push("club = ?", club);
        }
        if let Some(member) = &filter.member_name {
            self.push("member_name = ?", member);
        }
        if let Some(start) = &filter.start_date {
            self.push("entry_date >= ?", start);
        }
        if let Some(end) = &filter.end_date {
            self.push("entry_date <= ?", end);
        }
    }

    /// Exact criteria only. Substring matches on company and opportunity
    /// type are applied in Rust with [`EntryQuery::matches`]; SQLite's
    /// `lower()` folds ASCII only.
    fn push_query(&mut self, query: &EntryQuery) {
        self.push_filter(&query.filter);
        if let Some(status) = &query.status {
            self.push("status = ?", status);
        }
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn arguments(&self) -> Result<SqliteArguments<'_>> {
        let mut args = SqliteArguments::default();
        for value in &self.binds {
            args.add(value.as_str())
                .map_err(|e| anyhow::anyhow!("Failed to bind query argument: {}", e))?;
        }
        Ok(args)
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
    let club: String = row.try_get("club")?;
    let status: String = row.try_get("status")?;
    Ok(Entry {
        id: row.try_get("id")?,
        member_name: row.try_get("member_name")?,
        club: club.parse::<Club>()?,
        company: row.try_get("company")?,
        opportunity_type: row.try_get("opportunity_type")?,
        contact_person: row.try_get("contact_person")?,
        email: row.try_get("email")?,
        linkedin: row.try_get("linkedin")?,
        phone: row.try_get("phone")?,
        status: status.parse::<Status>()?,
        status_notes: row.try_get("status_notes")?,
        entry_date: row.try_get("entry_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn select_entry(conn: &mut SqliteConnection, id: &str) -> Result<Option<Entry>> {
    let row = sqlx::query(&format!("SELECT {} FROM entries WHERE id = ?", COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(row_to_entry).transpose()
}

async fn write_entry(conn: &mut SqliteConnection, entry: &Entry) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE entries SET
            member_name = ?, club = ?, company = ?, opportunity_type = ?,
            contact_person = ?, email = ?, linkedin = ?, phone = ?,
            status = ?, status_notes = ?, entry_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&entry.member_name)
    .bind(entry.club.as_str())
    .bind(&entry.company)
    .bind(&entry.opportunity_type)
    .bind(&entry.contact_person)
    .bind(&entry.email)
    .bind(&entry.linkedin)
    .bind(&entry.phone)
    .bind(entry.status.as_str())
    .bind(&entry.status_notes)
    .bind(&entry.entry_date)
    .bind(&entry.updated_at)
    .bind(&entry.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn insert_entry(&self, entry: &Entry) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO entries ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))
        .bind(&entry.id)
        .bind(&entry.member_name)
        .bind(entry.club.as_str())
        .bind(&entry.company)
        .bind(&entry.opportunity_type)
        .bind(&entry.contact_person)
        .bind(&entry.email)
        .bind(&entry.linkedin)
        .bind(&entry.phone)
        .bind(entry.status.as_str())
        .bind(&entry.status_notes)
        .bind(&entry.entry_date)
        .bind(&entry.created_at)
        .bind(&entry.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_entry(&self, id: &str) -> Result<Option<Entry>> {
        let mut conn = self.pool.acquire().await?;
        select_entry(&mut *conn, id).await
    }

    async fn replace_entry(&self, id: &str, fields: NewEntry, now: &str) -> Result<Option<Entry>> {
        let mut tx = self.pool.begin().await?;
        let Some(existing) = select_entry(&mut *tx, id).await? else {
            return Ok(None);
        };
        let replaced = existing.replace(fields, now);
        write_entry(&mut *tx, &replaced).await?;
        tx.commit().await?;
        Ok(Some(replaced))
    }

    async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
        now: &str,
    ) -> Result<Option<Entry>> {
        let mut tx = self.pool.begin().await?;
        let Some(mut entry) = select_entry(&mut *tx, id).await? else {
            return Ok(None);
        };
        entry.apply_status(update, now);
        write_entry(&mut *tx, &entry).await?;
        tx.commit().await?;
        Ok(Some(entry))
    }

    async fn delete_entry(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>> {
        let mut conditions = Conditions::default();
        conditions.push_query(query);
        let sql = format!(
            "SELECT {} FROM entries{} ORDER BY created_at DESC, rowid ASC",
            COLUMNS,
            conditions.sql()
        );
        let rows = sqlx::query_with(&sql, conditions.arguments()?)
            .fetch_all(&self.pool)
            .await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let entry = row_to_entry(row)?;
            if query.matches(&entry) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    async fn find_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let mut conditions = Conditions::default();
        conditions.push_filter(filter);
        let sql = format!(
            "SELECT {} FROM entries{} ORDER BY rowid",
            COLUMNS,
            conditions.sql()
        );
        let rows = sqlx::query_with(&sql, conditions.arguments()?)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn count_entries(&self, filter: &EntryFilter) -> Result<u64> {
        let mut conditions = Conditions::default();
        conditions.push_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM entries{}", conditions.sql());
        let count: i64 = sqlx::query_scalar_with(&sql, conditions.arguments()?)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn suggest_values(
        &self,
        field: SuggestField,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {col} FROM entries WHERE {col} IS NOT NULL",
            col = field.column()
        );
        let values: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(prefix_matches(values.iter().map(String::as_str), prefix, limit))
    }

    async fn find_by_contact(
        &self,
        probe: &ContactProbe,
        exclude_id: Option<&str>,
    ) -> Result<Option<Entry>> {
        let mut channels = Vec::new();
        let mut conditions = Conditions::default();
        for (clause, value) in [
            ("email = ?", &probe.email),
            ("phone = ?", &probe.phone),
            ("linkedin = ?", &probe.linkedin),
        ] {
            if let Some(value) = value {
                channels.push(clause);
                conditions.binds.push(value.clone());
            }
        }
        if channels.is_empty() {
            return Ok(None);
        }

        let mut sql = format!(
            "SELECT {} FROM entries WHERE ({})",
            COLUMNS,
            channels.join(" OR ")
        );
        if let Some(id) = exclude_id {
            sql.push_str(" AND id != ?");
            conditions.binds.push(id.to_string());
        }
        sql.push_str(" ORDER BY rowid LIMIT 1");

        let row = sqlx::query_with(&sql, conditions.arguments()?)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_entry).transpose()
    }

    async fn find_by_company(
        &self,
        company: &str,
        exclude_id: Option<&str>,
    ) -> Result<CompanyMatches> {
        let mut conditions = Conditions::default();
        conditions.push("company = ?", company);
        if let Some(id) = exclude_id {
            conditions.push("id != ?", id);
        }
        let where_sql = conditions.sql();

        let count: i64 = sqlx::query_scalar_with(
            &format!("SELECT COUNT(*) FROM entries{}", where_sql),
            conditions.arguments()?,
        )
        .fetch_one(&self.pool)
        .await?;

        let first = if count > 0 {
            let row = sqlx::query_with(
                &format!(
                    "SELECT {} FROM entries{} ORDER BY rowid LIMIT 1",
                    COLUMNS, where_sql
                ),
                conditions.arguments()?,
            )
            .fetch_optional(&self.pool)
            .await?;
            row.as_ref().map(row_to_entry).transpose()?
        } else {
            None
        };

        Ok(CompanyMatches {
            count: count as u64,
            first,
        })
    }
}
