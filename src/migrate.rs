use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the database if needed and bring the schema up to date.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Idempotent schema setup on an open pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            member_name TEXT NOT NULL,
            club TEXT NOT NULL,
            company TEXT NOT NULL,
            opportunity_type TEXT,
            contact_person TEXT,
            email TEXT,
            linkedin TEXT,
            phone TEXT,
            status TEXT NOT NULL DEFAULT 'Yet to contact',
            status_notes TEXT,
            entry_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    for (name, column) in [
        ("idx_entries_member_name", "member_name"),
        ("idx_entries_club", "club"),
        ("idx_entries_entry_date", "entry_date"),
        ("idx_entries_company", "company"),
        ("idx_entries_status", "status"),
    ] {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON entries({})",
            name, column
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_created_at ON entries(created_at DESC)")
        .execute(pool)
        .await?;

    Ok(())
}
