//! Statistics overview for the terminal.
//!
//! Runs the same report as `GET /api/stats` against the configured database
//! and prints a summary. Used by `tracker stats`.

use anyhow::Result;

use tracker_core::filter::EntryFilter;
use tracker_core::stats::{build_report, StatsReport};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: compute the report and print it.
pub async fn run_stats(config: &Config, filter: EntryFilter) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let store = SqliteStore::new(pool);

    let today = chrono::Local::now().date_naive();
    let report = build_report(&store, &filter.normalized(), today).await?;

    print!("{}", render_report(config, &report));

    store.pool().close().await;
    Ok(())
}

/// Format the report as plain text.
pub fn render_report(config: &Config, report: &StatsReport) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    let summary = &report.summary;
    line("Outreach Tracker Stats".to_string());
    line("======================".to_string());
    line(String::new());
    line(format!("  Database:    {}", config.db.path.display()));
    line(String::new());
    line(format!("  Entries:     {}", summary.total_entries));
    line(format!("  Last 7 days: {}", summary.recent_entries_7days));
    line(format!("  Last 30 days: {}", summary.recent_entries_30days));
    line(format!("  Avg/member:  {:.2}", summary.average_per_member));

    if !report.status_distribution.is_empty() {
        line(String::new());
        line("  By status:".to_string());
        for s in &report.status_distribution {
            line(format!("  {:<24} {:>6}", s.status.as_str(), s.count));
        }
    }

    if !report.club_performance.is_empty() {
        line(String::new());
        line("  By club:".to_string());
        line(format!(
            "  {:<24} {:>7} {:>8} {:>10} {:>7} {:>8}",
            "CLUB", "ENTRIES", "MEMBERS", "COMPANIES", "ACTIVE", "SUCCESS"
        ));
        line(format!("  {}", "-".repeat(69)));
        for c in &report.club_performance {
            line(format!(
                "  {:<24} {:>7} {:>8} {:>10} {:>7} {:>7.1}%",
                c.club.as_str(),
                c.total_entries,
                c.unique_members_count,
                c.unique_companies_count,
                c.active_count,
                c.success_rate
            ));
        }
    }

    if !report.member_contributions.is_empty() {
        line(String::new());
        line("  Top members:".to_string());
        for m in &report.member_contributions {
            line(format!(
                "  {:<24} {:<20} {:>6}",
                m.member_name,
                m.club.as_str(),
                m.count
            ));
        }
    }

    if !report.top_companies.is_empty() {
        line(String::new());
        line("  Top companies:".to_string());
        for c in &report.top_companies {
            line(format!("  {:<24} {:>6}", c.company, c.count));
        }
    }

    let methods = &report.contact_methods;
    line(String::new());
    line(format!(
        "  Contacts:    email {} / linkedin {} / phone {}",
        methods.email, methods.linkedin, methods.phone
    ));
    line(String::new());

    out
}
