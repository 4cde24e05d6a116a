//! # Outreach Tracker
//!
//! Backend for tracking club members' outreach to companies.
//!
//! Members record entries (company, contact channels, status); the service
//! validates them, screens out financial-sector companies, flags duplicate
//! contacts, and serves an aggregate statistics report over a JSON HTTP API
//! and the `tracker` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────┐   ┌──────────┐
//! │   HTTP   │──▶│   tracker-core   │──▶│  SQLite  │
//! │  (axum)  │   │ validate/screen/ │   │ entries  │
//! └──────────┘   │ stats/duplicate  │   └──────────┘
//! ┌──────────┐   │                  │
//! │   CLI    │──▶│                  │
//! │(tracker) │   └──────────────────┘
//! └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tracker init                       # create database
//! tracker serve                      # start HTTP server
//! tracker stats --club "8x8"         # print the report
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `EntryStore` backend |
//! | [`server`] | JSON HTTP API |
//! | [`stats`] | Terminal stats report |

pub mod config;
pub mod db;
pub mod migrate;
pub mod server;
pub mod sqlite_store;
pub mod stats;
