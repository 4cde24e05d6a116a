//! # tracker-core
//!
//! Core library for Outreach Tracker. Contains models, validation, keyword
//! screening, filters, the statistics engine, the duplicate checker, and the
//! storage abstraction.
//!
//! This crate has no runtime dependencies on tokio or sqlx, so it can be
//! embedded in any host that provides an [`EntryStore`](store::EntryStore).
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Entry`, `Club`, `Status`, identifiers and timestamps |
//! | [`validate`] | Payload validation into typed entries |
//! | [`screener`] | Financial-sector keyword blocklists |
//! | [`filter`] | Base filter and listing query predicates |
//! | [`entries`] | Create, replace, status patch, delete |
//! | [`stats`] | Statistics report passes |
//! | [`suggest`] | Autocomplete prefix matching |
//! | [`duplicate`] | Contact and company conflict checks |
//! | [`store`] | `EntryStore` trait and `InMemoryStore` |

pub mod duplicate;
pub mod entries;
pub mod filter;
pub mod models;
pub mod screener;
pub mod stats;
pub mod store;
pub mod suggest;
pub mod validate;

pub use entries::EntryError;
pub use filter::{EntryFilter, EntryQuery};
pub use models::{Club, Entry, NewEntry, Status};
pub use screener::KeywordScreener;
pub use store::memory::InMemoryStore;
pub use store::EntryStore;
