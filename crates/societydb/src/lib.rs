//! # societydb Architecture
//!
//! societydb is the **persistence core** of a residential-society website: notices,
//! documents, events, gallery albums, committee members, contact entries and settings,
//! kept as flat JSON files on disk instead of in a database.
//!
//! It is a library first. The `societydb` binary (in `societydb-cli`) is one client of
//! it; an admin dashboard or a static-site build step could be another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (societydb-cli)                                        │
//! │  - Parses arguments, renders output, owns logging setup     │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses section names and ids, fills in defaults          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Lifecycle rules: stamps, schema, audit, filtering        │
//! │  - Operates on Rust types, returns CmdResult                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait, record/master write ordering            │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No Terminal I/O in Core
//!
//! From `api.rs` inward, code takes Rust arguments and returns `Result<CmdResult>`.
//! It never prints and never exits. Diagnostics go through `tracing`; the binary decides
//! whether and where they are shown.
//!
//! ## Errors
//!
//! Every fallible call returns [`error::Result`]. Callers can tell a missing record
//! ([`error::SocietyError::RecordNotFound`]) from an unreadable one
//! ([`error::SocietyError::Corrupt`]) from a disk failure.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each operation
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Section`, `Mode`, `RecordId`, `Record`, `Summary`)
//! - [`schema`]: Per-section defaults and presence validation
//! - [`audit`]: Audit entries, filters and rotation helpers
//! - [`config`]: Tool configuration and site settings
//! - [`init`]: Wiring a configured API over the filesystem
//! - [`error`]: Error types

pub mod api;
pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod model;
pub mod schema;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
