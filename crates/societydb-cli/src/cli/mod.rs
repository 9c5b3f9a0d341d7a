//! # CLI Behavior
//!
//! This is **one possible UI client** for societydb, standing in for the admin
//! dashboard's data operations. It is the only place that knows about terminal I/O,
//! exit codes and output formatting.
//!
//! ## Global Options
//!
//! `--data-dir`, `--mode` and `--user` override the matching `societydb.toml` keys and
//! `SOCIETYDB_*` environment variables. `-v` shows info logs on stderr, `-vv` debug.
//! `RUST_LOG` overrides both.
//!
//! ## Record Payloads
//!
//! `create` and `update` take fields as `--set key=value` (repeatable) and/or
//! `--json '{...}'`. A `--set` value is parsed as JSON when it parses (`--set floor=3`
//! stores a number, `--set pinned=true` a boolean) and kept as a string otherwise.
//! `--set` wins over `--json` for the same key.
//!
//! ## Destructive Commands
//!
//! `purge` shows what it will remove and asks for confirmation unless `--yes` is given.
//! Without a terminal to ask on, it refuses.
//!
//! ## Module Structure
//!
//! - `commands`: config and logging setup, dispatch to the API
//! - `render`: output formatting (tables, record JSON, messages)
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styling

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
