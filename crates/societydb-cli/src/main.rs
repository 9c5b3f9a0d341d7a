//! # societydb CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file only
//! invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/societydb/`: the store library (UI-agnostic)
//! - `crates/societydb-cli/`: this administrative client
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/societydb-cli/src/cli/)                  │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Config, logging and dispatch (commands.rs)               │
//! │  - Terminal rendering (render.rs, styles.rs)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/societydb/src/api.rs)                    │
//! │  - Parses sections and ids, fills in defaults               │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. The CLI owns argument parsing,
//! logging setup, prompting, rendering and exit codes.
//!
//! ## Testing Approach
//!
//! - Argument parsing and rendering have unit tests next to the code.
//! - `tests/cli_e2e.rs` drives the built binary against a temporary data directory.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
