//! Command-line interface and orchestration for upkeep
//!
//! This module implements the CLI commands and wires configuration, logging and host output
//! around the two pipelines.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **freshness**: Resolve the configured data files, classify them by the age of their last
//!   commit, open tracking issues for stale ones, and emit CI step outputs
//! - **downloads**: Fetch download statistics for one package, aggregate them over the
//!   reporting windows, and write the YAML report
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the appropriate
//! command handler. Each pipeline command initializes logging, loads `upkeep.toml` (flags win
//! over file values), builds the pipeline objects explicitly, runs them once, and prints a
//! summary through the [`Host`]. Failures are written to the host's error stream and the host
//! is asked to exit with status 1.

mod common;
mod config;
mod downloads;
mod freshness;
mod host;
mod init;
mod run;

#[cfg(debug_assertions)]
pub use config::Config;

pub use downloads::{DownloadsArgs, process_downloads};
pub use freshness::{FreshnessArgs, process_freshness};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
