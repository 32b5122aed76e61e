#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for upkeep
//!
//! This library holds the two batch pipelines run by the `upkeep` tool from CI.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface, configuration and orchestration
//! - [`freshness`]: Finds stale data files and files tracking issues for them
//! - [`downloads`]: Fetches package download statistics and writes a summary report

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod downloads;
#[cfg(not(any(debug_assertions, test)))]
mod downloads;

#[cfg(any(debug_assertions, test))]
pub mod freshness;
#[cfg(not(any(debug_assertions, test)))]
mod freshness;

pub use crate::commands::{Host, run};
