//! Subcommand implementations.
//!
//! Each command builds its own [`HttpBackend`](tally_client::HttpBackend)
//! from the loaded config, prints results to stdout and leaves logging to
//! `tracing` on stderr.

pub mod auth;
pub mod catalog;
pub mod sales;
