//! AWS access key rotation for GitHub Actions.
//!
//! Rotates each profile's IAM access key once it reaches its max age,
//! writes the new key into every mapped repository as sealed Actions
//! secrets, and deletes the old key.
//!
//! ## Modules
//! - `cli` — Command-line handlers
//! - `core` — Rotation logic (config, policy, lifecycle, sink, orchestrator)
//! - `models` — Data structures
//! - `providers` — IAM and GitHub clients
//! - `util` — Logging setup

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod providers;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
