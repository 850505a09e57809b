//! Data structures shared across modules.

pub mod config;
pub mod credential;
pub mod profile;
