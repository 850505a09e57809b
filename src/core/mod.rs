//! Core rotation logic.

pub mod config;
pub mod lifecycle;
pub mod orchestrator;
pub mod policy;
pub mod seal;
pub mod sink;
