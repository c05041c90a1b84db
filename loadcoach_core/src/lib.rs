#![forbid(unsafe_code)]

//! Core domain model and business logic for Loadcoach.
//!
//! This crate provides:
//! - Domain types (logged sets, rep ranges, suggestion results)
//! - Next-load suggestion from history and cold-start seeding
//! - Persistence (set WAL, CSV archive, athlete profile)
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod suggest;
pub mod cold_start;
pub mod advisor;
pub mod wal;
pub mod csv_rollup;
pub mod history;
pub mod profile;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use suggest::suggest_from_history;
pub use cold_start::suggest_cold_start;
pub use advisor::{advise, resolve_body_weight, SuggestionParams};
pub use wal::{JsonlSink, SetSink};
pub use history::{load_all_sets, load_exercise_history};
pub use profile::AthleteProfile;
