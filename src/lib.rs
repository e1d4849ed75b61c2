// Core modules
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod schedule;
pub mod stats;

// Re-export commonly used types
pub use crate::auth::{AuthService, TokenPair};
pub use crate::config::AppConfig;
pub use crate::error::{Error, Result};
pub use crate::models::*;
pub use crate::stats::{CycleStats, Outcome};
