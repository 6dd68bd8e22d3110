//! CodeCount HTTP sources
//!
//! Implements `codecount_core::StatsSource` over HTTPS: the GitHub
//! languages API for byte counts and the CodeTabs LOC API for precise
//! line counts.

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpStatsSource;
pub use config::{SourceConfig, DEFAULT_LANGUAGES_API, DEFAULT_LOC_API};
pub use error::HttpSourceError;

/// Result type for source setup
pub type Result<T> = std::result::Result<T, HttpSourceError>;
