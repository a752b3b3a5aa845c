//! Shared types, error model, and configuration for plotsift.
//!
//! This crate is the foundation depended on by all other plotsift crates.
//! It provides:
//! - [`PlotsiftError`] — the unified error type
//! - Domain types ([`Record`], [`TitleRow`], [`Criteria`])
//! - Configuration ([`AppConfig`], [`OmdbConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OmdbConfig, OutputConfig, config_dir, config_file_path, init_config,
    init_config_at, load_config, load_config_from, resolve_api_key,
};
pub use error::{PlotsiftError, Result};
pub use types::{Criteria, Record, TITLE_ROW_FIELDS, TitleRow};
