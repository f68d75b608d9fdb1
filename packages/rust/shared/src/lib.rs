//! Shared types, error model, and configuration for auto-bank.
//!
//! This crate is the foundation depended on by the other auto-bank crates.
//! It provides:
//! - [`AutoBankError`]: the unified error type
//! - Domain types ([`PresetRecord`], [`PatchTable`], [`RunLog`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BankConfig, BuildConfig, CONFIG_FILE_NAME, DEFAULT_LOG_FILE,
    DEFAULT_TEMPLATE_FILE, ParserConfig, SeedMode, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{AutoBankError, Result};
pub use types::{LogEntry, Patch, PatchTable, PresetRecord, RunLog, UNNAMED_PATCH, reference_string};
