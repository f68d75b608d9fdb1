//! Application configuration for auto-bank.
//!
//! An optional `auto_bank.toml` in the working directory tunes a run.
//! CLI flags override config file values, which override defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AutoBankError, Result};

/// Config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "auto_bank.toml";

/// Default run log file name.
pub const DEFAULT_LOG_FILE: &str = "auto_bank_run_log.txt";

/// Default template document for [`SeedMode::Template`].
pub const DEFAULT_TEMPLATE_FILE: &str = "base_bank.yaml";

// ---------------------------------------------------------------------------
// Config structs (matching auto_bank.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input discovery and output settings.
    #[serde(default)]
    pub bank: BankConfig,

    /// External preset parser invocation.
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Where the surrounding configuration document comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Fixed `router_rules` header and `init`/`fluidsettings` footer.
    #[default]
    Static,
    /// A YAML template loaded from the working directory.
    Template,
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Template => f.write_str("template"),
        }
    }
}

impl FromStr for SeedMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "template" => Ok(Self::Template),
            other => Err(format!(
                "unknown seed mode '{other}': expected 'static' or 'template'"
            )),
        }
    }
}

/// `[bank]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankConfig {
    /// Sound-bank file extension, matched case-insensitively.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Seed document strategy.
    #[serde(default)]
    pub seed: SeedMode,

    /// Template file, relative to the working directory.
    #[serde(default = "default_template")]
    pub template: String,

    /// Run log file, relative to the working directory.
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            seed: SeedMode::default(),
            template: default_template(),
            log_file: default_log_file(),
        }
    }
}

fn default_extension() -> String {
    "sf2".into()
}
fn default_template() -> String {
    DEFAULT_TEMPLATE_FILE.into()
}
fn default_log_file() -> String {
    DEFAULT_LOG_FILE.into()
}

/// `[parser]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Program to spawn.
    #[serde(default = "default_parser_command")]
    pub command: String,

    /// Arguments placed before the file flag.
    #[serde(default = "default_parser_args")]
    pub args: Vec<String>,

    /// Flag that precedes the input path. Empty means the path is positional.
    #[serde(default = "default_file_flag")]
    pub file_flag: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            command: default_parser_command(),
            args: default_parser_args(),
            file_flag: default_file_flag(),
        }
    }
}

fn default_parser_command() -> String {
    "python3".into()
}
fn default_parser_args() -> Vec<String> {
    vec!["parse_sf2.py".into()]
}
fn default_file_flag() -> String {
    "--file".into()
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Extension without the leading dot.
    pub extension: String,
    /// Seed document strategy.
    pub seed: SeedMode,
    /// Template file name for [`SeedMode::Template`].
    pub template: String,
    /// Run log file name.
    pub log_file: String,
    /// External parser invocation.
    pub parser: ParserConfig,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            extension: config.bank.extension.trim_start_matches('.').to_string(),
            seed: config.bank.seed,
            template: config.bank.template.clone(),
            log_file: config.bank.log_file.clone(),
            parser: config.parser.clone(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file inside `dir`.
pub fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load the config from `dir`. Returns defaults if the file does not exist.
pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let path = config_file_path(dir);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AutoBankError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        AutoBankError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file into `dir`. Refuses to replace an existing one.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = config_file_path(dir);
    if path.exists() {
        return Err(AutoBankError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| AutoBankError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AutoBankError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ab_config_{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(toml_str.contains("extension = \"sf2\""));
        assert!(toml_str.contains("seed = \"static\""));
        assert!(toml_str.contains("parse_sf2.py"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[bank]
seed = "template"

[parser]
command = "/usr/local/bin/sf2info"
args = []
file_flag = ""
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.bank.seed, SeedMode::Template);
        assert_eq!(config.bank.template, DEFAULT_TEMPLATE_FILE);
        assert_eq!(config.bank.log_file, DEFAULT_LOG_FILE);
        assert_eq!(config.parser.command, "/usr/local/bin/sf2info");
        assert!(config.parser.args.is_empty());
    }

    #[test]
    fn build_config_strips_leading_dot() {
        let mut app = AppConfig::default();
        app.bank.extension = ".SF2".into();
        let build = BuildConfig::from(&app);
        assert_eq!(build.extension, "SF2");
        assert_eq!(build.seed, SeedMode::Static);
    }

    #[test]
    fn seed_mode_from_str() {
        assert_eq!("Template".parse::<SeedMode>(), Ok(SeedMode::Template));
        assert_eq!("static".parse::<SeedMode>(), Ok(SeedMode::Static));
        assert!("header".parse::<SeedMode>().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = temp_dir();
        let config = load_config(&dir).expect("load");
        assert_eq!(config.bank.extension, "sf2");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn init_then_load_and_refuse_overwrite() {
        let dir = temp_dir();
        let path = init_config(&dir).expect("init");
        assert!(path.ends_with(CONFIG_FILE_NAME));

        let config = load_config(&dir).expect("load");
        assert_eq!(config.parser, ParserConfig::default());

        assert!(init_config(&dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let dir = temp_dir();
        std::fs::write(config_file_path(&dir), "[bank\nextension = ").expect("write");
        let err = load_config(&dir).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to parse"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
