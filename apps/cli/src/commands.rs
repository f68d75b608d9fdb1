//! CLI definitions, routing, and tracing setup.

use std::path::Path;

use autobank_core::parser::ExternalParser;
use autobank_core::pipeline::{BankResult, ProgressReporter, build_bank};
use autobank_shared::{AppConfig, BuildConfig, SeedMode, init_config, load_config};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// auto-bank: turn a folder of sound banks into a synthesizer patch map.
#[derive(Parser)]
#[command(
    name = "auto-bank",
    version,
    about = "Scan the current directory for .sf2 files and write <dirname>.yaml with their presets.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Seed document: static header/footer or a YAML template.
    #[arg(long)]
    pub seed: Option<SeedMode>,

    /// Template file to merge into (implies `--seed template`).
    #[arg(long)]
    pub template: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Subcommands. Without one, a bank build runs.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default auto_bank.toml into the current directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Output goes to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // Library crates log under `autobank_*`, this binary under `auto_bank`.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("autobank={level},auto_bank={level}")));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?;

    match cli.command {
        None => cmd_build(&cwd, cli.seed, cli.template, &cli.log_format).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(&cwd),
            ConfigAction::Show => cmd_config_show(&cwd, cli.seed, cli.template),
        },
    }
}

/// Layer CLI flags over the loaded config.
fn resolve_config(
    mut config: AppConfig,
    seed: Option<SeedMode>,
    template: Option<String>,
) -> AppConfig {
    if let Some(template) = template {
        config.bank.template = template;
        config.bank.seed = SeedMode::Template;
    }
    if let Some(seed) = seed {
        config.bank.seed = seed;
    }
    config
}

async fn cmd_build(
    cwd: &Path,
    seed: Option<SeedMode>,
    template: Option<String>,
    log_format: &LogFormat,
) -> Result<()> {
    let config = resolve_config(load_config(cwd)?, seed, template);
    let build = BuildConfig::from(&config);

    info!(
        dir = %cwd.display(),
        seed = %build.seed,
        parser = %build.parser.command,
        "building bank"
    );

    let parser = ExternalParser::new(build.parser.clone(), cwd);
    let reporter = CliProgress::new(matches!(log_format, LogFormat::Text));

    let result = build_bank(cwd, &build, &parser, &reporter).await?;

    println!(
        "Done! Wrote {} and {}",
        display_name(&result.config_path),
        display_name(&result.log_path)
    );

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_started(&self, file: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {file}"));
    }

    fn done(&self, _result: &BankResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn cmd_config_init(cwd: &Path) -> Result<()> {
    let path = init_config(cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cwd: &Path, seed: Option<SeedMode>, template: Option<String>) -> Result<()> {
    let config = resolve_config(load_config(cwd)?, seed, template);
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_build() {
        let cli = Cli::try_parse_from(["auto-bank"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.seed.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn seed_and_config_subcommand_parse() {
        let cli = Cli::try_parse_from(["auto-bank", "--seed", "template", "-vv"]).expect("parse");
        assert_eq!(cli.seed, Some(SeedMode::Template));
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["auto-bank", "config", "show"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        assert!(Cli::try_parse_from(["auto-bank", "--seed", "footer"]).is_err());
    }

    #[test]
    fn template_flag_implies_template_seed() {
        let config = resolve_config(AppConfig::default(), None, Some("mine.yaml".into()));
        assert_eq!(config.bank.seed, SeedMode::Template);
        assert_eq!(config.bank.template, "mine.yaml");
    }

    #[test]
    fn explicit_seed_wins_over_template_flag() {
        let config = resolve_config(
            AppConfig::default(),
            Some(SeedMode::Static),
            Some("mine.yaml".into()),
        );
        assert_eq!(config.bank.seed, SeedMode::Static);
    }

    #[test]
    fn file_values_survive_without_flags() {
        let mut file = AppConfig::default();
        file.bank.seed = SeedMode::Template;
        let config = resolve_config(file, None, None);
        assert_eq!(config.bank.seed, SeedMode::Template);
    }
}
