//! Clap derive structures for the `aeris` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aeris -- Google Air Quality data from the command line
#[derive(Debug, Parser)]
#[command(
    name = "aeris",
    version,
    about = "Poll Google Air Quality data and expose it as sensors",
    long_about = "Polls the Google Air Quality API on an interval and exposes the\n\
        results as sensor readings: AQI indexes, pollutant concentrations,\n\
        and per-population health recommendations.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Google Air Quality API key (overrides the config file)
    #[arg(long, env = "AERIS_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Latitude (overrides the config file)
    #[arg(long, env = "AERIS_LATITUDE", global = true, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// Longitude (overrides the config file)
    #[arg(long, env = "AERIS_LONGITUDE", global = true, allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Language code for recommendation text
    #[arg(long, env = "AERIS_LANGUAGE", global = true)]
    pub language: Option<String>,

    /// Polling interval in minutes
    #[arg(long, short = 'i', env = "AERIS_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, env = "AERIS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "AERIS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Metric-kind filter for `fetch`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindFilter {
    Index,
    Pollutant,
    Recommendation,
}

impl From<KindFilter> for aeris_core::SensorKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Index => Self::Index,
            KindFilter::Pollutant => Self::Pollutant,
            KindFilter::Recommendation => Self::Recommendation,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch current conditions once and print them
    #[command(alias = "f")]
    Fetch(FetchArgs),

    /// Poll continuously and stream sensor updates
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Only print metrics of this kind
    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many refreshes (0 = run until interrupted)
    #[arg(long, default_value = "0")]
    pub ticks: u64,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,
    /// Print the configuration (key redacted)
    Show,
    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
