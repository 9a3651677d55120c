use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the caching-fetch binary.
#[derive(Debug, Parser)]
#[command(
    name = "caching-fetch",
    version,
    about = "Preload responses into a transferable cache and hydrate from it"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CACHING_FETCH_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fetch every key into a fresh cache and print the serialized cache.
    Prefetch(PrefetchArgs),
    /// Initialize a fresh cache from serialized state and read keys through it.
    Hydrate(HydrateArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PrefetchArgs {
    /// Resource keys to preload, used verbatim as cache keys.
    #[arg(value_name = "KEY", required = true)]
    pub keys: Vec<String>,

    /// Write the serialized cache to this file instead of stdout.
    #[arg(long, short, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct HydrateArgs {
    /// File holding a serialized cache, as written by `prefetch`.
    #[arg(long, short, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Resource keys to read after hydration.
    #[arg(value_name = "KEY", required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Base URL that relative resource keys are resolved against.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Override the per-request timeout.
    #[arg(long = "timeout-seconds", value_name = "SECONDS", global = true)]
    pub timeout_seconds: Option<u64>,

    /// Override the User-Agent header.
    #[arg(long = "user-agent", value_name = "AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Toggle refetching of falsy cached payloads.
    #[arg(
        long = "refetch-falsy-payloads",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub refetch_falsy_payloads: Option<bool>,
}
