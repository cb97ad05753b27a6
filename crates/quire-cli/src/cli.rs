use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "quire",
    about = "Quire: fork, diff and merge text documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the Quire HTTP server
    Serve(ServeArgs),
    /// Show line changes between two files
    Diff(DiffArgs),
    /// Three-way merge of a fork and an upstream against their base
    MergeFile(MergeFileArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Listen address; overrides the configuration file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct DiffArgs {
    pub base: PathBuf,
    pub other: PathBuf,
    /// Unchanged lines shown around each change
    #[arg(short = 'U', long, default_value_t = 3)]
    pub context: usize,
    /// Only print the change summary
    #[arg(long)]
    pub stat: bool,
}

#[derive(Args)]
pub struct MergeFileArgs {
    pub base: PathBuf,
    pub fork: PathBuf,
    pub upstream: PathBuf,
    /// Write the merged text here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// TOML configuration file supplying default labels
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub fork_label: Option<String>,
    #[arg(long)]
    pub upstream_label: Option<String>,
    /// Include the base text in conflict markers
    #[arg(long)]
    pub show_base: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file to load before printing
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
