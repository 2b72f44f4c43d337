use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a saved model response through the normalization pipeline.
    Normalize(NormalizeArgs),
    /// Insert the built-in curated recipes into a data directory.
    SeedCatalog(SeedCatalogArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadKind {
    Recipe,
    MealPlan,
    Titles,
    Tips,
}

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// File holding the raw model output (`-` for stdin).
    #[arg(long)]
    pub input: PathBuf,

    /// What the response was asked to contain.
    #[arg(long, value_enum)]
    pub kind: PayloadKind,

    /// Requested diet tags; used when the response has no dietary info.
    #[arg(long, value_delimiter = ',')]
    pub diet: Vec<String>,

    /// Requested nutrition preference tags.
    #[arg(long, value_delimiter = ',')]
    pub nutrition_pref: Vec<String>,

    /// Title to fall back to when the response has none.
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Debug, Args)]
pub struct SeedCatalogArgs {
    /// Data directory of the server (`--data-dir` of `culinary-app`).
    #[arg(long, env = "CULINARY_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}
