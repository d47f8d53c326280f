use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "wikirecords",
    version,
    about = "Normalize parsed wiki documents into storage-ready records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Normalize(NormalizeArgs),
    Inspect(InspectArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    #[arg(long, default_value = ".cache/wikirecords")]
    pub cache_root: PathBuf,

    /// Parsed documents, one JSON object per line.
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub skip_redirects: bool,

    #[arg(long)]
    pub max_documents: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Normalized records, one JSON object per line.
    #[arg(long)]
    pub records: PathBuf,

    /// Record key, matched verbatim.
    #[arg(long)]
    pub id: String,

    /// Restrict output to the section with this raw title.
    #[arg(long)]
    pub section: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/wikirecords")]
    pub cache_root: PathBuf,
}
