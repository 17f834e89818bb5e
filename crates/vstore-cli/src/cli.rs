use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vstore",
    about = "vstore: versioned object store for configuration resources",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// State store location (`file:///path`, `memfs://path`, or a directory)
    #[arg(long, global = true, env = "VSTORE_STATE")]
    pub state: Option<String>,

    /// Config file [default: $HOME/.vstore.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Owner that writes are made on behalf of
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Abandon the operation after this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourceKind {
    #[value(aliases = ["widgets", "Widget"])]
    Widget,
    #[value(name = "configset", aliases = ["configsets", "ConfigSet", "cs"])]
    ConfigSet,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List resources of a kind, or show one
    Get(GetArgs),
    /// Create resources from a document file
    Create(FileArgs),
    /// Replace existing resources from a document file
    Replace(FileArgs),
    /// Delete a resource
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    pub kind: ResourceKind,
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Document to read (`-` for stdin)
    #[arg(short = 'f', long = "filename")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub kind: ResourceKind,
    pub name: String,
}
