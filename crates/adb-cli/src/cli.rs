use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "adb",
    about = "ADB: a content-addressed store for compiled contract artifacts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "adb.toml")]
    pub config: PathBuf,

    /// Network id for deployment lookups (overrides `network.default_network_id`)
    #[arg(short, long, global = true)]
    pub network: Option<String>,

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

#[derive(Subcommand)]
pub enum Command {
    /// Load build artifacts and report what was stored
    Load(LoadArgs),
    /// Execute a query or mutation document against loaded artifacts
    Query(QueryArgs),
    /// Show a loaded contract
    Show(ContractArgs),
    /// Print a contract's bytecode linked for a network
    Link(LinkArgs),
    /// List a contract's events by topic
    Events(ContractArgs),
    /// Start the ADB query server
    Serve(ServeArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Where to read build artifacts from.
#[derive(Args, Clone, Debug)]
pub struct ArtifactsArg {
    /// Directory of `*.json` build artifacts (defaults to `server.artifacts_dir`)
    #[arg(short, long)]
    pub artifacts: Option<PathBuf>,
}

#[derive(Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub artifacts: ArtifactsArg,
}

#[derive(Args)]
pub struct QueryArgs {
    /// JSON operation, e.g. '{"op": "sources", "args": {"first": 2}}'
    pub document: String,
    /// JSON object of variables substituted for "$name" strings
    #[arg(long)]
    pub variables: Option<String>,
    #[command(flatten)]
    pub artifacts: ArtifactsArg,
}

#[derive(Args)]
pub struct ContractArgs {
    /// Contract name
    pub name: String,
    #[command(flatten)]
    pub artifacts: ArtifactsArg,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Contract name
    pub name: String,
    /// Link the deployed bytecode instead of the creation bytecode
    #[arg(long)]
    pub deployed: bool,
    #[command(flatten)]
    pub artifacts: ArtifactsArg,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind_addr`)
    #[arg(long)]
    pub bind: Option<String>,
    #[command(flatten)]
    pub artifacts: ArtifactsArg,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file if it does not exist
    #[arg(long)]
    pub init: bool,
}
