use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spiceweasel")]
#[command(version)]
#[command(
    about = "Generate knife commands for the nodes of a Chef manifest",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the commands that create (or re-run) the manifest's nodes
    Create(GenerateArgs),

    /// Print the commands that delete the manifest's nodes
    Delete(GenerateArgs),

    /// Print the delete commands followed by the create commands
    Rebuild(GenerateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Manifest file (.yml, .yaml, .json or .toml)
    pub manifest: PathBuf,

    /// Delete provider nodes with a single bulk command
    #[arg(long)]
    pub bulkdelete: bool,

    /// Re-run chef-client on existing nodes instead of creating them
    #[arg(long)]
    pub chefclient: bool,

    /// Skip checking the manifest's cookbooks, roles, environments and plugins
    #[arg(long)]
    pub novalidation: bool,

    /// Create provider instances in parallel with GNU parallel
    #[arg(long)]
    pub parallel: bool,

    /// Attribute passed to knife ssh for chef-client re-runs
    #[arg(short, long)]
    pub attribute: Option<String>,

    /// knife.rb passed to every knife command
    #[arg(short = 'c', long)]
    pub knifeconfig: Option<String>,

    /// Chef server URL passed to every knife command
    #[arg(short, long)]
    pub serverurl: Option<String>,

    /// Generator config file (defaults to ~/.config/spiceweasel/config.toml)
    #[arg(long, env = "SPICEWEASEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One command per line
    Text,
    /// JSON object with the command lists and executor flags
    Json,
}
