use clap::{Args, Parser, Subcommand};

use crate::architecture::Architecture;
use crate::generator::OutputFormat;

#[derive(Parser)]
#[command(name = "brew-setup-generator")]
#[command(about = "Generate Homebrew setup scripts, command lists and Brewfiles for a new Mac")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show what would be done without writing any files
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Specify custom selection file path
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the curated catalog
    List {
        /// Only show one category
        #[arg(long)]
        category: Option<String>,
    },
    /// Search the catalog and Homebrew for packages
    Search {
        query: String,

        /// Result page, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Only show packages that run on this architecture
        #[arg(long, value_enum)]
        arch: Option<Architecture>,
    },
    /// Create or refresh the selection file
    Dump,
    /// Pick apps interactively and save them to the selection file
    Select,
    /// Generate a setup script, command list or Brewfile
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Script)]
    pub format: OutputFormat,

    /// Comma separated catalog ids (or formula:<name> / cask:<name>) instead of the selection file
    #[arg(long, value_delimiter = ',', conflicts_with = "entries")]
    pub ids: Vec<String>,

    /// JSON file with package entries instead of the selection file
    #[arg(long)]
    pub entries: Option<String>,

    /// Write the output to this path
    #[arg(long, short)]
    pub output: Option<String>,

    /// Write the output to the format's default file name
    #[arg(long, conflicts_with = "output")]
    pub save: bool,

    /// Copy the output to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Skip the Homebrew update step
    #[arg(long)]
    pub no_updates: bool,

    /// Skip the cleanup step
    #[arg(long)]
    pub no_cleanup: bool,

    /// Pass --verbose to brew
    #[arg(long)]
    pub verbose: bool,

    /// Run without asking before each step
    #[arg(long)]
    pub skip_confirmations: bool,

    /// Extra comment placed at the top of the script
    #[arg(long)]
    pub header: Option<String>,
}
