pub mod architecture;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod output;
pub mod package;
pub mod search;
pub mod selection;
pub mod stats;
pub mod strategies;
pub mod ui;
pub mod utils;

// Re-export main types for convenience
pub use cli::{Cli, Commands, GenerateArgs};
pub use config::{generate_selection_content, get_config_path, read_selection_file};
pub use error::SetupError;
pub use generator::{
    generate, generate_brewfile, generate_command_list, generate_install_script, generate_on,
    GenerationOptions, OutputFormat, EMPTY_SELECTION,
};
pub use package::{parse_entries, InstallType, PackageEntry};
pub use search::{HomebrewApiIndex, HybridSearch, MockPackageIndex, PackageIndex};
pub use selection::Selection;
pub use utils::{get_log_path, log_operation};

use anyhow::Result;
use clap::Parser;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::List { category } => {
            commands::list_command(category.as_deref())?;
        }
        Commands::Search { query, page, arch } => {
            let index = create_index()?;
            commands::search_command(query, *page, *arch, &*index)?;
        }
        Commands::Dump => {
            println!("Running dump command...");
            if cli.dry_run {
                println!("(dry run mode)");
            }
            commands::dump_command(&cli)?;
        }
        Commands::Select => {
            if cli.dry_run {
                println!("(dry run mode)");
            }
            commands::select_command(&cli)?;
        }
        Commands::Generate(args) => {
            if cli.dry_run {
                eprintln!("(dry run mode)");
            }
            commands::generate_command(&cli, args)?;
        }
    }

    Ok(())
}

fn create_index() -> Result<Box<dyn PackageIndex>> {
    // Use the in-memory index in CI environments or when explicitly requested
    if utils::is_mock_environment() {
        return Ok(Box::new(MockPackageIndex::new()));
    }

    Ok(Box::new(HomebrewApiIndex::new()?))
}
