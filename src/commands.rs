use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::architecture::{support_for, Architecture};
use crate::catalog;
use crate::cli::{Cli, GenerateArgs};
use crate::config::{
    generate_selection_content, get_config_path, read_selection_file, SelectionFile,
};
use crate::generator::{generate, unmet_dependencies, GenerationOptions, OutputFormat};
use crate::output::{copy_to_clipboard, resolve_output_path, save_output};
use crate::package::{parse_entries, PackageEntry};
use crate::search::{HybridSearch, PackageIndex};
use crate::selection::{resolve, Selection};
use crate::stats::SelectionStats;
use crate::ui::show_interactive_selection;
use crate::utils::log_operation;

pub fn list_command(category: Option<&str>) -> Result<()> {
    let wanted = category.map(|c| c.trim().to_lowercase());
    let mut shown = 0;

    for (category, members) in catalog::grouped() {
        if let Some(wanted) = &wanted {
            if category.id != wanted && category.name.to_lowercase() != *wanted {
                continue;
            }
        }
        if members.is_empty() {
            continue;
        }

        println!("\n{} - {}", category.name, category.description);
        for entry in &members {
            println!(
                "  {:<22} {} ({}){}",
                entry.id,
                entry.name,
                entry.install_type.kind_label(),
                if entry.is_required { " [required]" } else { "" }
            );
        }
        shown += members.len();
    }

    if shown == 0 {
        if let Some(category) = category {
            let known: Vec<&str> = catalog::categories().iter().map(|c| c.name).collect();
            anyhow::bail!(
                "Unknown category '{}'. Available categories: {}",
                category,
                known.join(", ")
            );
        }
    }

    Ok(())
}

pub fn search_command(
    query: &str,
    page: usize,
    arch: Option<Architecture>,
    index: &dyn PackageIndex,
) -> Result<()> {
    if page == 0 {
        anyhow::bail!("Pages start at 1");
    }

    let search = HybridSearch::new(index);
    let results = search.search_for(query, page - 1, arch);

    if results.results.is_empty() {
        match arch {
            Some(arch) => println!("No {} packages found for '{}'", arch.as_str(), query),
            None => println!("No packages found for '{}'", query),
        }
        return Ok(());
    }

    println!(
        "Found {} packages for '{}' ({} results), page {}:",
        results.total,
        query,
        results.source.as_str(),
        page
    );
    if let Some(arch) = arch {
        println!("Showing only packages that run on {}", arch.as_str());
    }
    for entry in &results.results {
        let support = support_for(entry)
            .map(|s| format!(" [{}]", s.label()))
            .unwrap_or_default();
        println!(
            "  {:<28} {} ({}){} - {}",
            entry.id,
            entry.name,
            entry.install_type.kind_label(),
            support,
            entry.description
        );
    }

    if results.has_more {
        println!("\nMore results available with --page {}", page + 1);
    }
    println!("Add ids to the selection file or pass them to `generate --ids`.");

    Ok(())
}

pub fn dump_command(cli: &Cli) -> Result<()> {
    let config_path = get_config_path(&cli.config)?;

    if cli.dry_run {
        println!("Would write selection to: {}", config_path.display());
    }

    // Read existing file to preserve user selections
    let existing = read_selection_file(&config_path)?;
    let selection = load_selection(&existing);
    println!(
        "Found {} selected entries ({} in catalog)",
        selection.len(),
        catalog::entries().len()
    );

    let previous = existing.selected_ids();
    let stats = SelectionStats::collect(selection.entries(), Some(&previous));
    let content = generate_selection_content(
        &existing.settings(),
        &existing.extra_ids(),
        &existing.options,
        Some(&stats),
    );

    write_selection_file(cli, &config_path, &content)
}

pub fn select_command(cli: &Cli) -> Result<()> {
    let config_path = get_config_path(&cli.config)?;
    let existing = read_selection_file(&config_path)?;
    let previous = existing.selected_ids();

    let chosen = match show_interactive_selection(&catalog::entries(), &previous)? {
        Some(chosen) => chosen,
        None => {
            println!("Selection cancelled, nothing written.");
            return Ok(());
        }
    };

    let mut selection = Selection::new();
    for entry in chosen {
        selection.add(entry);
    }

    // Ad-hoc entries are not in the picker, keep their previous state
    let settings = existing.settings();
    for id in existing.extra_ids() {
        if settings.get(&id) == Some(&true) {
            if let Ok(entry) = resolve(&id) {
                selection.add(entry);
            }
        }
    }

    let settings = selection_settings(&existing, &selection);
    let stats = SelectionStats::collect(selection.entries(), Some(&previous));
    let content = generate_selection_content(
        &settings,
        &existing.extra_ids(),
        &existing.options,
        Some(&stats),
    );

    println!("{} entries selected", selection.len());
    write_selection_file(cli, &config_path, &content)
}

pub fn generate_command(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let config_path = get_config_path(&cli.config)?;
    let file = read_selection_file(&config_path)?;

    let entries: Vec<PackageEntry> = if let Some(path) = &args.entries {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read entries file {}", path))?;
        parse_entries(&json)?
    } else if !args.ids.is_empty() {
        Selection::from_ids(&args.ids)?.into_entries()
    } else {
        if !config_path.exists() {
            anyhow::bail!(
                "Selection file not found at {}. Run 'dump' or 'select' first, or pass --ids.",
                config_path.display()
            );
        }
        Selection::from_ids(file.selected_ids())
            .with_context(|| format!("Invalid selection file {}", config_path.display()))?
            .into_entries()
    };

    let options = resolve_options(&file.options, args);

    for unmet in unmet_dependencies(&entries) {
        eprintln!(
            "⚠️  {} expects {}, which was not part of this setup",
            unmet.entry.name, unmet.dependency
        );
    }

    let content = generate(&entries, &options, args.format)?;

    let destination = if args.save || args.output.is_some() {
        Some(resolve_output_path(args.format, args.output.as_deref()))
    } else {
        None
    };

    let mut printed = false;
    match &destination {
        Some(path) if cli.dry_run => {
            eprintln!("Would write {} bytes to: {}", content.len(), path.display());
        }
        Some(path) => {
            save_output(&content, path)?;
            eprintln!("✅ Saved {} to {}", args.format.as_str(), path.display());
            if args.format == OutputFormat::Script {
                eprintln!("Run it with: bash {}", path.display());
            }
        }
        None if !args.copy => {
            println!("{}", content);
            printed = true;
        }
        None => {}
    }

    if args.copy {
        match copy_to_clipboard(&content) {
            Ok(_) => eprintln!("📋 Copied {} to clipboard", args.format.as_str()),
            Err(e) => {
                eprintln!("⚠️  {}. Copy the output below manually.", e);
                log_operation(&format!("Clipboard fallback: {}", e))?;
                if !printed {
                    println!("{}", content);
                }
            }
        }
    }

    if !cli.dry_run {
        log_operation(&format!(
            "Generated {} for {} entries -> {}",
            args.format.as_str(),
            entries.len(),
            destination
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout".to_string())
        ))?;
    }

    Ok(())
}

/// Defaults, then the selection file, then command line flags.
fn resolve_options(file_options: &GenerationOptions, args: &GenerateArgs) -> GenerationOptions {
    let mut options = file_options.clone();
    if args.no_updates {
        options.include_updates = false;
    }
    if args.no_cleanup {
        options.include_cleanup = false;
    }
    if args.verbose {
        options.verbose_output = true;
    }
    if args.skip_confirmations {
        options.skip_confirmations = true;
    }
    if let Some(header) = &args.header {
        options.custom_header = Some(header.clone());
    }
    options
}

/// Resolves the checked ids of a selection file, skipping unknown ones.
fn load_selection(file: &SelectionFile) -> Selection {
    let mut selection = Selection::new();
    for id in file.selected_ids() {
        match resolve(&id) {
            Ok(entry) => {
                selection.add(entry);
            }
            Err(e) => eprintln!("⚠️  Skipping {}: {}", id, e),
        }
    }
    selection
}

fn selection_settings(existing: &SelectionFile, selection: &Selection) -> HashMap<String, bool> {
    let mut settings = existing.settings();
    for entry in catalog::entries() {
        settings.insert(entry.id.clone(), selection.contains(&entry.id));
    }
    settings
}

fn write_selection_file(cli: &Cli, config_path: &Path, content: &str) -> Result<()> {
    if cli.dry_run {
        println!("\nSelection file content would be:");
        println!("{}", content);
        return Ok(());
    }

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(config_path, content)?;
    println!("Selection written to: {}", config_path.display());
    log_operation(&format!("Selection file written: {}", config_path.display()))?;

    Ok(())
}
