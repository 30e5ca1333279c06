//! Script generation engine.
//!
//! Turns an ordered selection of [`PackageEntry`] records into one of three
//! textual outputs: a bash install script, a plain command list, or a
//! Brewfile. Generation is a pure function of its arguments plus the date
//! stamped into the header, so [`generate_on`] pins that date for callers
//! that need byte-identical output.

mod brewfile;
mod commands;
mod script;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::package::{InstallType, PackageEntry};

/// Comment emitted when there is nothing to install.
pub const EMPTY_SELECTION: &str = "# No apps selected for installation";

/// Branding stamped into generated headers.
pub const GENERATOR_NAME: &str = "macOS Setup Assistant";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    pub include_updates: bool,
    pub include_cleanup: bool,
    pub verbose_output: bool,
    pub skip_confirmations: bool,
    pub custom_header: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_updates: true,
            include_cleanup: true,
            verbose_output: false,
            skip_confirmations: false,
            custom_header: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bash install script
    #[default]
    Script,
    /// Plain list of install commands
    Commands,
    /// Homebrew bundle file
    Brewfile,
}

impl OutputFormat {
    pub fn default_filename(&self) -> &'static str {
        match self {
            OutputFormat::Script => "macos-setup.sh",
            OutputFormat::Commands => "brew-commands.txt",
            OutputFormat::Brewfile => "Brewfile",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Script => "script",
            OutputFormat::Commands => "commands",
            OutputFormat::Brewfile => "brewfile",
        }
    }
}

/// Selection partitioned by installer kind, each bucket in selection order.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    pub bootstrap: Vec<&'a PackageEntry>,
    pub xcode: Vec<&'a PackageEntry>,
    pub formulae: Vec<&'a PackageEntry>,
    pub casks: Vec<&'a PackageEntry>,
    pub special: Vec<&'a PackageEntry>,
}

impl<'a> Buckets<'a> {
    pub fn partition(selection: &'a [PackageEntry]) -> Self {
        let mut buckets = Buckets::default();

        for entry in selection {
            if entry.is_bootstrap() {
                buckets.bootstrap.push(entry);
                continue;
            }
            match entry.install_type {
                InstallType::Formula => buckets.formulae.push(entry),
                InstallType::Cask => buckets.casks.push(entry),
                InstallType::XcodeTools => buckets.xcode.push(entry),
                InstallType::Script | InstallType::AppStore | InstallType::Custom => {
                    buckets.special.push(entry)
                }
            }
        }

        buckets
    }

    /// Everything that is neither a formula nor a cask.
    pub fn custom_count(&self) -> usize {
        self.bootstrap.len() + self.xcode.len() + self.special.len()
    }
}

/// A declared dependency that is absent from the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmetDependency<'a> {
    pub entry: &'a PackageEntry,
    pub dependency: &'a str,
}

/// Dependency hints are advisory: they never reorder output, they are only reported.
pub fn unmet_dependencies(selection: &[PackageEntry]) -> Vec<UnmetDependency<'_>> {
    selection
        .iter()
        .flat_map(|entry| {
            entry
                .dependencies
                .iter()
                .filter(|dep| !selection.iter().any(|other| &other.id == *dep))
                .map(move |dep| UnmetDependency {
                    entry,
                    dependency: dep.as_str(),
                })
        })
        .collect()
}

pub fn generate(
    selection: &[PackageEntry],
    options: &GenerationOptions,
    format: OutputFormat,
) -> Result<String> {
    generate_on(selection, options, format, Local::now().date_naive())
}

/// Same as [`generate`] with the header date fixed.
pub fn generate_on(
    selection: &[PackageEntry],
    options: &GenerationOptions,
    format: OutputFormat,
    date: NaiveDate,
) -> Result<String> {
    for (index, entry) in selection.iter().enumerate() {
        entry.validate(index)?;
    }

    if selection.is_empty() {
        return Ok(match format {
            OutputFormat::Script => format!("#!/bin/bash\n{}\n", EMPTY_SELECTION),
            OutputFormat::Commands | OutputFormat::Brewfile => EMPTY_SELECTION.to_string(),
        });
    }

    let buckets = Buckets::partition(selection);
    let output = match format {
        OutputFormat::Script => script::render(selection, &buckets, options, date),
        OutputFormat::Commands => commands::render(&buckets),
        OutputFormat::Brewfile => brewfile::render(&buckets),
    };
    Ok(output)
}

pub fn generate_install_script(
    selection: &[PackageEntry],
    options: &GenerationOptions,
) -> Result<String> {
    generate(selection, options, OutputFormat::Script)
}

pub fn generate_command_list(selection: &[PackageEntry]) -> Result<String> {
    generate(selection, &GenerationOptions::default(), OutputFormat::Commands)
}

pub fn generate_brewfile(selection: &[PackageEntry]) -> Result<String> {
    generate(selection, &GenerationOptions::default(), OutputFormat::Brewfile)
}

/// Header date in day/month/year form.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Collapses any line breaks so the text fits on one comment or echo line.
pub(crate) fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<PackageEntry> {
        vec![
            PackageEntry::new("zsh-thing", "Oh My Zsh", InstallType::Custom, "sh install.sh"),
            PackageEntry::new("git", "Git", InstallType::Formula, "git"),
            PackageEntry::new("code", "VS Code", InstallType::Cask, "visual-studio-code"),
            PackageEntry::new("homebrew", "Homebrew", InstallType::Script, "install-brew"),
            PackageEntry::new("node", "Node.js", InstallType::Formula, "node"),
            PackageEntry::new("xcode", "Xcode CLT", InstallType::XcodeTools, "xcode-select --install"),
            PackageEntry::new("telegram", "Telegram", InstallType::AppStore, "747648890"),
        ]
    }

    #[test]
    fn test_partition_is_stable() {
        let selection = sample();
        let buckets = Buckets::partition(&selection);

        let ids = |bucket: &[&PackageEntry]| bucket.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&buckets.bootstrap), vec!["homebrew"]);
        assert_eq!(ids(&buckets.xcode), vec!["xcode"]);
        assert_eq!(ids(&buckets.formulae), vec!["git", "node"]);
        assert_eq!(ids(&buckets.casks), vec!["code"]);
        assert_eq!(ids(&buckets.special), vec!["zsh-thing", "telegram"]);
        assert_eq!(buckets.custom_count(), 4);
    }

    #[test]
    fn test_options_deserialize_with_defaults() -> Result<()> {
        let options: GenerationOptions =
            serde_json::from_str(r#"{"verboseOutput": true, "somethingElse": 1}"#)?;
        assert!(options.verbose_output);
        assert!(options.include_updates);
        assert!(options.include_cleanup);
        assert!(!options.skip_confirmations);
        assert_eq!(options.custom_header, None);
        Ok(())
    }

    #[test]
    fn test_empty_selection_placeholders() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let options = GenerationOptions::default();

        let commands = generate_on(&[], &options, OutputFormat::Commands, date)?;
        assert_eq!(commands, EMPTY_SELECTION);

        let brewfile = generate_on(&[], &options, OutputFormat::Brewfile, date)?;
        assert_eq!(brewfile, EMPTY_SELECTION);

        let script = generate_on(&[], &options, OutputFormat::Script, date)?;
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains(EMPTY_SELECTION));
        Ok(())
    }

    #[test]
    fn test_invalid_entry_stops_generation() {
        let selection = vec![
            PackageEntry::new("git", "Git", InstallType::Formula, "git"),
            PackageEntry::new("empty", "Empty", InstallType::Cask, ""),
        ];
        for format in [OutputFormat::Script, OutputFormat::Commands, OutputFormat::Brewfile] {
            assert!(generate(&selection, &GenerationOptions::default(), format).is_err());
        }
    }

    #[test]
    fn test_unmet_dependencies() {
        let selection = vec![
            PackageEntry::new("p10k", "Powerlevel10k", InstallType::Custom, "git clone ...")
                .with_dependencies(&["oh-my-zsh"]),
            PackageEntry::new("xcode-full", "Xcode", InstallType::Custom, "mas install 1")
                .with_dependencies(&["mas"]),
            PackageEntry::new("mas", "mas", InstallType::Formula, "mas"),
        ];

        let unmet = unmet_dependencies(&selection);
        assert_eq!(unmet.len(), 1);
        assert_eq!(unmet[0].entry.id, "p10k");
        assert_eq!(unmet[0].dependency, "oh-my-zsh");
    }

    #[test]
    fn test_default_filenames() {
        assert_eq!(OutputFormat::Script.default_filename(), "macos-setup.sh");
        assert_eq!(OutputFormat::Commands.default_filename(), "brew-commands.txt");
        assert_eq!(OutputFormat::Brewfile.default_filename(), "Brewfile");
    }

    #[test]
    fn test_format_date_is_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(date), "05/03/2024");
    }

    #[test]
    fn test_single_line_collapses_breaks() {
        assert_eq!(single_line("first\nsecond\r\n  third"), "first second third");
    }
}
