use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::generator::{single_line, GenerationOptions};
use crate::stats::SelectionStats;

const OPTIONS_SECTION: &str = "Options";
const STATISTICS_SECTION: &str = "Statistics";
const EXTRA_SECTION: &str = "Extra";
const HEADER_PREFIX: &str = "Header:";

pub fn get_config_path(custom_path: &Option<String>) -> Result<PathBuf> {
    if let Some(path) = custom_path {
        return Ok(PathBuf::from(path));
    }

    // For testing, use current directory
    if std::env::var("CARGO_MANIFEST_DIR").is_ok() {
        return Ok(PathBuf::from("./brew-selection.md"));
    }

    // Production: use ~/.config/brew-setup-generator/selection.md
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("brew-setup-generator");

    Ok(config_dir.join("selection.md"))
}

/// Parsed contents of the selection file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionFile {
    /// Every checklist id in file order with its checked state
    pub items: Vec<(String, bool)>,
    pub options: GenerationOptions,
}

impl SelectionFile {
    /// Checked ids, in the order they appear in the file.
    pub fn selected_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn settings(&self) -> HashMap<String, bool> {
        self.items.iter().cloned().collect()
    }

    /// Ids that are not part of the curated catalog.
    pub fn extra_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|(id, _)| catalog::find(id).is_none())
            .map(|(id, _)| id.clone())
            .collect()
    }
}

pub fn read_selection_file(config_path: &Path) -> Result<SelectionFile> {
    let mut file = SelectionFile::default();

    if !config_path.exists() {
        return Ok(file);
    }

    let content = fs::read_to_string(config_path)?;
    let mut current_section = "";

    for line in content.lines() {
        let line = line.trim();
        if let Some(section) = line.strip_prefix("## ") {
            current_section = section.trim();
            continue;
        }

        match current_section {
            "" | STATISTICS_SECTION => {}
            OPTIONS_SECTION => {
                if let Some(header) = line.strip_prefix(HEADER_PREFIX) {
                    let header = header.trim();
                    file.options.custom_header =
                        (!header.is_empty()).then(|| header.to_string());
                } else if let Some((key, checked)) = parse_checkbox(line) {
                    apply_option(&mut file.options, &key, checked);
                }
            }
            _ => {
                if let Some((id, checked)) = parse_checkbox(line) {
                    if !file.items.iter().any(|(existing, _)| *existing == id) {
                        file.items.push((id, checked));
                    }
                }
            }
        }
    }

    Ok(file)
}

fn parse_checkbox(line: &str) -> Option<(String, bool)> {
    let (rest, checked) = if let Some(rest) = line.strip_prefix("- [x] ") {
        (rest, true)
    } else if let Some(rest) = line.strip_prefix("- [X] ") {
        (rest, true)
    } else if let Some(rest) = line.strip_prefix("- [ ] ") {
        (rest, false)
    } else {
        return None;
    };

    let id = rest.trim();
    (!id.is_empty()).then(|| (id.to_string(), checked))
}

fn apply_option(options: &mut GenerationOptions, key: &str, checked: bool) {
    match key {
        "include-updates" => options.include_updates = checked,
        "include-cleanup" => options.include_cleanup = checked,
        "verbose-output" => options.verbose_output = checked,
        "skip-confirmations" => options.skip_confirmations = checked,
        _ => {}
    }
}

pub fn generate_selection_content(
    settings: &HashMap<String, bool>,
    extra: &[String],
    options: &GenerationOptions,
    stats: Option<&SelectionStats>,
) -> String {
    let mut content = String::new();

    content.push_str("# macOS Setup Selection\n\n");
    content.push_str(&format!(
        "Generated on: {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(stats) = stats {
        content.push_str(&stats.format_as_markdown());
    }

    content.push_str(&format!("## {}\n\n", OPTIONS_SECTION));
    let flags = [
        ("include-updates", options.include_updates),
        ("include-cleanup", options.include_cleanup),
        ("verbose-output", options.verbose_output),
        ("skip-confirmations", options.skip_confirmations),
    ];
    for (key, enabled) in flags {
        content.push_str(&format!("- {} {}\n", checkbox(enabled), key));
    }
    if let Some(header) = &options.custom_header {
        content.push_str(&format!("{} {}\n", HEADER_PREFIX, single_line(header)));
    }

    for (category, members) in catalog::grouped() {
        if members.is_empty() {
            continue;
        }
        content.push_str(&format!("\n## {}\n\n", category.name));
        for entry in members {
            let checked =
                entry.is_required || settings.get(&entry.id).copied().unwrap_or(false);
            content.push_str(&format!("- {} {}\n", checkbox(checked), entry.id));
        }
    }

    if !extra.is_empty() {
        content.push_str(&format!("\n## {}\n\n", EXTRA_SECTION));
        for id in extra {
            let checked = settings.get(id).copied().unwrap_or(false);
            content.push_str(&format!("- {} {}\n", checkbox(checked), id));
        }
    }

    content
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"# macOS Setup Selection

Generated on: 2024-08-22 10:30:00 UTC

## Statistics

- **Selected**: 3 (1 CLI tools, 1 applications, 1 custom installations)

## Options

- [ ] include-updates
- [x] include-cleanup
- [x] verbose-output
- [ ] skip-confirmations
- [x] not-an-option
Header: Team laptop

## Development

- [x] visual-studio-code
- [ ] docker
- [x] git

## Extra

- [x] formula:ripgrep
- [ ] cask:arc
"#;

    #[test]
    fn test_read_selection_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("selection.md");
        fs::write(&path, SAMPLE)?;

        let file = read_selection_file(&path)?;

        assert_eq!(
            file.selected_ids(),
            vec!["visual-studio-code", "git", "formula:ripgrep"]
        );
        assert_eq!(file.settings().get("docker"), Some(&false));
        assert_eq!(file.extra_ids(), vec!["formula:ripgrep", "cask:arc"]);

        assert!(!file.options.include_updates);
        assert!(file.options.include_cleanup);
        assert!(file.options.verbose_output);
        assert!(!file.options.skip_confirmations);
        assert_eq!(file.options.custom_header.as_deref(), Some("Team laptop"));
        Ok(())
    }

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = read_selection_file(&temp_dir.path().join("absent.md"))?;
        assert!(file.items.is_empty());
        assert_eq!(file.options, GenerationOptions::default());
        Ok(())
    }

    #[test]
    fn test_generate_preserves_choices() {
        let mut settings = HashMap::new();
        settings.insert("git".to_string(), true);
        settings.insert("docker".to_string(), false);
        settings.insert("formula:ripgrep".to_string(), true);

        let options = GenerationOptions {
            skip_confirmations: true,
            custom_header: Some("line one\nline two".to_string()),
            ..GenerationOptions::default()
        };
        let extra = vec!["formula:ripgrep".to_string()];
        let content = generate_selection_content(&settings, &extra, &options, None);

        assert!(content.contains("# macOS Setup Selection"));
        assert!(content.contains("## Options"));
        assert!(content.contains("- [x] include-updates\n"));
        assert!(content.contains("- [x] skip-confirmations\n"));
        assert!(content.contains("Header: line one line two\n"));
        assert!(content.contains("- [x] git\n"));
        assert!(content.contains("- [ ] docker\n"));
        // Unknown to the settings means unchecked, except required entries
        assert!(content.contains("- [ ] slack\n"));
        assert!(content.contains("- [x] homebrew\n"));
        assert!(content.contains("## Extra\n\n- [x] formula:ripgrep\n"));
    }

    #[test]
    fn test_generated_file_reads_back() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("selection.md");

        let mut settings = HashMap::new();
        settings.insert("git".to_string(), true);
        let options = GenerationOptions {
            include_cleanup: false,
            ..GenerationOptions::default()
        };
        fs::write(
            &path,
            generate_selection_content(&settings, &[], &options, None),
        )?;

        let file = read_selection_file(&path)?;
        assert_eq!(file.options, options);
        let selected = file.selected_ids();
        assert!(selected.contains(&"git".to_string()));
        assert!(selected.contains(&"homebrew".to_string()));
        assert_eq!(selected.len(), 2);
        Ok(())
    }

    #[test]
    fn test_parse_checkbox() {
        assert_eq!(parse_checkbox("- [x] git"), Some(("git".to_string(), true)));
        assert_eq!(parse_checkbox("- [ ] node"), Some(("node".to_string(), false)));
        assert_eq!(parse_checkbox("## Development"), None);
        assert_eq!(parse_checkbox("- [x] "), None);
    }

    #[test]
    fn test_get_config_path_development() -> Result<()> {
        std::env::set_var("CARGO_MANIFEST_DIR", "/some/path");

        let path = get_config_path(&None)?;
        assert_eq!(path, PathBuf::from("./brew-selection.md"));
        Ok(())
    }

    #[test]
    fn test_get_config_path_custom() -> Result<()> {
        let custom_path = Some("/custom/path/selection.md".to_string());
        let path = get_config_path(&custom_path)?;
        assert_eq!(path, PathBuf::from("/custom/path/selection.md"));
        Ok(())
    }
}
