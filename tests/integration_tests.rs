use brew_setup_generator::catalog;
use brew_setup_generator::{
    generate, generate_brewfile, generate_command_list, generate_on, parse_entries,
    read_selection_file, GenerationOptions, OutputFormat, Selection, EMPTY_SELECTION,
};
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 22).unwrap()
}

#[test]
fn test_whole_catalog_script() {
    let selection = catalog::entries();
    let script = generate_on(
        &selection,
        &GenerationOptions::default(),
        OutputFormat::Script,
        date(),
    )
    .unwrap();

    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains("# Date: 22/08/2024"));

    for entry in selection.iter().filter(|e| !e.is_bootstrap()) {
        assert!(script.contains(&entry.name), "{} missing", entry.id);
    }

    // Homebrew is installed once, by the bootstrap block
    assert_eq!(
        script
            .matches("raw.githubusercontent.com/Homebrew/install")
            .count(),
        1
    );
}

#[test]
fn test_generation_is_deterministic() {
    let selection = Selection::from_ids(["git", "slack", "nvm", "telegram", "xcode-tools"])
        .unwrap()
        .into_entries();
    let options = GenerationOptions {
        verbose_output: true,
        ..GenerationOptions::default()
    };

    for format in [OutputFormat::Script, OutputFormat::Commands, OutputFormat::Brewfile] {
        let first = generate_on(&selection, &options, format, date()).unwrap();
        let second = generate_on(&selection, &options, format, date()).unwrap();
        assert_eq!(first, second, "{} differs", format.as_str());
    }

    assert_eq!(
        generate_command_list(&selection).unwrap(),
        generate(&selection, &options, OutputFormat::Commands).unwrap()
    );
}

#[test]
fn test_script_sections_follow_bucket_order() {
    // Selection order deliberately mixes kinds
    let selection = Selection::from_ids(["oh-my-zsh", "slack", "git", "xcode-tools", "node"])
        .unwrap()
        .into_entries();
    let script = generate_on(
        &selection,
        &GenerationOptions::default(),
        OutputFormat::Script,
        date(),
    )
    .unwrap();

    let position = |needle: &str| {
        script
            .find(needle)
            .unwrap_or_else(|| panic!("{} not found", needle))
    };
    assert!(position("xcode-select") < position("brew install git"));
    assert!(position("brew install git") < position("brew install node"));
    assert!(position("brew install node") < position("brew install --cask slack"));
    assert!(position("brew install --cask slack") < position("oh-my-zsh"));
}

#[test]
fn test_entries_json_to_brewfile() {
    let json = r#"[
        {"id": "git", "name": "Git", "installType": "brew", "command": "brew install git"},
        {"id": "code", "name": "Visual Studio Code", "installType": "brew-cask",
         "command": "brew install --cask visual-studio-code"},
        {"id": "things", "name": "Things 3", "installType": "mas", "command": "904280696"}
    ]"#;

    let entries = parse_entries(json).unwrap();
    let brewfile = generate_brewfile(&entries).unwrap();

    assert!(brewfile.contains("brew \"git\"  # Git\n"));
    assert!(brewfile.contains("cask \"visual-studio-code\"  # Visual Studio Code\n"));
    assert!(brewfile.contains("mas \"Things 3\", id: 904280696\n"));
}

#[test]
fn test_empty_selection_outputs() {
    assert_eq!(generate_command_list(&[]).unwrap(), EMPTY_SELECTION);
    assert_eq!(generate_brewfile(&[]).unwrap(), EMPTY_SELECTION);
}

#[test]
fn test_selection_file_drives_generation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("selection.md");

    let content = r#"This is not a proper selection file
Random text without checkboxes
- Invalid checkbox format
- [x Invalid bracket

## Options

- [x] skip-confirmations
- [ ] include-updates

## Development

- [x] git
- [ ] node

## Extra

- [x] cask:arc
"#;
    fs::write(&path, content).unwrap();

    let file = read_selection_file(&path).unwrap();
    assert_eq!(file.selected_ids(), vec!["git", "cask:arc"]);

    let selection = Selection::from_ids(file.selected_ids()).unwrap();
    let script = generate_on(
        selection.entries(),
        &file.options,
        OutputFormat::Script,
        date(),
    )
    .unwrap();

    assert!(script.contains("brew install git"));
    assert!(script.contains("brew install --cask arc"));
    assert!(!script.contains("read -p"));
    assert!(!script.contains("brew update"));
}
