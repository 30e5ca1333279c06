use serde::{Deserialize, Serialize};

use crate::error::{Result, SetupError};

/// Id of the package-manager bootstrap entry.
pub const BOOTSTRAP_ID: &str = "homebrew";

const CASK_PREFIX: &str = "brew install --cask ";
const FORMULA_PREFIX: &str = "brew install ";
const MAS_PREFIX: &str = "mas install ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallType {
    #[serde(alias = "brew")]
    Formula,
    #[serde(alias = "brew-cask")]
    Cask,
    #[serde(alias = "curl-script")]
    Script,
    #[serde(alias = "xcode-select")]
    XcodeTools,
    #[serde(alias = "mas")]
    AppStore,
    Custom,
}

impl InstallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallType::Formula => "formula",
            InstallType::Cask => "cask",
            InstallType::Script => "script",
            InstallType::XcodeTools => "xcode-tools",
            InstallType::AppStore => "app-store",
            InstallType::Custom => "custom",
        }
    }

    /// Label shown next to each entry in the script summary.
    pub fn kind_label(&self) -> &'static str {
        match self {
            InstallType::Formula => "CLI tool",
            InstallType::Cask => "Application",
            InstallType::Script => "Script",
            InstallType::XcodeTools => "Xcode tools",
            InstallType::AppStore => "App Store",
            InstallType::Custom => "Custom",
        }
    }
}

/// An installable entry, either from the curated catalog or discovered by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub install_type: InstallType,
    pub command: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_install_notes: Option<String>,
}

impl PackageEntry {
    pub fn new(id: &str, name: &str, install_type: InstallType, command: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: String::new(),
            install_type,
            command: command.to_string(),
            is_required: false,
            is_special: false,
            dependencies: Vec::new(),
            post_install_notes: None,
        }
    }

    /// Ad-hoc formula entry, id `formula:<token>`.
    pub fn formula(token: &str) -> Self {
        Self::new(&format!("formula:{token}"), token, InstallType::Formula, token)
    }

    /// Ad-hoc cask entry, id `cask:<token>`.
    pub fn cask(token: &str) -> Self {
        Self::new(&format!("cask:{token}"), token, InstallType::Cask, token)
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.post_install_notes = Some(notes.to_string());
        self
    }

    pub fn with_dependencies(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn is_bootstrap(&self) -> bool {
        self.id == BOOTSTRAP_ID
    }

    /// The bare package token, with any known install prefix stripped.
    pub fn install_token(&self) -> &str {
        let command = self.command.trim();
        let stripped = match self.install_type {
            InstallType::Formula => command.strip_prefix(FORMULA_PREFIX),
            InstallType::Cask => command.strip_prefix(CASK_PREFIX),
            InstallType::AppStore => command.strip_prefix(MAS_PREFIX),
            _ => None,
        };
        stripped.unwrap_or(command).trim()
    }

    /// Shell invocation that installs this entry.
    pub fn install_command(&self, verbose: bool) -> String {
        let verbose_flag = if verbose { " --verbose" } else { "" };
        match self.install_type {
            InstallType::Formula => format!("brew install {}{}", self.install_token(), verbose_flag),
            InstallType::Cask => {
                format!("brew install --cask {}{}", self.install_token(), verbose_flag)
            }
            InstallType::AppStore => format!("mas install {}", self.install_token()),
            InstallType::Script | InstallType::XcodeTools | InstallType::Custom => {
                self.command.trim().to_string()
            }
        }
    }

    /// Rejects entries that would render a broken install line.
    pub fn validate(&self, index: usize) -> Result<()> {
        let missing = if self.id.trim().is_empty() {
            Some("id")
        } else if self.name.trim().is_empty() {
            Some("name")
        } else if self.install_token().is_empty() {
            Some("command")
        } else {
            None
        };

        match missing {
            Some(field) => Err(SetupError::InvalidEntry {
                index,
                id: self.id.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Loosely-typed entry as produced by collaborators (JSON files, other tools).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPackageEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub install_type: Option<InstallType>,
    pub command: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub post_install_notes: Option<String>,
}

impl RawPackageEntry {
    pub fn into_entry(self, index: usize) -> Result<PackageEntry> {
        let id = self.id.unwrap_or_default();
        let invalid = |field: &'static str| SetupError::InvalidEntry {
            index,
            id: id.clone(),
            field,
        };

        let name = self.name.ok_or_else(|| invalid("name"))?;
        let install_type = self.install_type.ok_or_else(|| invalid("installType"))?;
        let command = self.command.ok_or_else(|| invalid("command"))?;

        let entry = PackageEntry {
            id: id.clone(),
            name,
            description: self.description,
            category: self.category,
            install_type,
            command,
            is_required: self.is_required,
            is_special: self.is_special,
            dependencies: self.dependencies,
            post_install_notes: self.post_install_notes.filter(|n| !n.trim().is_empty()),
        };
        entry.validate(index)?;
        Ok(entry)
    }
}

/// Parses a JSON array of entries, failing on the first invalid one.
pub fn parse_entries(json: &str) -> Result<Vec<PackageEntry>> {
    let raw: Vec<RawPackageEntry> = serde_json::from_str(json)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_entry(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_command_templates() {
        let git = PackageEntry::new("git", "Git", InstallType::Formula, "git");
        assert_eq!(git.install_command(false), "brew install git");
        assert_eq!(git.install_command(true), "brew install git --verbose");

        let code = PackageEntry::new(
            "vscode",
            "Visual Studio Code",
            InstallType::Cask,
            "visual-studio-code",
        );
        assert_eq!(
            code.install_command(false),
            "brew install --cask visual-studio-code"
        );

        let telegram = PackageEntry::new("telegram", "Telegram", InstallType::AppStore, "747648890");
        assert_eq!(telegram.install_command(true), "mas install 747648890");

        let xcode = PackageEntry::new(
            "xcode-tools",
            "Xcode Command Line Tools",
            InstallType::XcodeTools,
            "xcode-select --install",
        );
        assert_eq!(xcode.install_command(true), "xcode-select --install");
    }

    #[test]
    fn test_install_token_strips_full_commands() {
        let cask = PackageEntry::new(
            "cask-vscode",
            "Visual Studio Code",
            InstallType::Cask,
            "brew install --cask visual-studio-code",
        );
        assert_eq!(cask.install_token(), "visual-studio-code");
        assert_eq!(
            cask.install_command(false),
            "brew install --cask visual-studio-code"
        );

        let formula = PackageEntry::new("git", "Git", InstallType::Formula, "brew install git");
        assert_eq!(formula.install_token(), "git");

        let script = PackageEntry::new("bun", "Bun", InstallType::Custom, "brew install bun");
        assert_eq!(script.install_token(), "brew install bun");
    }

    #[test]
    fn test_validate_rejects_missing_command() {
        let entry = PackageEntry::new("git", "Git", InstallType::Formula, "   ");
        let err = entry.validate(3).unwrap_err();
        assert!(matches!(
            err,
            SetupError::InvalidEntry {
                index: 3,
                field: "command",
                ..
            }
        ));
        assert!(err.to_string().contains("missing command"));

        let prefix_only = PackageEntry::new("x", "X", InstallType::Cask, "brew install --cask ");
        assert!(prefix_only.validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_id_and_name() {
        let entry = PackageEntry::new("  ", "Git", InstallType::Formula, "git");
        assert!(matches!(
            entry.validate(0),
            Err(SetupError::InvalidEntry { field: "id", .. })
        ));

        let entry = PackageEntry::new("git", "", InstallType::Formula, "git");
        let err = entry.validate(1).unwrap_err();
        assert!(matches!(
            err,
            SetupError::InvalidEntry {
                index: 1,
                field: "name",
                ..
            }
        ));
        assert!(err.to_string().contains("missing name"));
    }

    #[test]
    fn test_parse_entries_accepts_legacy_install_types() -> Result<()> {
        let json = r#"[
            {"id": "git", "name": "Git", "installType": "brew", "command": "brew install git"},
            {"id": "code", "name": "VS Code", "installType": "brew-cask", "command": "visual-studio-code",
             "category": "Development", "postInstallNotes": ""}
        ]"#;

        let entries = parse_entries(json)?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].install_type, InstallType::Formula);
        assert_eq!(entries[1].install_type, InstallType::Cask);
        assert_eq!(entries[1].post_install_notes, None);
        Ok(())
    }

    #[test]
    fn test_parse_entries_reports_missing_field() {
        let json = r#"[
            {"id": "git", "name": "Git", "installType": "formula", "command": "git"},
            {"id": "broken", "name": "Broken", "installType": "cask"}
        ]"#;

        match parse_entries(json) {
            Err(SetupError::InvalidEntry { index, id, field }) => {
                assert_eq!(index, 1);
                assert_eq!(id, "broken");
                assert_eq!(field, "command");
            }
            other => panic!("expected invalid entry, got {:?}", other),
        }
    }

    #[test]
    fn test_adhoc_constructors() {
        let entry = PackageEntry::formula("ripgrep");
        assert_eq!(entry.id, "formula:ripgrep");
        assert_eq!(entry.install_command(false), "brew install ripgrep");

        let entry = PackageEntry::cask("arc");
        assert_eq!(entry.id, "cask:arc");
        assert_eq!(entry.install_type.kind_label(), "Application");
    }
}
