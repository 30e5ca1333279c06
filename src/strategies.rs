use crate::package::PackageEntry;

/// Install strategy for a well-known tool that needs an idempotency check.
#[derive(Debug, Clone)]
pub struct InstallerStrategy {
    /// Catalog id the strategy is keyed on
    pub id: &'static str,

    /// Other ids or lowercase names that resolve to this strategy
    pub aliases: &'static [&'static str],

    /// Bash condition that succeeds when the tool is already present
    pub presence_check: &'static str,

    /// Hint printed right after a fresh install
    pub success_note: Option<&'static str>,
}

pub static INSTALLERS: &[InstallerStrategy] = &[
    InstallerStrategy {
        id: "oh-my-zsh",
        aliases: &["ohmyzsh", "oh my zsh"],
        presence_check: r#"[ -d "$HOME/.oh-my-zsh" ]"#,
        success_note: Some("Restart your terminal to start using Oh My Zsh"),
    },
    InstallerStrategy {
        id: "powerlevel10k",
        aliases: &["p10k"],
        presence_check: r#"[ -d "${ZSH_CUSTOM:-$HOME/.oh-my-zsh/custom}/themes/powerlevel10k" ]"#,
        success_note: None,
    },
    InstallerStrategy {
        id: "nvm",
        aliases: &["node version manager", "node-version-manager"],
        presence_check: r#"[ -s "${NVM_DIR:-$HOME/.nvm}/nvm.sh" ]"#,
        success_note: Some("Load nvm in new shells from ~/.nvm/nvm.sh"),
    },
    InstallerStrategy {
        id: "rustup",
        aliases: &["rust", "rust toolchain"],
        presence_check: r#"command -v rustup &> /dev/null || [ -x "$HOME/.cargo/bin/rustup" ]"#,
        success_note: Some("Cargo binaries live in ~/.cargo/bin"),
    },
    InstallerStrategy {
        id: "deno",
        aliases: &["deno runtime"],
        presence_check: r#"command -v deno &> /dev/null || [ -x "$HOME/.deno/bin/deno" ]"#,
        success_note: None,
    },
    InstallerStrategy {
        id: "bun",
        aliases: &["bun runtime"],
        presence_check: r#"command -v bun &> /dev/null || [ -x "$HOME/.bun/bin/bun" ]"#,
        success_note: None,
    },
    InstallerStrategy {
        id: "xcode-full",
        aliases: &["xcode"],
        presence_check: r#"[ -d "/Applications/Xcode.app" ]"#,
        success_note: Some("Open Xcode once to accept the license"),
    },
];

impl InstallerStrategy {
    pub fn get_by_id(id: &str) -> Option<&'static InstallerStrategy> {
        INSTALLERS.iter().find(|s| s.id == id)
    }

    /// Finds the strategy for an entry by id, then by alias on id or name.
    pub fn lookup(entry: &PackageEntry) -> Option<&'static InstallerStrategy> {
        let id = entry.id.to_lowercase();
        let name = entry.name.to_lowercase();

        Self::get_by_id(&id).or_else(|| {
            INSTALLERS
                .iter()
                .find(|s| s.aliases.iter().any(|alias| *alias == id || *alias == name))
        })
    }
}
