use clap::ValueEnum;

use crate::package::{InstallType, PackageEntry};

/// CPU architectures a Mac can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Architecture {
    /// Apple Silicon
    Arm64,
    Intel,
}

impl Architecture {
    /// Architecture of the machine running this binary, if it is a Mac one.
    pub fn current() -> Option<Self> {
        match std::env::consts::ARCH {
            "aarch64" => Some(Architecture::Arm64),
            "x86_64" => Some(Architecture::Intel),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Arm64 => "Apple Silicon",
            Architecture::Intel => "Intel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchitectureSupport {
    pub arm64: bool,
    pub intel: bool,
}

impl ArchitectureSupport {
    pub const UNIVERSAL: Self = Self {
        arm64: true,
        intel: true,
    };

    pub const INTEL_ONLY: Self = Self {
        arm64: false,
        intel: true,
    };

    pub fn supports(&self, arch: Architecture) -> bool {
        match arch {
            Architecture::Arm64 => self.arm64,
            Architecture::Intel => self.intel,
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.arm64, self.intel) {
            (true, true) => "Apple Silicon + Intel",
            (false, true) => "Intel only",
            (true, false) => "Apple Silicon only",
            (false, false) => "unsupported",
        }
    }
}

const INTEL_ONLY_KNOWN: &[&str] = &["sourcetree", "vmware-fusion", "virtualbox"];

const UNIVERSAL_KNOWN: &[&str] = &[
    "google-chrome", "firefox", "microsoft-edge", "brave-browser", "opera",
    "visual-studio-code", "docker", "postman", "github", "sublime-text", "webstorm",
    "intellij-idea", "android-studio", "xcode", "slack", "discord", "telegram", "zoom",
    "microsoft-teams", "whatsapp", "spotify", "vlc", "plex", "figma", "sketch",
    "notion", "obsidian", "evernote", "dropbox", "google-drive", "rectangle", "alfred",
    "appcleaner", "the-unarchiver", "1password", "malwarebytes", "parallels", "git",
    "node", "python", "yarn", "wget", "curl", "vim", "neovim", "tmux", "htop", "tree",
    "jq", "ffmpeg", "imagemagick", "postgresql", "mysql", "redis",
];

const MODERN_TOOLS: &[&str] = &[
    "node", "python", "rust", "go", "java", "kotlin", "swift", "git", "yarn", "npm",
    "pnpm", "docker", "kubernetes", "terraform", "ansible", "aws", "gcp", "azure",
];

const LEGACY_TOOLS: &[&str] = &["fortran", "cobol", "pascal", "ada", "x11", "xorg", "gtk2"];

const POPULAR_APPS: &[&str] = &[
    "chrome", "firefox", "safari", "edge", "brave", "code", "atom", "sublime", "slack",
    "discord", "telegram", "zoom", "teams", "spotify", "youtube", "figma", "sketch",
    "canva", "notion", "obsidian", "evernote",
];

const LEGACY_APPS: &[&str] = &[
    "virtualbox", "vmware", "parallels", "x11", "xquartz", "wine", "flash", "shockwave",
    "silverlight",
];

fn known(key: &str) -> Option<ArchitectureSupport> {
    if INTEL_ONLY_KNOWN.contains(&key) {
        Some(ArchitectureSupport::INTEL_ONLY)
    } else if UNIVERSAL_KNOWN.contains(&key) {
        Some(ArchitectureSupport::UNIVERSAL)
    } else {
        None
    }
}

/// Lowercase, with every run of non-alphanumerics collapsed to one dash.
fn normalize(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c);
        } else if !normalized.is_empty() && !normalized.ends_with('-') {
            normalized.push('-');
        }
    }
    normalized.trim_end_matches('-').to_string()
}

/// Known or guessed architecture support for a Homebrew entry.
///
/// Only formulae and casks are rated; other install kinds return `None`.
pub fn support_for(entry: &PackageEntry) -> Option<ArchitectureSupport> {
    if !matches!(entry.install_type, InstallType::Formula | InstallType::Cask) {
        return None;
    }

    let token = entry.install_token().rsplit('/').next().unwrap_or_default();
    if let Some(support) = known(&entry.id)
        .or_else(|| known(token))
        .or_else(|| known(&normalize(&entry.name)))
    {
        return Some(support);
    }

    let haystack = format!("{} {}", entry.id, entry.name).to_lowercase();
    let matches_any = |patterns: &[&str]| patterns.iter().any(|p| haystack.contains(p));

    let (modern, legacy) = match entry.install_type {
        InstallType::Formula => (MODERN_TOOLS, LEGACY_TOOLS),
        _ => (POPULAR_APPS, LEGACY_APPS),
    };
    if !matches_any(modern) && matches_any(legacy) {
        Some(ArchitectureSupport::INTEL_ONLY)
    } else {
        Some(ArchitectureSupport::UNIVERSAL)
    }
}

/// Whether an entry can be installed on `arch`. Unrated entries are kept.
pub fn runs_on(entry: &PackageEntry, arch: Architecture) -> bool {
    support_for(entry).map_or(true, |support| support.supports(arch))
}
