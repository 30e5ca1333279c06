//! Curated catalog of installable macOS apps and tools.

use crate::package::InstallType::{AppStore, Cask, Custom, Formula, Script, XcodeTools};
use crate::package::{InstallType, PackageEntry};

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub static CATEGORIES: &[Category] = &[
    Category {
        id: "development",
        name: "Development",
        description: "Tools for developers",
    },
    Category {
        id: "productivity",
        name: "Productivity",
        description: "Apps that help you get more done",
    },
    Category {
        id: "multimedia",
        name: "Multimedia",
        description: "Audio, video and entertainment",
    },
    Category {
        id: "utilities",
        name: "Utilities",
        description: "System tools",
    },
    Category {
        id: "configuration",
        name: "Configuration",
        description: "System and shell configuration",
    },
    Category {
        id: "custom",
        name: "Custom",
        description: "Custom and special installations",
    },
];

struct CatalogItem {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    install_type: InstallType,
    command: &'static str,
    is_required: bool,
    is_special: bool,
    dependencies: &'static [&'static str],
    post_install_notes: Option<&'static str>,
}

const fn app(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    install_type: InstallType,
    command: &'static str,
) -> CatalogItem {
    CatalogItem {
        id,
        name,
        description,
        category,
        install_type,
        command,
        is_required: false,
        is_special: false,
        dependencies: &[],
        post_install_notes: None,
    }
}

const fn special(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    install_type: InstallType,
    command: &'static str,
    dependencies: &'static [&'static str],
    notes: &'static str,
) -> CatalogItem {
    CatalogItem {
        id,
        name,
        description,
        category: "Custom",
        install_type,
        command,
        is_required: false,
        is_special: true,
        dependencies,
        post_install_notes: Some(notes),
    }
}

#[rustfmt::skip]
static CATALOG: &[CatalogItem] = &[
    // Development
    app("visual-studio-code", "Visual Studio Code", "Modern, powerful code editor", "Development", Cask, "visual-studio-code"),
    app("git", "Git", "Distributed version control system", "Development", Formula, "git"),
    app("node", "Node.js", "JavaScript runtime", "Development", Formula, "node"),
    app("python", "Python", "Interpreted programming language", "Development", Formula, "python"),
    app("yarn", "Yarn", "JavaScript package manager", "Development", Formula, "yarn"),
    app("docker", "Docker Desktop", "Application containerization", "Development", Cask, "docker"),
    app("iterm2", "iTerm2", "Advanced terminal for macOS", "Development", Cask, "iterm2"),
    app("postman", "Postman", "API testing tool", "Development", Cask, "postman"),
    app("github-desktop", "GitHub Desktop", "Graphical client for Git and GitHub", "Development", Cask, "github"),
    app("insomnia", "Insomnia", "REST and GraphQL client", "Development", Cask, "insomnia"),
    // Productivity
    app("google-chrome", "Google Chrome", "Modern web browser", "Productivity", Cask, "google-chrome"),
    app("firefox", "Firefox", "Open source web browser", "Productivity", Cask, "firefox"),
    app("notion", "Notion", "All-in-one workspace", "Productivity", Cask, "notion"),
    app("slack", "Slack", "Team communication", "Productivity", Cask, "slack"),
    app("zoom", "Zoom", "Video conferencing", "Productivity", Cask, "zoom"),
    app("obsidian", "Obsidian", "Notes and knowledge management", "Productivity", Cask, "obsidian"),
    app("raycast", "Raycast", "Launcher and productivity tools", "Productivity", Cask, "raycast"),
    CatalogItem {
        post_install_notes: Some("Sign in with your phone number"),
        ..app("telegram", "Telegram", "Messaging app from the Mac App Store", "Productivity", AppStore, "747648890")
    },
    // Multimedia
    app("vlc", "VLC Media Player", "Universal media player", "Multimedia", Cask, "vlc"),
    app("spotify", "Spotify", "Music streaming", "Multimedia", Cask, "spotify"),
    app("handbrake", "HandBrake", "Video transcoder", "Multimedia", Cask, "handbrake"),
    app("audacity", "Audacity", "Free audio editor", "Multimedia", Cask, "audacity"),
    app("obs", "OBS Studio", "Recording and streaming software", "Multimedia", Cask, "obs"),
    // Utilities
    app("the-unarchiver", "The Unarchiver", "Archive extractor", "Utilities", Cask, "the-unarchiver"),
    app("appcleaner", "AppCleaner", "Thorough app uninstaller", "Utilities", Cask, "appcleaner"),
    app("rectangle", "Rectangle", "Window manager", "Utilities", Cask, "rectangle"),
    app("coconutbattery", "coconutBattery", "Battery monitor", "Utilities", Cask, "coconutbattery"),
    app("cleanmymac", "CleanMyMac X", "System cleanup and optimization", "Utilities", Cask, "cleanmymac"),
    app("wget", "wget", "File download tool", "Utilities", Formula, "wget"),
    // Configuration
    CatalogItem {
        is_required: true,
        is_special: true,
        ..app(
            "homebrew",
            "Homebrew",
            "Package manager for macOS (required)",
            "Configuration",
            Script,
            r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#,
        )
    },
    app("mas", "Mac App Store CLI", "Install App Store apps from the terminal", "Configuration", Formula, "mas"),
    CatalogItem {
        category: "Configuration",
        ..special(
            "xcode-tools",
            "Xcode Command Line Tools",
            "Apple developer tools",
            XcodeTools,
            "xcode-select --install",
            &[],
            "A dialog will open to finish the installation. Follow its instructions.",
        )
    },
    // Custom installations
    special(
        "oh-my-zsh",
        "Oh My Zsh",
        "Zsh framework with plugins and themes",
        Custom,
        r#"sh -c "$(curl -fsSL https://raw.github.com/ohmyzsh/ohmyzsh/master/tools/install.sh)""#,
        &[],
        "To activate Oh My Zsh, restart your terminal or run: source ~/.zshrc",
    ),
    special(
        "powerlevel10k",
        "Powerlevel10k",
        "Fast, highly configurable Zsh theme",
        Custom,
        "git clone --depth=1 https://github.com/romkatv/powerlevel10k.git ${ZSH_CUSTOM:-$HOME/.oh-my-zsh/custom}/themes/powerlevel10k",
        &["oh-my-zsh"],
        r#"Set ZSH_THEME="powerlevel10k/powerlevel10k" in ~/.zshrc and run: p10k configure"#,
    ),
    special(
        "xcode-full",
        "Xcode",
        "Apple's full IDE for iOS and macOS development",
        Custom,
        "mas install 497799835",
        &["mas"],
        "Xcode is a large download (~15GB). Make sure you have enough free space.",
    ),
    special(
        "nvm",
        "Node Version Manager",
        "Node.js version manager",
        Custom,
        "curl -o- https://raw.githubusercontent.com/nvm-sh/nvm/v0.39.4/install.sh | bash",
        &[],
        "Restart your terminal and run: nvm install node && nvm use node",
    ),
    special(
        "rustup",
        "Rust Toolchain",
        "Rust installer and version manager",
        Custom,
        r#"curl --proto "=https" --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y"#,
        &[],
        "Restart your terminal or run: source ~/.cargo/env",
    ),
    special(
        "deno",
        "Deno Runtime",
        "Modern runtime for JavaScript and TypeScript",
        Custom,
        "curl -fsSL https://deno.land/install.sh | sh",
        &[],
        "Add ~/.deno/bin to the PATH in your ~/.zshrc",
    ),
    special(
        "bun",
        "Bun Runtime",
        "Very fast JavaScript/TypeScript runtime",
        Custom,
        "curl -fsSL https://bun.sh/install | bash",
        &[],
        "Restart your terminal to use bun",
    ),
];

impl CatalogItem {
    fn to_entry(&self) -> PackageEntry {
        PackageEntry {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category.to_string(),
            install_type: self.install_type,
            command: self.command.to_string(),
            is_required: self.is_required,
            is_special: self.is_special,
            dependencies: self.dependencies.iter().map(|d| d.to_string()).collect(),
            post_install_notes: self.post_install_notes.map(str::to_string),
        }
    }
}

pub fn entries() -> Vec<PackageEntry> {
    CATALOG.iter().map(CatalogItem::to_entry).collect()
}

pub fn find(id: &str) -> Option<PackageEntry> {
    CATALOG.iter().find(|item| item.id == id).map(CatalogItem::to_entry)
}

/// Entries that every selection must contain.
pub fn required() -> Vec<PackageEntry> {
    CATALOG
        .iter()
        .filter(|item| item.is_required)
        .map(CatalogItem::to_entry)
        .collect()
}

pub fn categories() -> &'static [Category] {
    CATEGORIES
}

/// Catalog entries grouped by category, in category order.
pub fn grouped() -> Vec<(&'static Category, Vec<PackageEntry>)> {
    let all = entries();
    CATEGORIES
        .iter()
        .map(|category| {
            let members = all
                .iter()
                .filter(|entry| entry.category == category.name)
                .cloned()
                .collect();
            (category, members)
        })
        .collect()
}
