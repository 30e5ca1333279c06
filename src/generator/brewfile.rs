use super::{single_line, Buckets, GENERATOR_NAME};
use crate::package::{InstallType, PackageEntry};

pub(super) fn render(buckets: &Buckets) -> String {
    let mut content = format!("# Brewfile generated by {}\n", GENERATOR_NAME);
    content.push_str("# Requires Homebrew: https://brew.sh\n");

    let taps = taps(buckets.formulae.iter().chain(&buckets.casks).copied());
    if !taps.is_empty() {
        content.push('\n');
        for tap in &taps {
            content.push_str(&format!("tap \"{}\"\n", tap));
        }
    }

    if !buckets.formulae.is_empty() {
        content.push_str("\n# Command line tools\n");
        for entry in &buckets.formulae {
            content.push_str(&format!(
                "brew \"{}\"  # {}\n",
                entry.install_token(),
                single_line(&entry.name)
            ));
        }
    }

    if !buckets.casks.is_empty() {
        content.push_str("\n# Applications\n");
        for entry in &buckets.casks {
            content.push_str(&format!(
                "cask \"{}\"  # {}\n",
                entry.install_token(),
                single_line(&entry.name)
            ));
        }
    }

    let (app_store, manual): (Vec<&PackageEntry>, Vec<&PackageEntry>) = buckets
        .special
        .iter()
        .copied()
        .partition(|entry| app_store_id(entry).is_some());

    if !app_store.is_empty() {
        content.push_str("\n# Mac App Store\n");
        for entry in &app_store {
            if let Some(id) = app_store_id(entry) {
                content.push_str(&format!(
                    "mas \"{}\", id: {}\n",
                    single_line(&entry.name).replace('"', "'"),
                    id
                ));
            }
        }
    }

    let manual: Vec<&PackageEntry> = buckets.xcode.iter().chain(&manual).copied().collect();
    if !manual.is_empty() {
        content.push_str("\n# Manual installation required (not expressible in Brewfile syntax):\n");
        for entry in manual {
            content.push_str(&format!(
                "# - {}: {}\n",
                single_line(&entry.name),
                single_line(&entry.install_command(false))
            ));
        }
    }

    content.push_str("\n# Install everything with: brew bundle --file=Brewfile\n");
    content
}

/// Third-party taps implied by fully-qualified `user/repo/name` tokens.
fn taps<'a>(entries: impl Iterator<Item = &'a PackageEntry>) -> Vec<String> {
    let mut taps: Vec<String> = Vec::new();
    for entry in entries {
        let parts: Vec<&str> = entry.install_token().split('/').collect();
        if let [user, repo, _name] = parts.as_slice() {
            let tap = format!("{}/{}", user, repo);
            if !taps.contains(&tap) {
                taps.push(tap);
            }
        }
    }
    taps
}

/// App Store id for `mas` entries and for custom commands of the form `mas install <id>`.
fn app_store_id(entry: &PackageEntry) -> Option<&str> {
    let token = match entry.install_type {
        InstallType::AppStore => entry.install_token(),
        InstallType::Custom | InstallType::Script => entry
            .command
            .trim()
            .strip_prefix("mas install ")
            .map(str::trim)?,
        _ => return None,
    };
    let numeric = !token.is_empty() && token.chars().all(|c| c.is_ascii_digit());
    numeric.then_some(token)
}
