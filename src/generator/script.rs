use chrono::NaiveDate;

use super::{format_date, single_line, unmet_dependencies, Buckets, GenerationOptions, GENERATOR_NAME};
use crate::package::PackageEntry;
use crate::strategies::InstallerStrategy;

const RULE: &str = "==================================================";

pub(super) const CONTINUE_PROMPT: &str = r#"read -p "Continue with the installation? (y/n): " -n 1 -r"#;

const HOMEBREW_INSTALL: &str =
    r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

pub(super) fn render(
    selection: &[PackageEntry],
    buckets: &Buckets,
    options: &GenerationOptions,
    date: NaiveDate,
) -> String {
    let mut script = header(options, date);
    script.push_str(&progress_functions());
    script.push_str(&homebrew_bootstrap(options));

    if let Some((xcode, rest)) = buckets.xcode.split_first() {
        script.push_str(&xcode_tools(xcode, options));
        for entry in rest {
            script.push_str(&special_installation(entry, options));
        }
    }

    if !buckets.formulae.is_empty() {
        script.push_str(&brew_section(
            "Install command line tools",
            "Installing command line tools...",
            "Command line tools step finished",
            &buckets.formulae,
            options,
        ));
    }

    if !buckets.casks.is_empty() {
        script.push_str(&brew_section(
            "Install applications with Homebrew Cask",
            "Installing applications...",
            "Applications step finished",
            &buckets.casks,
            options,
        ));
    }

    for entry in &buckets.special {
        script.push_str(&special_installation(entry, options));
    }

    if options.include_cleanup {
        script.push_str(&cleanup());
    }

    script.push_str(&footer(selection, buckets));
    script
}

/// Escapes text for use inside a double-quoted bash string.
pub(super) fn quote(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in single_line(text).chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn header(options: &GenerationOptions, date: NaiveDate) -> String {
    let mut header = String::from("#!/bin/bash\n\n");
    header.push_str("# macOS Setup Script\n");
    header.push_str(&format!("# Generated by {}\n", GENERATOR_NAME));
    header.push_str(&format!("# Date: {}\n", format_date(date)));

    if let Some(custom) = options.custom_header.as_deref() {
        for line in custom.lines().map(str::trim).filter(|l| !l.is_empty()) {
            header.push_str(&format!("# {}\n", line));
        }
    }

    header.push_str("\nset -e  # Exit on any error\n\n");
    header.push_str("echo \"🍎 Starting macOS setup...\"\n");
    header.push_str(&format!("echo \"{}\"\n", RULE));
    header
}

fn progress_functions() -> String {
    format!(
        r#"
# Progress helpers
show_progress() {{
    echo ""
    echo "🔄 $1"
    echo "{RULE}"
}}

show_success() {{
    echo "✅ $1"
}}

show_error() {{
    echo "❌ Error: $1" >&2
}}

if [[ "$(uname)" != "Darwin" ]]; then
    show_error "This script only works on macOS"
    exit 1
fi
"#
    )
}

fn homebrew_bootstrap(options: &GenerationOptions) -> String {
    let mut block = format!(
        r#"
# Install Homebrew
show_progress "Installing Homebrew (package manager)..."
if ! command -v brew &> /dev/null; then
    {HOMEBREW_INSTALL}
    if [[ -x /opt/homebrew/bin/brew ]]; then
        echo 'eval "$(/opt/homebrew/bin/brew shellenv)"' >> ~/.zprofile
        eval "$(/opt/homebrew/bin/brew shellenv)"
    elif [[ -x /usr/local/bin/brew ]]; then
        eval "$(/usr/local/bin/brew shellenv)"
    fi
    show_success "Homebrew installed"
else
    show_success "Homebrew is already installed"
fi
"#
    );

    if options.include_updates {
        let verbose = if options.verbose_output { " --verbose" } else { "" };
        block.push_str(&format!(
            r#"
# Update Homebrew
show_progress "Updating Homebrew..."
brew update
brew upgrade{verbose}
show_success "Homebrew updated"
"#
        ));
    }

    block
}

fn xcode_tools(entry: &PackageEntry, options: &GenerationOptions) -> String {
    let wait = if options.skip_confirmations {
        "    echo \"    Waiting for the installation to finish...\"\n    \
         until xcode-select -p &> /dev/null; do sleep 5; done\n"
            .to_string()
    } else {
        "    echo \"    Follow the instructions and press Enter when it is done.\"\n    \
         read -p \"Press Enter to continue...\"\n"
            .to_string()
    };

    format!(
        r#"
# Install Xcode Command Line Tools
show_progress "Installing Xcode Command Line Tools..."
if ! xcode-select -p &> /dev/null; then
    {command}
    echo "⚠️  A window will open to install the Xcode Command Line Tools."
{wait}    show_success "Xcode Command Line Tools installed"
else
    show_success "Xcode Command Line Tools are already installed"
fi
"#,
        command = entry.install_command(false),
    )
}

/// Wraps a command in a brace group so it can be used verbatim as an `if` condition.
fn condition(command: &str) -> String {
    let command = command.trim();
    if command.contains('\n') {
        format!("{{\n{}\n}}", command)
    } else {
        format!("{{\n    {}\n}}", command)
    }
}

/// Failure branch body: report, then optionally ask whether to keep going.
fn failure_branch(name: &str, options: &GenerationOptions) -> String {
    let mut branch = format!("    show_error \"Failed to install {}\"\n", quote(name));
    if !options.skip_confirmations {
        branch.push_str(&format!("    {}\n", CONTINUE_PROMPT));
        branch.push_str("    echo \"\"\n");
        branch.push_str("    if [[ ! $REPLY =~ ^[Yy]$ ]]; then\n");
        branch.push_str("        echo \"Installation cancelled.\"\n");
        branch.push_str("        exit 1\n");
        branch.push_str("    fi\n");
    }
    branch
}

fn brew_section(
    comment: &str,
    progress: &str,
    done: &str,
    entries: &[&PackageEntry],
    options: &GenerationOptions,
) -> String {
    let mut section = format!("\n# {}\nshow_progress \"{}\"\n", comment, progress);

    for entry in entries {
        let name = quote(&entry.name);
        section.push_str(&format!("echo \"  → Installing {}...\"\n", name));
        section.push_str(&format!(
            "if {}; then\n",
            condition(&entry.install_command(options.verbose_output))
        ));
        section.push_str(&format!("    show_success \"{} installed\"\n", name));
        section.push_str("else\n");
        section.push_str(&failure_branch(&entry.name, options));
        section.push_str("fi\n");
    }

    section.push_str(&format!("echo \"{}\"\n", done));
    section
}

fn special_installation(entry: &PackageEntry, options: &GenerationOptions) -> String {
    let name = quote(&entry.name);
    let command = entry.install_command(options.verbose_output);

    let mut block = format!(
        "\n# {}\nshow_progress \"Installing {}...\"\n",
        single_line(&entry.name),
        name
    );

    match InstallerStrategy::lookup(entry) {
        Some(strategy) => {
            block.push_str(&format!("if {}; then\n", strategy.presence_check));
            block.push_str(&format!("    show_success \"{} is already installed\"\n", name));
            block.push_str(&format!("elif {}; then\n", condition(&command)));
            block.push_str(&format!("    show_success \"{} installed\"\n", name));
            if let Some(note) = strategy.success_note {
                block.push_str(&format!("    echo \"💡 {}\"\n", quote(note)));
            }
        }
        None => {
            block.push_str(&format!("if {}; then\n", condition(&command)));
            block.push_str(&format!("    show_success \"{} installed\"\n", name));
        }
    }

    block.push_str("else\n");
    block.push_str(&failure_branch(&entry.name, options));
    block.push_str("fi\n");
    block
}

fn cleanup() -> String {
    r#"
# Cleanup
show_progress "Cleaning up temporary files..."
brew cleanup
show_success "Cleanup complete"
"#
    .to_string()
}

fn footer(selection: &[PackageEntry], buckets: &Buckets) -> String {
    let mut footer = String::from("\n# Summary\necho \"\"\n");
    footer.push_str("echo \"🎉 Setup complete!\"\n");
    footer.push_str(&format!("echo \"{}\"\n", RULE));
    footer.push_str("echo \"Installed apps:\"\n");

    for entry in selection {
        footer.push_str(&format!(
            "echo \"  - {} ({})\"\n",
            quote(&entry.name),
            entry.install_type.kind_label()
        ));
    }
    footer.push_str("echo \"\"\n");

    let notes: Vec<_> = selection
        .iter()
        .filter_map(|e| e.post_install_notes.as_deref().map(|n| (e, n)))
        .filter(|(_, n)| !n.trim().is_empty())
        .collect();
    for (entry, note) in &notes {
        footer.push_str(&format!("echo \"💡 {}: {}\"\n", quote(&entry.name), quote(note)));
    }

    let unmet = unmet_dependencies(selection);
    for missing in &unmet {
        footer.push_str(&format!(
            "echo \"⚠️  {} expects {}, which was not part of this setup\"\n",
            quote(&missing.entry.name),
            quote(missing.dependency)
        ));
    }

    if !notes.is_empty() || !unmet.is_empty() {
        footer.push_str("echo \"\"\n");
    }

    footer.push_str("echo \"🔄 Restart any open apps to pick up every change.\"\n");
    footer.push_str(&format!(
        "echo \"📊 Summary: {} CLI tools (formulae), {} applications (casks), {} custom installations\"\n",
        buckets.formulae.len(),
        buckets.casks.len(),
        buckets.custom_count()
    ));
    footer
}
