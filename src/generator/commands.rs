use super::{single_line, Buckets, GENERATOR_NAME};
use crate::package::PackageEntry;

pub(super) fn render(buckets: &Buckets) -> String {
    let mut content = String::from("# macOS setup commands\n");
    content.push_str(&format!("# Generated by {}\n", GENERATOR_NAME));

    let groups: [(&str, &[&PackageEntry]); 5] = [
        ("Homebrew", &buckets.bootstrap),
        ("Xcode Command Line Tools", &buckets.xcode),
        ("Command line tools", &buckets.formulae),
        ("Applications", &buckets.casks),
        ("Custom installations", &buckets.special),
    ];

    for (title, entries) in groups {
        if entries.is_empty() {
            continue;
        }
        content.push_str(&format!("\n# {}\n", title));
        for entry in entries {
            content.push_str(&format!(
                "{}  # {}\n",
                entry.install_command(false),
                single_line(&entry.name)
            ));
        }
    }

    content
}
