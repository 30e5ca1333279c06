use crate::generator::{unmet_dependencies, Buckets};
use crate::package::PackageEntry;

#[derive(Debug, Clone)]
pub struct SelectionStats {
    pub total: usize,
    pub formulae: usize,
    pub casks: usize,
    pub custom: usize,
    pub by_category: Vec<(String, usize)>,
    pub unmet_dependencies: usize,
    pub changes: SelectionChanges,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SelectionStats {
    pub fn collect(selected: &[PackageEntry], previous_ids: Option<&[String]>) -> Self {
        let buckets = Buckets::partition(selected);

        let mut by_category: Vec<(String, usize)> = Vec::new();
        for entry in selected {
            let category = if entry.category.is_empty() {
                "Custom"
            } else {
                entry.category.as_str()
            };
            match by_category.iter_mut().find(|(name, _)| name == category) {
                Some((_, count)) => *count += 1,
                None => by_category.push((category.to_string(), 1)),
            }
        }

        let current_ids: Vec<String> = selected.iter().map(|e| e.id.clone()).collect();
        let changes = previous_ids
            .map(|previous| calculate_changes(&current_ids, previous))
            .unwrap_or_default();

        SelectionStats {
            total: selected.len(),
            formulae: buckets.formulae.len(),
            casks: buckets.casks.len(),
            custom: buckets.custom_count(),
            by_category,
            unmet_dependencies: unmet_dependencies(selected).len(),
            changes,
        }
    }

    pub fn format_as_markdown(&self) -> String {
        let mut content = String::new();

        content.push_str("## Statistics\n\n");

        content.push_str(&format!(
            "- **Selected**: {} ({} CLI tools, {} applications, {} custom installations)\n",
            self.total, self.formulae, self.casks, self.custom
        ));

        if !self.by_category.is_empty() {
            let categories: Vec<String> = self
                .by_category
                .iter()
                .map(|(name, count)| format!("{} {}", name, count))
                .collect();
            content.push_str(&format!("- **By Category**: {}\n", categories.join(", ")));
        }

        if self.unmet_dependencies > 0 {
            content.push_str(&format!(
                "- **Unmet Dependencies**: {}\n",
                self.unmet_dependencies
            ));
        }

        if self.changes.has_changes() {
            content.push_str("- **Changes Since Last Save**:");
            if !self.changes.added.is_empty() {
                content.push_str(&format!(" +{}", self.changes.added.len()));
            }
            if !self.changes.removed.is_empty() {
                content.push_str(&format!(" -{}", self.changes.removed.len()));
            }
            content.push('\n');
        }

        content.push('\n');
        content
    }
}

impl SelectionChanges {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

fn calculate_changes(current: &[String], previous: &[String]) -> SelectionChanges {
    SelectionChanges {
        added: current
            .iter()
            .filter(|id| !previous.contains(id))
            .cloned()
            .collect(),
        removed: previous
            .iter()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect(),
    }
}
