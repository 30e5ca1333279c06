use crate::catalog;
use crate::error::{Result, SetupError};
use crate::generator::{unmet_dependencies, UnmetDependency};
use crate::package::PackageEntry;

/// Ordered set of entries chosen for installation.
///
/// Ids are unique and insertion order is kept, since generated output
/// follows selection order within each bucket. Required catalog entries are
/// present from the start and cannot be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<PackageEntry>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            entries: catalog::required(),
        }
    }

    /// Builds a selection from ids, in the order given.
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self::new();
        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            selection.add(resolve(id)?);
        }
        Ok(selection)
    }

    /// Returns false when an entry with the same id is already selected.
    pub fn add(&mut self, entry: PackageEntry) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(position) = self.entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        if self.entries[position].is_required {
            return Err(SetupError::RequiredEntry(id.to_string()));
        }
        self.entries.remove(position);
        Ok(true)
    }

    /// Adds or removes the entry, returning whether it is selected afterwards.
    pub fn toggle(&mut self, entry: PackageEntry) -> Result<bool> {
        if self.contains(&entry.id) {
            self.remove(&entry.id)?;
            Ok(false)
        } else {
            self.add(entry);
            Ok(true)
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<PackageEntry> {
        self.entries
    }

    pub fn missing_dependencies(&self) -> Vec<UnmetDependency<'_>> {
        unmet_dependencies(&self.entries)
    }
}

/// Resolves a catalog id or an ad-hoc `formula:<token>` / `cask:<token>` id.
pub fn resolve(id: &str) -> Result<PackageEntry> {
    if let Some(entry) = catalog::find(id) {
        return Ok(entry);
    }

    let adhoc = if let Some(token) = id.strip_prefix("formula:") {
        Some(PackageEntry::formula(token.trim()))
    } else {
        id.strip_prefix("cask:").map(|token| PackageEntry::cask(token.trim()))
    };

    match adhoc {
        Some(entry) if !entry.install_token().is_empty() => {
            Ok(entry.with_category("Custom"))
        }
        _ => Err(SetupError::UnknownPackage(id.to_string())),
    }
}
