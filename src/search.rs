//! Package discovery beyond the curated catalog.
//!
//! Searches run against the local catalog first. Only when that yields too
//! few hits is the remote [`PackageIndex`] consulted, and a failing index
//! never fails the search: local results are returned on their own.

use serde::Deserialize;
use std::cell::Cell;
use std::sync::OnceLock;
use std::time::Duration;

use crate::architecture::{runs_on, Architecture};
use crate::catalog;
use crate::error::{Result, SetupError};
use crate::package::PackageEntry;
use crate::utils::log_operation;

const HOMEBREW_API_BASE: &str = "https://formulae.brew.sh/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const PAGE_SIZE: usize = 12;
/// Local hit count at which the remote index is skipped.
pub const LOCAL_THRESHOLD: usize = 6;
const PER_KIND_LIMIT: usize = 20;
const REMOTE_LIMIT: usize = 30;
const FEATURED_COUNT: usize = 24;

/// Source of installable packages that are not in the catalog.
pub trait PackageIndex {
    fn search(&self, query: &str) -> Result<Vec<PackageEntry>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFormula {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCask {
    pub token: String,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

/// Live index backed by the public Homebrew JSON API.
///
/// Both listings are downloaded at most once per instance.
pub struct HomebrewApiIndex {
    client: reqwest::blocking::Client,
    base_url: String,
    formulae: OnceLock<Vec<ApiFormula>>,
    casks: OnceLock<Vec<ApiCask>>,
}

impl std::fmt::Debug for HomebrewApiIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomebrewApiIndex")
            .field("base_url", &self.base_url)
            .field("formulae_loaded", &self.formulae.get().is_some())
            .field("casks_loaded", &self.casks.get().is_some())
            .finish()
    }
}

impl HomebrewApiIndex {
    pub fn new() -> Result<Self> {
        Self::with_base_url(HOMEBREW_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("brew-setup-generator/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            formulae: OnceLock::new(),
            casks: OnceLock::new(),
        })
    }

    fn formulae(&self) -> Result<&[ApiFormula]> {
        if let Some(formulae) = self.formulae.get() {
            return Ok(formulae);
        }
        let url = format!("{}/formula.json", self.base_url);
        let fetched: Vec<ApiFormula> = self.client.get(&url).send()?.error_for_status()?.json()?;
        Ok(self.formulae.get_or_init(|| fetched))
    }

    fn casks(&self) -> Result<&[ApiCask]> {
        if let Some(casks) = self.casks.get() {
            return Ok(casks);
        }
        let url = format!("{}/cask.json", self.base_url);
        let fetched: Vec<ApiCask> = self.client.get(&url).send()?.error_for_status()?.json()?;
        Ok(self.casks.get_or_init(|| fetched))
    }
}

impl PackageIndex for HomebrewApiIndex {
    fn search(&self, query: &str) -> Result<Vec<PackageEntry>> {
        Ok(filter_listings(self.formulae()?, self.casks()?, query))
    }
}

/// Matches both listings against `query`, best matches first.
pub fn filter_listings(formulae: &[ApiFormula], casks: &[ApiCask], query: &str) -> Vec<PackageEntry> {
    let query = query.to_lowercase();
    let desc_matches =
        |desc: &Option<String>| desc.as_ref().is_some_and(|d| d.to_lowercase().contains(&query));

    let mut results: Vec<PackageEntry> = formulae
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&query) || desc_matches(&f.desc))
        .take(PER_KIND_LIMIT)
        .map(formula_entry)
        .collect();

    results.extend(
        casks
            .iter()
            .filter(|c| {
                c.token.to_lowercase().contains(&query)
                    || c.name.iter().any(|n| n.to_lowercase().contains(&query))
                    || desc_matches(&c.desc)
            })
            .take(PER_KIND_LIMIT)
            .map(cask_entry),
    );

    sort_by_relevance(&mut results, &query);
    results.truncate(REMOTE_LIMIT);
    results
}

fn formula_entry(formula: &ApiFormula) -> PackageEntry {
    let description = formula
        .desc
        .clone()
        .unwrap_or_else(|| "Command line tool".to_string());
    let category = guess_category(&formula.name, &description);
    PackageEntry::formula(&formula.name)
        .with_description(&description)
        .with_category(category)
}

fn cask_entry(cask: &ApiCask) -> PackageEntry {
    let name = cask.name.first().cloned().unwrap_or_else(|| cask.token.clone());
    let description = cask
        .desc
        .clone()
        .unwrap_or_else(|| "macOS application".to_string());
    let category = guess_category(&name, &description);

    let mut entry = PackageEntry::cask(&cask.token)
        .with_description(&description)
        .with_category(category);
    entry.name = name;
    entry
}

/// Keyword heuristic that places a remote package into a catalog category.
pub fn guess_category(name: &str, description: &str) -> &'static str {
    let text = format!("{} {}", name, description).to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if any(&["code", "development", "git", "editor", "terminal", "shell", "database", "sql"]) {
        "Development"
    } else if any(&["music", "video", "media", "player", "design", "photo", "image", "audio"]) {
        "Multimedia"
    } else if any(&["browser", "chat", "message", "slack", "note", "calendar", "mail"]) {
        "Productivity"
    } else if any(&["config", "dotfiles", "theme", "font"]) {
        "Configuration"
    } else {
        "Utilities"
    }
}

fn relevance(entry: &PackageEntry, query: &str) -> u8 {
    let name = if entry.name.to_lowercase().contains(query) { 2 } else { 0 };
    let id = if entry.id.to_lowercase().contains(query) { 1 } else { 0 };
    name + id
}

fn sort_by_relevance(entries: &mut [PackageEntry], query: &str) {
    entries.sort_by_key(|entry| std::cmp::Reverse(relevance(entry, query)));
}

/// Catalog entries whose name, description or id contain `query`.
pub fn local_search(query: &str) -> Vec<PackageEntry> {
    let query = query.trim().to_lowercase();
    let mut matches: Vec<PackageEntry> = catalog::entries()
        .into_iter()
        .filter(|entry| {
            format!("{} {} {}", entry.name, entry.description, entry.id)
                .to_lowercase()
                .contains(&query)
        })
        .collect();
    sort_by_relevance(&mut matches, &query);
    matches
}

/// Bounded in-memory cache of remote results keyed by normalized query.
#[derive(Clone)]
pub struct SearchCache {
    inner: moka::sync::Cache<String, Vec<PackageEntry>>,
}

impl SearchCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: moka::sync::Cache::new(capacity),
        }
    }

    pub fn get(&self, query: &str) -> Option<Vec<PackageEntry>> {
        self.inner.get(query)
    }

    pub fn insert(&self, query: &str, results: Vec<PackageEntry>) {
        self.inner.insert(query.to_string(), results);
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    Local,
    Api,
    Hybrid,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Local => "local",
            SearchSource::Api => "api",
            SearchSource::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<PackageEntry>,
    pub total: usize,
    pub has_more: bool,
    pub source: SearchSource,
}

impl SearchPage {
    fn paginate(all: Vec<PackageEntry>, page: usize, source: SearchSource) -> Self {
        let total = all.len();
        let start = page.saturating_mul(PAGE_SIZE);
        let end = start.saturating_add(PAGE_SIZE);
        SearchPage {
            results: all.into_iter().skip(start).take(PAGE_SIZE).collect(),
            total,
            has_more: end < total,
            source,
        }
    }
}

/// Local catalog search topped up from a remote index.
pub struct HybridSearch<'a> {
    index: &'a dyn PackageIndex,
    cache: SearchCache,
}

impl<'a> HybridSearch<'a> {
    pub fn new(index: &'a dyn PackageIndex) -> Self {
        Self {
            index,
            cache: SearchCache::default(),
        }
    }

    pub fn search(&self, query: &str, page: usize) -> SearchPage {
        self.search_for(query, page, None)
    }

    /// Like [`HybridSearch::search`], dropping entries that cannot run on `arch`
    /// before paging.
    pub fn search_for(&self, query: &str, page: usize, arch: Option<Architecture>) -> SearchPage {
        let (mut results, source) = self.collect(query);
        if let Some(arch) = arch {
            results.retain(|entry| runs_on(entry, arch));
        }
        SearchPage::paginate(results, page, source)
    }

    fn collect(&self, query: &str) -> (Vec<PackageEntry>, SearchSource) {
        let query = query.trim().to_lowercase();

        if query.is_empty() {
            let featured = catalog::entries()
                .into_iter()
                .filter(|entry| !entry.is_required)
                .take(FEATURED_COUNT)
                .collect();
            return (featured, SearchSource::Local);
        }

        let local = local_search(&query);
        if local.len() >= LOCAL_THRESHOLD {
            return (local, SearchSource::Local);
        }

        let remote = match self.remote(&query) {
            Ok(remote) => remote,
            Err(e) => {
                let _ = log_operation(&format!(
                    "WARN: remote search for '{}' failed, using local results: {}",
                    query, e
                ));
                return (local, SearchSource::Local);
            }
        };

        let local_count = local.len();
        let mut combined = local;
        for entry in remote {
            let duplicate = combined.iter().any(|existing| {
                existing.id == entry.id
                    || (existing.install_type == entry.install_type
                        && existing.install_token() == entry.install_token())
            });
            if !duplicate {
                combined.push(entry);
            }
        }

        let source = if combined.len() == local_count {
            SearchSource::Local
        } else if local_count == 0 {
            SearchSource::Api
        } else {
            SearchSource::Hybrid
        };
        (combined, source)
    }

    fn remote(&self, query: &str) -> Result<Vec<PackageEntry>> {
        if let Some(cached) = self.cache.get(query) {
            return Ok(cached);
        }
        let results = self.index.search(query)?;
        self.cache.insert(query, results.clone());
        Ok(results)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// In-memory index for tests and CI.
#[derive(Debug)]
pub struct MockPackageIndex {
    packages: Vec<PackageEntry>,
    fail: bool,
    calls: Cell<usize>,
}

impl Default for MockPackageIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPackageIndex {
    pub fn new() -> Self {
        let formula = |token: &str, desc: &str| {
            PackageEntry::formula(token)
                .with_description(desc)
                .with_category(guess_category(token, desc))
        };
        let cask = |token: &str, name: &str, desc: &str| {
            let mut entry = PackageEntry::cask(token)
                .with_description(desc)
                .with_category(guess_category(name, desc));
            entry.name = name.to_string();
            entry
        };

        Self::with_packages(vec![
            formula("ripgrep", "Search tool like grep and The Silver Searcher"),
            formula("fd", "Simple, fast and user-friendly alternative to find"),
            formula("jq", "Lightweight and flexible command-line JSON processor"),
            formula("git-lfs", "Git extension for versioning large files"),
            formula("postgresql@16", "Object-relational database system"),
            cask("arc", "Arc", "Chromium based browser"),
            cask("iina", "IINA", "Free and open-source media player"),
            cask("visual-studio-code", "Microsoft Visual Studio Code", "Open-source code editor"),
        ])
    }

    pub fn with_packages(packages: Vec<PackageEntry>) -> Self {
        Self {
            packages,
            fail: false,
            calls: Cell::new(0),
        }
    }

    /// An index whose every search fails.
    pub fn failing() -> Self {
        Self {
            packages: Vec::new(),
            fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl PackageIndex for MockPackageIndex {
    fn search(&self, query: &str) -> Result<Vec<PackageEntry>> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(SetupError::Search("index unavailable".to_string()));
        }

        let query = query.to_lowercase();
        let mut results: Vec<PackageEntry> = self
            .packages
            .iter()
            .filter(|entry| {
                format!("{} {} {}", entry.name, entry.description, entry.install_token())
                    .to_lowercase()
                    .contains(&query)
            })
            .cloned()
            .collect();
        sort_by_relevance(&mut results, &query);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::InstallType;

    #[test]
    fn test_local_search_prefers_name_matches() {
        let results = local_search("Code");
        assert!(!results.is_empty());
        assert_eq!(results[0].id, "visual-studio-code");
    }

    #[test]
    fn test_enough_local_hits_skip_remote() {
        let index = MockPackageIndex::new();
        let search = HybridSearch::new(&index);

        let query = "a";
        assert!(local_search(query).len() >= LOCAL_THRESHOLD);

        let page = search.search(query, 0);
        assert_eq!(page.source, SearchSource::Local);
        assert_eq!(index.calls(), 0);
        assert!(page.results.len() <= PAGE_SIZE);
    }

    #[test]
    fn test_remote_results_are_merged_without_duplicates() {
        let index = MockPackageIndex::new();
        let search = HybridSearch::new(&index);

        let page = search.search("visual studio", 0);
        assert_eq!(page.source, SearchSource::Local);
        assert_eq!(
            page.results
                .iter()
                .filter(|e| e.install_token() == "visual-studio-code")
                .count(),
            1
        );

        let page = search.search("ripgrep", 0);
        assert_eq!(page.source, SearchSource::Api);
        assert_eq!(page.results[0].id, "formula:ripgrep");
        assert_eq!(page.results[0].install_command(false), "brew install ripgrep");
    }

    #[test]
    fn test_remote_results_are_cached() {
        let index = MockPackageIndex::new();
        let search = HybridSearch::new(&index);

        search.search("ripgrep", 0);
        search.search("  RIPGREP ", 0);
        assert_eq!(index.calls(), 1);

        search.clear_cache();
        search.search("ripgrep", 0);
        assert_eq!(index.calls(), 2);
    }

    #[test]
    fn test_failing_index_degrades_to_local() {
        let index = MockPackageIndex::failing();
        let search = HybridSearch::new(&index);

        let page = search.search("docker", 0);
        assert_eq!(index.calls(), 1);
        assert_eq!(page.source, SearchSource::Local);
        assert!(page.results.iter().any(|e| e.id == "docker"));
    }

    #[test]
    fn test_architecture_filter_applies_before_paging() {
        let index = MockPackageIndex::with_packages(vec![
            PackageEntry::cask("virtualbox").with_description("Hypervisor"),
            PackageEntry::cask("utm").with_description("Hypervisor for Apple Silicon"),
        ]);
        let search = HybridSearch::new(&index);

        let arm = search.search_for("hypervisor", 0, Some(Architecture::Arm64));
        assert!(arm.results.iter().any(|e| e.id == "cask:utm"));
        assert!(arm.results.iter().all(|e| e.id != "cask:virtualbox"));
        assert_eq!(arm.total, arm.results.len());

        let intel = search.search_for("hypervisor", 0, Some(Architecture::Intel));
        assert!(intel.results.iter().any(|e| e.id == "cask:virtualbox"));
        assert_eq!(intel.total, search.search("hypervisor", 0).total);
    }

    #[test]
    fn test_empty_query_returns_featured() {
        let index = MockPackageIndex::new();
        let search = HybridSearch::new(&index);

        let first = search.search("", 0);
        assert_eq!(first.results.len(), PAGE_SIZE);
        assert!(first.has_more);
        assert!(first.results.iter().all(|e| !e.is_required));
        assert_eq!(index.calls(), 0);
    }

    #[test]
    fn test_filter_listings() {
        let formulae = vec![
            ApiFormula {
                name: "bat".to_string(),
                desc: Some("Clone of cat with syntax highlighting".to_string()),
            },
            ApiFormula {
                name: "catimg".to_string(),
                desc: None,
            },
        ];
        let casks = vec![ApiCask {
            token: "cathode".to_string(),
            name: vec!["Cathode".to_string()],
            desc: Some("Vintage terminal emulator".to_string()),
        }];

        let results = filter_listings(&formulae, &casks, "cat");
        assert_eq!(results.len(), 3);
        // name matches rank above description-only matches
        assert_eq!(results.last().map(|e| e.id.as_str()), Some("formula:bat"));

        let cask = results.iter().find(|e| e.id == "cask:cathode").unwrap();
        assert_eq!(cask.name, "Cathode");
        assert_eq!(cask.install_type, InstallType::Cask);
        assert_eq!(cask.category, "Development");
    }

    #[test]
    fn test_guess_category() {
        assert_eq!(guess_category("iina", "Media player"), "Multimedia");
        assert_eq!(guess_category("arc", "Web browser"), "Productivity");
        assert_eq!(guess_category("neovim", "Vim-fork text editor"), "Development");
        assert_eq!(guess_category("htop", "Process viewer"), "Utilities");
    }

    #[test]
    fn test_paginate() {
        let entries: Vec<PackageEntry> = (0..30)
            .map(|i| PackageEntry::formula(&format!("pkg{}", i)))
            .collect();
        let page = SearchPage::paginate(entries, 2, SearchSource::Api);
        assert_eq!(page.total, 30);
        assert_eq!(page.results.len(), 6);
        assert!(!page.has_more);
    }
}
