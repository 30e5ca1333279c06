use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};
use std::io::{self, BufRead, Write};

use crate::package::PackageEntry;
use crate::search::local_search;
use crate::utils::is_mock_environment;

pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = io::stdout().flush();
    }
}

/// Checklist state, kept apart from the terminal so it can be tested.
#[derive(Debug, Clone)]
pub struct Picker {
    entries: Vec<PackageEntry>,
    checked: Vec<bool>,
    filter: String,
}

impl Picker {
    pub fn new(entries: Vec<PackageEntry>, preselected: &[String]) -> Self {
        let checked = entries
            .iter()
            .map(|e| e.is_required || preselected.contains(&e.id))
            .collect();
        Self {
            entries,
            checked,
            filter: String::new(),
        }
    }

    /// Indices of entries shown under the current filter.
    pub fn visible(&self) -> Vec<usize> {
        if self.filter.trim().is_empty() {
            return (0..self.entries.len()).collect();
        }
        local_search(&self.filter)
            .iter()
            .filter_map(|hit| self.entries.iter().position(|e| e.id == hit.id))
            .collect()
    }

    /// Required entries stay checked.
    pub fn toggle(&mut self, index: usize) {
        if let Some(entry) = self.entries.get(index) {
            if !entry.is_required {
                self.checked[index] = !self.checked[index];
            }
        }
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.get(index).copied().unwrap_or(false)
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
    }

    pub fn selected(&self) -> Vec<PackageEntry> {
        self.entries
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(entry, _)| entry.clone())
            .collect()
    }
}

/// Returns `None` when the user quits without confirming.
pub fn show_interactive_selection(
    entries: &[PackageEntry],
    preselected: &[String],
) -> Result<Option<Vec<PackageEntry>>> {
    // Skip TUI in test environments to avoid terminal state issues
    if is_mock_environment() || std::env::var("CARGO_TEST").is_ok() || cfg!(test) {
        return show_simple_selection(entries, preselected).map(Some);
    }

    let mut picker = Picker::new(entries.to_vec(), preselected);
    let mut filtering = false;
    let mut filter = String::new();
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    // Setup terminal with proper cleanup handling
    let _guard = TerminalGuard::new()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let visible = picker.visible();

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(0),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let title = if filter.is_empty() && !filtering {
                format!("Select apps to install ({} selected)", picker.selected().len())
            } else {
                format!("Filter: {}{}", filter, if filtering { "_" } else { "" })
            };
            let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
            f.render_widget(header, chunks[0]);

            let items: Vec<ListItem> = visible
                .iter()
                .map(|&i| {
                    let entry = &entries[i];
                    let checkbox = if picker.is_checked(i) { "[x]" } else { "[ ]" };
                    let mut spans = vec![
                        Span::styled(checkbox, Style::default().fg(Color::Green)),
                        Span::raw(" "),
                        Span::styled(
                            entry.name.as_str(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(" "),
                        Span::styled(
                            format!("({}) ", entry.category),
                            Style::default().fg(Color::Blue),
                        ),
                        Span::raw(entry.description.as_str()),
                    ];
                    if entry.is_required {
                        spans.push(Span::styled(" required", Style::default().fg(Color::Yellow)));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL))
                .highlight_style(Style::default().bg(Color::DarkGray));

            f.render_stateful_widget(list, chunks[1], &mut list_state);

            let footer = Paragraph::new(
                "↑↓: Navigate, SPACE: Toggle, /: Filter, ENTER: Save, q: Quit",
            )
            .block(Block::default().borders(Borders::ALL));
            f.render_widget(footer, chunks[2]);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if filtering {
                match key.code {
                    KeyCode::Esc => {
                        filtering = false;
                        filter.clear();
                    }
                    KeyCode::Enter => filtering = false,
                    KeyCode::Backspace => {
                        filter.pop();
                    }
                    KeyCode::Char(c) => filter.push(c),
                    _ => {}
                }
                picker.set_filter(&filter);
                list_state.select(Some(0));
                continue;
            }

            match key.code {
                KeyCode::Char('q') => {
                    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                    return Ok(None);
                }
                KeyCode::Char('/') => filtering = true,
                KeyCode::Up => {
                    let i = list_state.selected().unwrap_or(0);
                    if i > 0 {
                        list_state.select(Some(i - 1));
                    }
                }
                KeyCode::Down => {
                    let i = list_state.selected().unwrap_or(0);
                    if i + 1 < visible.len() {
                        list_state.select(Some(i + 1));
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(&index) = list_state.selected().and_then(|i| visible.get(i)) {
                        picker.toggle(index);
                    }
                }
                KeyCode::Enter => {
                    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                    return Ok(Some(picker.selected()));
                }
                _ => {}
            }
        }
    }
}

pub fn show_simple_selection(
    entries: &[PackageEntry],
    preselected: &[String],
) -> Result<Vec<PackageEntry>> {
    let stdin = io::stdin();
    simple_selection_from(entries, preselected, stdin.lock())
}

/// Plain numbered checklist read from `input`.
pub fn simple_selection_from<R: BufRead>(
    entries: &[PackageEntry],
    preselected: &[String],
    mut input: R,
) -> Result<Vec<PackageEntry>> {
    let mut picker = Picker::new(entries.to_vec(), preselected);

    println!("\nAvailable apps:");
    for (i, entry) in entries.iter().enumerate() {
        let checkbox = if picker.is_checked(i) { "[x]" } else { "[ ]" };
        let required = if entry.is_required { " (required)" } else { "" };
        println!(
            "{}. {} {} - {}{}",
            i + 1,
            checkbox,
            entry.name,
            entry.category,
            required
        );
    }

    println!("\nEnter numbers to toggle (comma separated), or press ENTER to keep the current selection: ");
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
        if let Ok(number) = token.trim().parse::<usize>() {
            if number >= 1 {
                picker.toggle(number - 1);
            }
        }
    }

    Ok(picker.selected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn ids(entries: &[PackageEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_picker_required_entries_stay_checked() {
        let entries = catalog::entries();
        let homebrew = entries.iter().position(|e| e.is_bootstrap()).unwrap();

        let mut picker = Picker::new(entries, &[]);
        assert!(picker.is_checked(homebrew));
        picker.toggle(homebrew);
        assert!(picker.is_checked(homebrew));
        assert_eq!(ids(&picker.selected()), vec!["homebrew"]);
    }

    #[test]
    fn test_picker_filter_uses_catalog_search() {
        let mut picker = Picker::new(catalog::entries(), &[]);
        let all = picker.visible().len();

        picker.set_filter("slack");
        let visible = picker.visible();
        assert!(visible.len() < all);
        assert!(visible.iter().any(|&i| catalog::entries()[i].id == "slack"));

        picker.set_filter("");
        assert_eq!(picker.visible().len(), all);
    }

    #[test]
    fn test_simple_selection_toggles_numbers() -> Result<()> {
        let entries = vec![
            PackageEntry::new("git", "Git", crate::package::InstallType::Formula, "git"),
            PackageEntry::new("vlc", "VLC", crate::package::InstallType::Cask, "vlc"),
            PackageEntry::new("zoom", "Zoom", crate::package::InstallType::Cask, "zoom"),
        ];
        let preselected = vec!["git".to_string()];

        let selected = simple_selection_from(&entries, &preselected, "1, 3 99\n".as_bytes())?;
        assert_eq!(ids(&selected), vec!["zoom"]);

        let unchanged = simple_selection_from(&entries, &preselected, "\n".as_bytes())?;
        assert_eq!(ids(&unchanged), vec!["git"]);
        Ok(())
    }
}
