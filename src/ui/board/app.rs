use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use crate::config::UsersConfig;
use crate::error::Result;
use crate::store::TaskStore;
use crate::task::{TaskRecord, TaskStatus, TaskTable};

use super::view;

const EVENT_POLL_MS: u64 = 120;
pub(crate) const ALL_USERS_LABEL: &str = "All";

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState {
    store: TaskStore,
    table: TaskTable,
    /// Configured names; the sidebar adds an "all users" entry after them
    pub(crate) users: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) scroll: usize,
    page: usize,
    status: Option<(String, StatusKind)>,
}

impl AppState {
    pub fn new(store: TaskStore, users: &UsersConfig, active: &str) -> Self {
        let names: Vec<String> = users
            .names
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        let selected = names.iter().position(|name| name == active).unwrap_or(0);
        Self {
            store,
            table: TaskTable::default(),
            users: names,
            selected,
            scroll: 0,
            page: 10,
            status: None,
        }
    }

    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(table) => {
                debug!(rows = table.len(), "board reloaded");
                self.table = table.display_order();
                self.status = Some((
                    format!("loaded {}", self.store.path().display()),
                    StatusKind::Info,
                ));
            }
            Err(err) => {
                self.status = Some((err.to_string(), StatusKind::Error));
            }
        }
        self.clamp_scroll();
    }

    /// `None` when the "all users" entry is selected
    pub fn selected_user(&self) -> Option<&str> {
        self.users.get(self.selected).map(String::as_str)
    }

    /// Sidebar labels in display order, "all users" last
    pub(crate) fn sidebar(&self) -> impl Iterator<Item = &str> + '_ {
        self.users
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(ALL_USERS_LABEL))
    }

    pub fn visible(&self) -> Vec<&TaskRecord> {
        match self.selected_user() {
            Some(user) => self.table.for_user(user).collect(),
            None => self.table.iter().collect(),
        }
    }

    pub(crate) fn status_line(&self) -> Option<(&str, StatusKind)> {
        self.status
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    pub(crate) fn count_summary(&self) -> String {
        let visible = self.visible();
        let mut parts = vec![format!("{} tasks", visible.len())];
        for status in TaskStatus::ALL {
            let count = visible
                .iter()
                .filter(|record| record.status == Some(status))
                .count();
            parts.push(format!("{}: {count}", status.label()));
        }
        parts.join("  ")
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        "j/k user  PgUp/PgDn scroll  r reload  q quit"
    }

    pub(crate) fn update_page(&mut self, height: u16) {
        // Borders, header row and the footer block.
        self.page = (height as usize).saturating_sub(7).max(1);
        self.clamp_scroll();
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    fn select_next(&mut self) {
        if self.selected < self.users.len() {
            self.selected += 1;
            self.scroll = 0;
        }
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll += self.page;
        self.clamp_scroll();
    }

    fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(self.page);
    }

    fn clamp_scroll(&mut self) {
        let max = self.visible().len().saturating_sub(1);
        self.scroll = self.scroll.min(max);
    }

    /// Returns true when the board should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_down(),
            KeyCode::PageUp => self.scroll_up(),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }
}

/// Open the board on `user`'s tasks.
pub fn run(store: TaskStore, users: UsersConfig, user: String) -> Result<()> {
    let mut app = AppState::new(store, &users, &user);
    app.reload();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| {
                app.update_page(frame.size().height);
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, height) => {
                    app.update_page(height);
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}
