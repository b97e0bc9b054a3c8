use std::collections::BTreeSet;
use std::io;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use kubectx_core::Picker;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::widgets::ContextPickerWidget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Pending,
    Selected(Vec<String>),
    Cancelled,
}

/// Filter text, cursor and marks of one picker session.
#[derive(Debug, Clone)]
pub struct PickerState {
    items: Vec<String>,
    current: String,
    mode: PickMode,
    filter: String,
    selected: usize,
    marked: BTreeSet<String>,
}

impl PickerState {
    pub fn new(items: &[String], current: &str, mode: PickMode) -> Self {
        let selected = items.iter().position(|i| i == current).unwrap_or(0);
        Self {
            items: items.to_vec(),
            current: current.to_string(),
            mode,
            filter: String::new(),
            selected,
            marked: BTreeSet::new(),
        }
    }

    pub fn filtered(&self) -> Vec<&str> {
        let filter_lower = self.filter.to_lowercase();
        self.items
            .iter()
            .filter(|item| filter_lower.is_empty() || item.to_lowercase().contains(&filter_lower))
            .map(String::as_str)
            .collect()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn mode(&self) -> PickMode {
        self.mode
    }

    pub fn is_marked(&self, item: &str) -> bool {
        self.marked.contains(item)
    }

    fn highlighted(&self) -> Option<String> {
        self.filtered().get(self.selected).map(|s| s.to_string())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return PickOutcome::Cancelled,
            KeyCode::Char('c') if ctrl => return PickOutcome::Cancelled,
            KeyCode::Enter => return self.confirm(),
            KeyCode::Up => self.select_prev(),
            KeyCode::Char('p' | 'k') if ctrl => self.select_prev(),
            KeyCode::Down => self.select_next(),
            KeyCode::Char('n' | 'j') if ctrl => self.select_next(),
            KeyCode::Tab if self.mode == PickMode::Multi => {
                if let Some(item) = self.highlighted() {
                    if !self.marked.remove(&item) {
                        self.marked.insert(item);
                    }
                    self.select_next();
                }
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.selected = 0;
            }
            KeyCode::Char(c) if !ctrl => {
                self.filter.push(c);
                self.selected = 0;
            }
            _ => {}
        }
        PickOutcome::Pending
    }

    fn confirm(&self) -> PickOutcome {
        if !self.marked.is_empty() {
            let picked = self.items.iter().filter(|i| self.marked.contains(*i)).cloned().collect();
            return PickOutcome::Selected(picked);
        }
        match self.highlighted() {
            Some(item) => PickOutcome::Selected(vec![item]),
            None => PickOutcome::Pending,
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_next(&mut self) {
        let count = self.filtered().len();
        if self.selected + 1 < count {
            self.selected += 1;
        }
    }
}

/// Full-screen picker drawn with ratatui on the controlling terminal.
#[derive(Debug, Default)]
pub struct TuiPicker;

impl TuiPicker {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, mut state: PickerState, title: &str) -> Result<Option<Vec<String>>> {
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        loop {
            terminal.draw(|frame| {
                ContextPickerWidget { state: &state, title }.render(frame, frame.area());
            })?;

            let Event::Key(key) = event::read()? else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.handle_key(key) {
                PickOutcome::Pending => {}
                PickOutcome::Selected(items) => return Ok(Some(items)),
                PickOutcome::Cancelled => return Ok(None),
            }
        }
    }
}

impl Picker for TuiPicker {
    fn pick_context(&mut self, contexts: &[String], current: &str) -> Result<Option<String>> {
        let state = PickerState::new(contexts, current, PickMode::Single);
        Ok(self.run(state, " Select Context ")?.and_then(|items| items.into_iter().next()))
    }

    fn pick_contexts_to_delete(&mut self, contexts: &[String], current: &str) -> Result<Option<Vec<String>>> {
        let state = PickerState::new(contexts, current, PickMode::Multi);
        self.run(state, " Delete Contexts ")
    }
}

/// Restores the terminal on every exit path, including panics.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = terminal::disable_raw_mode();
            return Err(e.into());
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
            tracing::warn!("failed to leave alternate screen: {e}");
        }
    }
}
