use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::picker::{PickMode, PickerState};

const ACCENT: Color = Color::Cyan;
const CURRENT: Color = Color::Yellow;

pub struct ContextPickerWidget<'a> {
    pub state: &'a PickerState,
    pub title: &'a str,
}

impl<'a> ContextPickerWidget<'a> {
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let state = self.state;

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(self.title)
            .title_style(Style::default().fg(ACCENT).bold());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let filter = state.filter();
        let filter_display = if filter.is_empty() { "Type to filter..." } else { filter };
        let filter_style =
            if filter.is_empty() { Style::default().fg(Color::DarkGray) } else { Style::default().fg(Color::Reset) };
        frame.render_widget(Paragraph::new(format!(" > {filter_display}")).style(filter_style), chunks[0]);

        let filtered = state.filtered();
        let items: Vec<ListItem> = filtered
            .iter()
            .map(|name| {
                let mark = match state.mode() {
                    PickMode::Multi if state.is_marked(name) => "[x] ",
                    PickMode::Multi => "[ ] ",
                    PickMode::Single => "",
                };
                let style = if *name == state.current() {
                    Style::default().fg(CURRENT).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!("  {mark}{name}")).style(style)
            })
            .collect();

        let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
        let mut list_state =
            ListState::default().with_selected(Some(state.selected().min(filtered.len().saturating_sub(1))));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);

        let hints = match state.mode() {
            PickMode::Single => " Enter:select  Esc:cancel",
            PickMode::Multi => " Tab:mark  Enter:delete  Esc:cancel",
        };
        frame.render_widget(Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)), chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn names() -> Vec<String> {
        vec!["dev".into(), "prod".into(), "staging".into()]
    }

    fn render(state: &PickerState, title: &str) -> String {
        let backend = TestBackend::new(60, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                ContextPickerWidget { state, title }.render(frame, frame.area());
            })
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    #[test]
    fn renders_title_contexts_and_hints() {
        let state = PickerState::new(&names(), "prod", PickMode::Single);
        let content = render(&state, " Select Context ");
        assert!(content.contains("Select Context"));
        assert!(content.contains("staging"));
        assert!(content.contains("Type to filter..."));
        assert!(content.contains("Enter:select"));
        assert!(!content.contains("[ ]"));
    }

    #[test]
    fn multi_mode_shows_marks() {
        let state = PickerState::new(&names(), "prod", PickMode::Multi);
        let content = render(&state, " Delete Contexts ");
        assert!(content.contains("[ ] dev"));
        assert!(content.contains("Tab:mark"));
    }

    fn buffer_to_string(buf: &Buffer) -> String {
        let mut s = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                let cell = &buf[(x, y)];
                s.push_str(cell.symbol());
            }
            s.push('\n');
        }
        s
    }
}
