//! Help screen listing the key bindings by context.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::events::{get_keybindings_grouped, KeyContext, Keybinding};

/// Actions returned from the help view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpAction {
    /// Close the help screen.
    Close,
}

/// Scrollable help screen.
pub struct HelpView {
    grouped_bindings: Vec<(KeyContext, Vec<Keybinding>)>,
    scroll: usize,
    /// Updated on render.
    visible_height: usize,
}

impl HelpView {
    /// Create a new help view.
    pub fn new() -> Self {
        Self {
            grouped_bindings: get_keybindings_grouped(),
            scroll: 0,
            visible_height: 0,
        }
    }

    /// Reset scroll position to top.
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    fn total_lines(&self) -> usize {
        // Header and blank line per section, one line per binding, a blank
        // line after each section, then the footer.
        self.grouped_bindings
            .iter()
            .map(|(_, bindings)| bindings.len() + 3)
            .sum::<usize>()
            + 1
    }

    fn max_scroll(&self) -> usize {
        self.total_lines().saturating_sub(self.visible_height)
    }

    /// Handle keyboard input. All keys are consumed while help is open.
    pub fn handle_input(&mut self, key_event: KeyEvent) -> Option<HelpAction> {
        let page = self.visible_height.saturating_sub(2).max(1);
        match (key_event.code, key_event.modifiers) {
            (KeyCode::Char('?') | KeyCode::Char('q'), _) | (KeyCode::Esc, _) => {
                return Some(HelpAction::Close)
            }
            (KeyCode::Char('j') | KeyCode::Down, _) => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
            }
            (KeyCode::Char('k') | KeyCode::Up, _) => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
                self.scroll = (self.scroll + page).min(self.max_scroll());
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
                self.scroll = self.scroll.saturating_sub(page);
            }
            (KeyCode::Char('g') | KeyCode::Home, _) => self.scroll = 0,
            (KeyCode::Char('G') | KeyCode::End, _) => self.scroll = self.max_scroll(),
            _ => {}
        }
        None
    }

    /// Render over `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Ajuda - Atalhos de teclado ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.visible_height = usize::from(inner.height);
        self.scroll = self.scroll.min(self.max_scroll());

        let scroll = u16::try_from(self.scroll).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(self.content_lines()).scroll((scroll, 0)), inner);

        if self.total_lines() > self.visible_height {
            let mut state = ScrollbarState::new(self.max_scroll()).position(self.scroll);
            let track = Rect::new(
                area.x + area.width.saturating_sub(1),
                area.y + 1,
                1,
                area.height.saturating_sub(2),
            );
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                track,
                &mut state,
            );
        }
    }

    fn content_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.total_lines());
        for (context, bindings) in &self.grouped_bindings {
            lines.push(Line::styled(
                format!("── {} ──", context.display()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
            lines.push(Line::raw(""));
            for binding in bindings {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{:>16}", binding.key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(binding.description.clone()),
                ]));
            }
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(
            "?, q ou Esc para fechar",
            Style::default().fg(Color::DarkGray),
        ));
        lines
    }
}

impl Default for HelpView {
    fn default() -> Self {
        Self::new()
    }
}
