//! Server-side search prompt.
//!
//! The term is sent with the listing request (`?search=`); the bar only
//! collects it. Opening the bar keeps the applied term for further editing.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::TextInput;

/// What the owner should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// Search for this term (possibly empty).
    Apply(String),
    /// The term was cleared.
    Clear,
}

/// Search prompt state.
#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    input: TextInput,
    active: bool,
    applied: String,
}

impl SearchBar {
    /// Create an inactive search bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start typing, keeping the applied term.
    pub fn activate(&mut self) {
        self.input.set_value(self.applied.clone());
        self.active = true;
    }

    /// Check if the bar is accepting input.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The term of the last search.
    pub fn applied(&self) -> &str {
        &self.applied
    }

    /// Forget the applied term, e.g. when switching screens.
    pub fn reset(&mut self) {
        self.input.clear();
        self.applied.clear();
        self.active = false;
    }

    /// Handle a key while active.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SearchAction> {
        match key.code {
            KeyCode::Enter => {
                self.active = false;
                let term = self.input.value().trim().to_string();
                if term == self.applied {
                    return None;
                }
                self.applied = term.clone();
                Some(SearchAction::Apply(term))
            }
            KeyCode::Esc => {
                self.active = false;
                self.input.clear();
                if self.applied.is_empty() {
                    return None;
                }
                self.applied.clear();
                Some(SearchAction::Clear)
            }
            _ => {
                self.input.handle_input(key);
                None
            }
        }
    }

    /// Render on one line: the prompt while typing, else the applied term.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let prompt = Span::styled(
            " Buscar: ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        );
        let line = if self.active {
            Line::from(vec![prompt, Span::raw(self.input.value().to_string())])
        } else if !self.applied.is_empty() {
            Line::from(vec![
                prompt,
                Span::styled(self.applied.clone(), Style::default().fg(Color::Cyan)),
                Span::styled("  [Esc em / para limpar]", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(line), area);

        if self.active {
            let offset = u16::try_from(self.input.cursor()).unwrap_or(u16::MAX);
            frame.set_cursor_position(Position::new(
                area.x.saturating_add(9).saturating_add(offset),
                area.y,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(bar: &mut SearchBar, text: &str) {
        for c in text.chars() {
            assert_eq!(bar.handle_input(key(KeyCode::Char(c))), None);
        }
    }

    #[test]
    fn test_enter_applies_trimmed_term() {
        let mut bar = SearchBar::new();
        bar.activate();
        type_text(&mut bar, " bloco A ");
        assert_eq!(
            bar.handle_input(key(KeyCode::Enter)),
            Some(SearchAction::Apply("bloco A".to_string()))
        );
        assert!(!bar.is_active());
        assert_eq!(bar.applied(), "bloco A");
    }

    #[test]
    fn test_same_term_is_not_reapplied() {
        let mut bar = SearchBar::new();
        bar.activate();
        type_text(&mut bar, "101");
        bar.handle_input(key(KeyCode::Enter));
        bar.activate();
        assert_eq!(bar.handle_input(key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_escape_clears_applied_term() {
        let mut bar = SearchBar::new();
        bar.activate();
        assert_eq!(bar.handle_input(key(KeyCode::Esc)), None);

        bar.activate();
        type_text(&mut bar, "João");
        bar.handle_input(key(KeyCode::Enter));
        bar.activate();
        assert_eq!(bar.handle_input(key(KeyCode::Esc)), Some(SearchAction::Clear));
        assert_eq!(bar.applied(), "");
    }
}
