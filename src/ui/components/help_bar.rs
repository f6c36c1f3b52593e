//! Contextual help bar.
//!
//! One line of key hints at the bottom of the screen, keys in brackets
//! highlighted.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::events::{get_context_hints, KeyContext};

/// Render the hints for `context`.
pub fn render_context_help(frame: &mut Frame, area: Rect, context: KeyContext) {
    let line = Line::from(hint_spans(get_context_hints(context)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Split hint text into key spans (`[...]`) and description spans.
///
/// A key may itself be a bracket (`[[/]]`): the innermost closing bracket
/// followed by another `]` still belongs to the key.
fn hint_spans(hints: &str) -> Vec<Span<'static>> {
    let key_style = Style::default().fg(Color::Cyan);
    let text_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_key = false;
    let mut chars = hints.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '[' if !in_key => {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), text_style));
                }
                in_key = true;
                current.push(c);
            }
            ']' if in_key && chars.peek() != Some(&']') => {
                current.push(c);
                spans.push(Span::styled(std::mem::take(&mut current), key_style));
                in_key = false;
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        spans.push(Span::styled(current, text_style));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(spans: &[Span<'_>]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_keys_and_descriptions_alternate() {
        let spans = hint_spans("[e] editar  [Esc] cancelar");
        assert_eq!(contents(&spans), vec!["[e]", " editar  ", "[Esc]", " cancelar"]);
        assert_eq!(spans[0].style.fg, Some(Color::Cyan));
        assert_eq!(spans[1].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_bracket_keys() {
        let spans = hint_spans("[[/]] página");
        assert_eq!(contents(&spans), vec!["[[/]]", " página"]);
    }

    #[test]
    fn test_empty_and_plain() {
        assert!(hint_spans("").is_empty());
        assert_eq!(hint_spans("texto").len(), 1);
    }
}
