//! Default inputs and reusable editors.
//!
//! Columns without an `edit_component` are edited through a default input
//! whose behavior follows the column's [`InputType`]. In compact mode the
//! type is inferred from well-known field keys when the column does not set
//! one explicitly.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde_json::Value;

use super::column::{CellError, Column, Editor, FieldChange, InputType, SelectOption};
use super::layout::LayoutMode;
use super::row::{input_text, Row};

/// Boolean status fields rendered as checkboxes in compact mode.
const BOOLEAN_STATUS_KEYS: &[&str] = &["is_active", "ativo"];

/// Date-and-time fields rendered as datetime inputs in compact mode.
const DATETIME_KEYS: &[&str] = &["datetime_inicio", "datetime_fim"];

/// Date fields rendered as date inputs in compact mode.
const DATE_KEYS: &[&str] = &["data_evento", "data_reserva", "data_inicio", "data_fim"];

/// Status values of a reservation.
pub fn reservation_status_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("pendente", "Pendente"),
        SelectOption::new("confirmada", "Confirmada"),
        SelectOption::new("cancelada", "Cancelada"),
    ]
}

/// Decide which default input edits `column` for `row`.
///
/// An explicit non-text input type always wins. In compact mode a plain
/// text column is refined from its key and current value.
pub fn resolve_input(column: &Column, row: &Row, mode: LayoutMode) -> InputType {
    if column.input_type != InputType::Text || !mode.is_compact() {
        return column.input_type.clone();
    }

    let key = column.key.as_str();
    let value = row.get(key);
    if BOOLEAN_STATUS_KEYS.contains(&key) || (key == "status" && matches!(value, Some(Value::Bool(_)))) {
        InputType::Checkbox
    } else if key == "status" && matches!(value, Some(Value::String(_))) {
        InputType::Select(reservation_status_options())
    } else if DATETIME_KEYS.contains(&key) {
        InputType::DateTime
    } else if DATE_KEYS.contains(&key) || key.contains("_data") || key.starts_with("data_") {
        InputType::Date
    } else {
        InputType::Text
    }
}

/// The text a textual input shows for a stored value.
pub fn input_display(input: &InputType, value: Option<&Value>) -> String {
    let raw = input_text(value);
    match input {
        InputType::DateTime => datetime_input_text(&raw),
        InputType::Date => match raw.split_once('T') {
            Some((date, _)) => date.to_string(),
            None => raw,
        },
        _ => raw,
    }
}

/// Trim an ISO timestamp to `YYYY-MM-DDTHH:MM`.
///
/// Partial input that does not look like a timestamp yet is returned
/// unchanged so typing is not disturbed.
fn datetime_input_text(raw: &str) -> String {
    if raw.contains('T') {
        let cleaned = raw.replace('Z', "");
        let cleaned = cleaned.split('.').next().unwrap_or_default();
        if cleaned.chars().count() >= 16 {
            return cleaned.chars().take(16).collect();
        }
    }
    raw.to_string()
}

/// Convert typed text into the value stored in the edit buffer.
pub fn parse_input(input: &InputType, text: &str) -> Value {
    match input {
        InputType::Number => parse_number(text),
        InputType::DateTime => {
            if chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").is_ok() {
                Value::String(format!("{}:00Z", text))
            } else if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        }
        _ => Value::String(text.to_string()),
    }
}

/// Numbers are only stored as numbers when they read back identically, so
/// "007", "+5", "1." or "1.50" stay as typed and the caret does not jump.
fn parse_number(text: &str) -> Value {
    match text.parse::<i64>() {
        Ok(n) if n.to_string() == text => return Value::from(n),
        _ => {}
    }
    match text.parse::<f64>() {
        Ok(n) if n.to_string() == text => serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

/// Handle a key for a non-textual default input.
///
/// Checkboxes toggle on Space. Selects cycle with Left/Right (and Space).
pub fn toggle_or_cycle(input: &InputType, value: Option<&Value>, key: KeyEvent) -> Option<Value> {
    match input {
        InputType::Checkbox => match key.code {
            KeyCode::Char(' ') => Some(Value::Bool(!truthy(value))),
            _ => None,
        },
        InputType::Select(options) if !options.is_empty() => {
            let current = value.and_then(Value::as_str).unwrap_or_default();
            let index = options.iter().position(|o| o.value == current);
            let next = match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    index.map(|i| (i + 1) % options.len()).unwrap_or(0)
                }
                KeyCode::Left => index
                    .map(|i| (i + options.len() - 1) % options.len())
                    .unwrap_or(options.len() - 1),
                _ => return None,
            };
            Some(Value::String(options[next].value.clone()))
        }
        _ => None,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn input_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Draw a default input.
///
/// `cursor` is the caret position (in characters) for focused textual
/// inputs.
pub fn render_default_input(
    input: &InputType,
    value: Option<&Value>,
    focused: bool,
    cursor: usize,
) -> Line<'static> {
    let style = input_style(focused);
    match input {
        InputType::Checkbox => {
            let checked = truthy(value);
            let text = if checked { "[x] Ativo" } else { "[ ] Inativo" };
            Line::from(Span::styled(text, style))
        }
        InputType::Select(options) => {
            let current = value.and_then(Value::as_str).unwrap_or("pendente");
            let label = options
                .iter()
                .find(|o| o.value == current)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| current.to_string());
            Line::from(Span::styled(format!("‹ {} ›", label), style))
        }
        _ => {
            let mut text = input_display(input, value);
            if *input == InputType::Password {
                text = "•".repeat(text.chars().count());
            }
            textual_line(text, style, focused.then_some(cursor))
        }
    }
}

fn textual_line(text: String, style: Style, cursor: Option<usize>) -> Line<'static> {
    let mut spans = vec![Span::styled("[", style)];
    match cursor {
        Some(cursor) => {
            let chars: Vec<char> = text.chars().collect();
            let cursor = cursor.min(chars.len());
            let before: String = chars[..cursor].iter().collect();
            let at: String = chars.get(cursor).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
            let after: String = chars.iter().skip(cursor + 1).collect();
            spans.push(Span::styled(before, style));
            spans.push(Span::styled(at, style.add_modifier(Modifier::REVERSED)));
            spans.push(Span::styled(after, style));
        }
        None => spans.push(Span::styled(text, style)),
    }
    spans.push(Span::styled("]", style));
    Line::from(spans)
}

/// Select editor over a fixed list of options, bound to one field.
#[derive(Debug, Clone)]
pub struct ChoiceEditor {
    key: String,
    options: Vec<SelectOption>,
}

impl ChoiceEditor {
    /// Create a choice editor for `key`.
    pub fn new(key: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }
}

impl Editor for ChoiceEditor {
    fn render(&self, data: &Row, focused: bool) -> Result<Line<'static>, CellError> {
        if self.options.is_empty() {
            return Err(CellError::new(format!("no options for '{}'", self.key)));
        }
        let input = InputType::Select(self.options.clone());
        Ok(render_default_input(&input, data.get(&self.key), focused, 0))
    }

    fn handle_key(&self, data: &Row, key: KeyEvent) -> Option<FieldChange> {
        let input = InputType::Select(self.options.clone());
        toggle_or_cycle(&input, data.get(&self.key), key).map(|value| FieldChange::new(&self.key, value))
    }
}

/// Boolean editor with custom on/off labels.
#[derive(Debug, Clone)]
pub struct ToggleEditor {
    key: String,
    on: String,
    off: String,
}

impl ToggleEditor {
    /// Create a toggle editor for `key`.
    pub fn new(key: impl Into<String>, on: impl Into<String>, off: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            on: on.into(),
            off: off.into(),
        }
    }
}

impl Editor for ToggleEditor {
    fn render(&self, data: &Row, focused: bool) -> Result<Line<'static>, CellError> {
        let checked = truthy(data.get(&self.key));
        let text = if checked {
            format!("[x] {}", self.on)
        } else {
            format!("[ ] {}", self.off)
        };
        Ok(Line::from(Span::styled(text, input_style(focused))))
    }

    fn handle_key(&self, data: &Row, key: KeyEvent) -> Option<FieldChange> {
        toggle_or_cycle(&InputType::Checkbox, data.get(&self.key), key)
            .map(|value| FieldChange::new(&self.key, value))
    }
}
