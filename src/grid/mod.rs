//! Generic editable data grid.
//!
//! The grid renders a page of rows either as a table (wide terminals) or as
//! a stack of cards (compact terminals) and drives a single-row edit
//! lifecycle. It never talks to the network: every user intent is returned
//! to the owner as a list of [`GridEvent`]s, and the owner re-supplies fresh
//! rows and pagination when it is done.
//!
//! # Edit lifecycle
//!
//! ```text
//! start_edit ──► change_field* ──► save ──► (owner persists, re-supplies data)
//!                       │
//!                       └────────► cancel
//! ```
//!
//! Rows must carry unique `id` fields. Duplicate ids make the edited row
//! ambiguous; this is not checked.

mod cards;
mod column;
mod editor;
mod layout;
mod pagination;
mod row;
mod session;
mod table;

use chrono::{DateTime, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::ui::TextInput;

pub use column::{CellError, CellView, Column, Editor, FieldChange, InputType, SelectOption, Viewer, ACTIONS_KEY};
pub use editor::{reservation_status_options, ChoiceEditor, ToggleEditor};
pub use layout::{LayoutMode, ResponsiveSwitch, DEFAULT_COMPACT_BREAKPOINT};
pub use pagination::Pagination;
pub use row::{display_text, fallback_text, Row, RowId};
pub use session::{EditSession, GridError, GridEvent};

use editor::{input_display, parse_input, render_default_input, resolve_input, toggle_or_cycle};

/// Fields the card layout never shows; `datetime_inicio`/`datetime_fim`
/// already carry them.
const CARD_SUPPRESSED_KEYS: &[&str] = &["data_evento", "hora_inicio", "hora_fim"];

/// Placeholder shown while loading.
pub const LOADING_TEXT: &str = "Carregando...";

/// Placeholder shown when the page has no rows.
pub const EMPTY_TEXT: &str = "Nenhum registro encontrado";

/// What the grid body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// A single loading placeholder, whatever the data.
    Loading,
    /// A single "no records" placeholder.
    Empty,
    /// The rows.
    Rows,
}

/// One field of a card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardField {
    /// Field key.
    pub key: String,
    /// Column title.
    pub label: String,
    /// Display or edit content.
    pub content: Line<'static>,
    /// Whether the field shows an edit control.
    pub editing: bool,
    /// Whether the edit control has focus.
    pub focused: bool,
}

/// The data grid component.
pub struct DataGrid {
    columns: Vec<Column>,
    data: Vec<Row>,
    loading: bool,
    pagination: Pagination,
    session: EditSession,
    layout: LayoutMode,
    /// Index of the highlighted row.
    selected: usize,
    /// Index into the focusable fields of the editing row.
    focus: usize,
    /// Caret state of the focused default text input.
    input: TextInput,
    title: Option<String>,
    /// Column whose value heads each card.
    title_column: Option<String>,
    style: Style,
}

impl DataGrid {
    /// Create an empty grid with the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            data: Vec::new(),
            loading: false,
            pagination: Pagination::default(),
            session: EditSession::new(),
            layout: LayoutMode::default(),
            selected: 0,
            focus: 0,
            input: TextInput::new(),
            title: None,
            title_column: None,
            style: Style::default(),
        }
    }

    /// Set a block title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Head each card with `key` instead of the first column.
    pub fn with_title_column(mut self, key: impl Into<String>) -> Self {
        self.title_column = Some(key.into());
        self
    }

    /// Set the base style of the grid block.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Replace the column descriptors.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
        self.focus = 0;
    }

    /// The column descriptors.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replace the rows.
    ///
    /// Re-runs the edit session synchronisation: unless the owner holds an
    /// editing row id that is present in the new rows, edit mode ends.
    pub fn set_data(&mut self, data: Vec<Row>) -> Vec<GridEvent> {
        self.data = data;
        if self.selected >= self.data.len() {
            self.selected = self.data.len().saturating_sub(1);
        }
        let events = self.session.sync(&self.data);
        self.focus = 0;
        self.sync_input();
        events
    }

    /// The rows.
    pub fn rows(&self) -> &[Row] {
        &self.data
    }

    /// Set the loading flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether the grid is loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set pagination state.
    pub fn set_pagination(&mut self, current_page: u32, total_pages: u32) {
        self.pagination = Pagination::new(current_page, total_pages);
    }

    /// Pagination state.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Select the renderer.
    pub fn set_layout(&mut self, layout: LayoutMode) {
        if self.layout != layout {
            debug!(?layout, "Grid layout changed");
            self.layout = layout;
            self.focus = 0;
            self.sync_input();
        }
    }

    /// The renderer in use.
    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    /// Drive the editing row from outside.
    pub fn set_editing_row(&mut self, id: Option<RowId>) -> Vec<GridEvent> {
        let events = self.session.set_external_row_id(id, &self.data);
        self.focus = 0;
        self.sync_input();
        events
    }

    /// Supply (or withdraw) edit data that supersedes the internal buffer.
    pub fn set_current_edit_data(&mut self, data: Option<Row>) {
        self.session.set_external_data(data);
    }

    /// Delegate field edits to the owner instead of the internal buffer.
    pub fn set_delegate_field_edits(&mut self, delegate: bool) {
        self.session.set_delegate_field_edits(delegate);
    }

    /// The row currently in edit mode.
    pub fn editing_row_id(&self) -> Option<&RowId> {
        self.session.editing_row_id()
    }

    /// Whether a row is in edit mode.
    pub fn is_editing(&self) -> bool {
        self.session.is_active()
    }

    /// The internal edit buffer.
    pub fn edit_buffer(&self) -> &Row {
        self.session.buffer()
    }

    /// What the body shows.
    pub fn body_state(&self) -> BodyState {
        if self.loading {
            BodyState::Loading
        } else if self.data.is_empty() {
            BodyState::Empty
        } else {
            BodyState::Rows
        }
    }

    /// Index of the highlighted row.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// The highlighted row.
    pub fn selected_row(&self) -> Option<&Row> {
        self.data.get(self.selected)
    }

    /// Highlight a row by index.
    pub fn select(&mut self, index: usize) {
        if !self.data.is_empty() {
            self.selected = index.min(self.data.len() - 1);
        }
    }

    fn find_row(&self, id: &RowId) -> Option<&Row> {
        self.data.iter().find(|row| row.id().as_ref() == Some(id))
    }

    fn editing_row(&self) -> Option<&Row> {
        self.session.editing_row_id().and_then(|id| self.find_row(id))
    }

    // ------------------------------------------------------------------
    // Edit lifecycle
    // ------------------------------------------------------------------

    /// Put a row into edit mode.
    ///
    /// Any session in progress is replaced; its edits are discarded.
    pub fn start_edit(&mut self, id: &RowId) -> Result<Vec<GridEvent>, GridError> {
        let row = self
            .find_row(id)
            .cloned()
            .ok_or_else(|| GridError::UnknownRow(id.clone()))?;
        debug!(row_id = %id, "Starting edit");
        let events = self.session.start(&row)?;
        if let Some(index) = self.data.iter().position(|r| r.id().as_ref() == Some(id)) {
            self.selected = index;
        }
        self.focus = 0;
        self.sync_input();
        Ok(events)
    }

    /// Put the highlighted row into edit mode.
    pub fn start_edit_selected(&mut self) -> Result<Vec<GridEvent>, GridError> {
        match self.selected_row().and_then(Row::id) {
            Some(id) => self.start_edit(&id),
            None if self.data.is_empty() => Ok(Vec::new()),
            None => Err(GridError::MissingId),
        }
    }

    /// Re-open edit mode on a row with previously edited data, e.g. after
    /// the owner's save failed.
    pub fn resume_edit(&mut self, id: &RowId, data: &Row) -> Result<Vec<GridEvent>, GridError> {
        let row = self
            .find_row(id)
            .cloned()
            .ok_or_else(|| GridError::UnknownRow(id.clone()))?;
        debug!(row_id = %id, "Resuming edit");
        let events = self.session.resume(&row, data)?;
        self.focus = 0;
        self.sync_input();
        Ok(events)
    }

    /// Change one field of the row in edit mode.
    pub fn change_field(&mut self, key: &str, value: Value) -> Result<Vec<GridEvent>, GridError> {
        self.session.change_field(key, value)
    }

    /// Confirm the edit.
    ///
    /// The payload is the original row, overlaid by the edit data in force,
    /// overlaid by `overrides`. Edit mode ends as soon as the payload is
    /// handed over.
    pub fn save(&mut self, overrides: Option<&Row>) -> Result<Vec<GridEvent>, GridError> {
        let id = self
            .session
            .editing_row_id()
            .cloned()
            .ok_or(GridError::NotEditing)?;
        let original = self.find_row(&id).cloned().unwrap_or_default();

        if self.layout.is_compact() {
            validate_range(&self.session.payload(&original, overrides))?;
        }

        debug!(row_id = %id, "Saving edit");
        let events = self.session.save(&original, overrides)?;
        self.focus = 0;
        Ok(events)
    }

    /// Abort the edit.
    pub fn cancel(&mut self) -> Vec<GridEvent> {
        if let Some(id) = self.session.editing_row_id() {
            debug!(row_id = %id, "Cancelling edit");
        }
        self.focus = 0;
        self.session.cancel()
    }

    /// Request the previous page, if the control is enabled.
    pub fn request_prev_page(&self) -> Option<GridEvent> {
        self.pagination
            .prev_request(!self.data.is_empty())
            .map(GridEvent::PageChange)
    }

    /// Request the next page, if the control is enabled.
    pub fn request_next_page(&self) -> Option<GridEvent> {
        self.pagination
            .next_request(!self.data.is_empty())
            .map(GridEvent::PageChange)
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handle a key press.
    ///
    /// In view mode keys move the highlight, start editing and page. While a
    /// row is being edited keys move between fields, go to the focused
    /// input, save (Enter) or cancel (Esc).
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<Vec<GridEvent>, GridError> {
        if self.session.is_active() {
            return self.handle_edit_input(key);
        }
        if self.loading {
            return Ok(Vec::new());
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                self.select(self.selected.saturating_add(1));
                Ok(Vec::new())
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.select(self.selected.saturating_sub(1));
                Ok(Vec::new())
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.select(0);
                Ok(Vec::new())
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.select(usize::MAX);
                Ok(Vec::new())
            }
            (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _) => self.start_edit_selected(),
            (KeyCode::Char(']'), _) | (KeyCode::PageDown, _) => {
                Ok(self.request_next_page().into_iter().collect())
            }
            (KeyCode::Char('['), _) | (KeyCode::PageUp, _) => {
                Ok(self.request_prev_page().into_iter().collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn handle_edit_input(&mut self, key: KeyEvent) -> Result<Vec<GridEvent>, GridError> {
        match key.code {
            KeyCode::Esc => Ok(self.cancel()),
            KeyCode::Enter => self.save(None),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                Ok(Vec::new())
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                Ok(Vec::new())
            }
            _ => self.edit_focused_field(key),
        }
    }

    fn edit_focused_field(&mut self, key: KeyEvent) -> Result<Vec<GridEvent>, GridError> {
        let Some(row) = self.editing_row().cloned() else {
            return Ok(Vec::new());
        };
        let Some(column) = self.focused_column(&row).cloned() else {
            return Ok(Vec::new());
        };
        let data = self.session.effective_data(&row);

        if let Some(editor) = column.editor() {
            return match editor.handle_key(&data, key) {
                Some(change) => self.change_field(&change.key, change.value),
                None => Ok(Vec::new()),
            };
        }

        let input = resolve_input(&column, &row, self.layout);
        if input.is_textual() {
            let current = input_display(&input, data.get(&column.key));
            if self.input.value() != current {
                self.input.set_value(current);
            }
            if self.input.handle_input(key) {
                let value = parse_input(&input, self.input.value());
                return self.change_field(&column.key, value);
            }
            return Ok(Vec::new());
        }

        match toggle_or_cycle(&input, data.get(&column.key), key) {
            Some(value) => self.change_field(&column.key, value),
            None => Ok(Vec::new()),
        }
    }

    /// Indices of the columns that take focus while `row` is edited.
    fn focusable_columns(&self, row: &Row) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| match self.layout {
                LayoutMode::Wide => column.editable_in_table(),
                LayoutMode::Compact => {
                    column.editable_in_cards()
                        && !CARD_SUPPRESSED_KEYS.contains(&column.key.as_str())
                        && !is_hidden(column, row)
                }
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn focused_column(&self, row: &Row) -> Option<&Column> {
        let focusable = self.focusable_columns(row);
        focusable
            .get(self.focus.min(focusable.len().saturating_sub(1)))
            .map(|&index| &self.columns[index])
    }

    fn focused_key(&self) -> Option<String> {
        let row = self.editing_row()?;
        self.focused_column(row).map(|column| column.key.clone())
    }

    fn move_focus(&mut self, forward: bool) {
        let Some(row) = self.editing_row() else {
            return;
        };
        let count = self.focusable_columns(row).len();
        if count == 0 {
            return;
        }
        let current = self.focus.min(count - 1);
        self.focus = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.sync_input();
    }

    /// Load the focused field's current value into the caret state.
    fn sync_input(&mut self) {
        let value = self.editing_row().and_then(|row| {
            let column = self.focused_column(row)?;
            let input = resolve_input(column, row, self.layout);
            let data = self.session.effective_data(row);
            Some(input_display(&input, data.get(&column.key)))
        });
        match value {
            Some(value) => self.input.set_value(value),
            None => self.input.clear(),
        }
    }

    // ------------------------------------------------------------------
    // Cell content
    // ------------------------------------------------------------------

    /// Content of a table cell.
    pub fn table_cell(&self, row: &Row, column: &Column) -> Line<'static> {
        let editing = self.session.is_editing(row.id().as_ref());

        if column.is_actions() {
            if let Some(viewer) = column.renderer() {
                match viewer.view(row.get(&column.key), row) {
                    Ok(view) => return view.into_line(),
                    Err(err) => error!(column = %column.key, error = %err, "Actions renderer failed"),
                }
            }
            return default_actions(editing);
        }

        if editing && column.editable_in_table() {
            return self.edit_cell(row, column);
        }

        view_cell(column, row).into_line()
    }

    /// Fields of a card, with hidden and suppressed fields removed.
    pub fn card_fields(&self, row: &Row) -> Vec<CardField> {
        let editing = self.session.is_editing(row.id().as_ref());
        let focused_key = if editing { self.focused_key() } else { None };

        self.columns
            .iter()
            .filter(|column| !column.is_actions_like())
            .filter(|column| !CARD_SUPPRESSED_KEYS.contains(&column.key.as_str()))
            .filter_map(|column| {
                let view = card_view(column, row);
                if view.is_hidden() {
                    return None;
                }
                let edit = editing && column.editable_in_cards();
                let content = if edit {
                    self.edit_cell(row, column)
                } else {
                    view.into_line()
                };
                Some(CardField {
                    key: column.key.clone(),
                    label: column.title().to_string(),
                    content,
                    editing: edit,
                    focused: edit && focused_key.as_deref() == Some(column.key.as_str()),
                })
            })
            .collect()
    }

    /// Card heading: the title column, else the first non-actions column,
    /// with its raw value.
    pub fn card_title(&self, row: &Row) -> String {
        let chosen = self
            .title_column
            .as_deref()
            .and_then(|key| self.columns.iter().find(|c| c.key == key && !c.is_actions()));
        match chosen.or_else(|| self.columns.iter().find(|column| !column.is_actions())) {
            Some(column) => format!("{}: {}", column.title(), display_text(row.get(&column.key))),
            None => format!(
                "ID: {}",
                row.id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
            ),
        }
    }

    /// Whether `row` is the one being edited.
    pub fn is_row_editing(&self, row: &Row) -> bool {
        self.session.is_editing(row.id().as_ref())
    }

    fn edit_cell(&self, row: &Row, column: &Column) -> Line<'static> {
        let data = self.session.effective_data(row);
        let focused = self.focused_key().as_deref() == Some(column.key.as_str());

        if let Some(editor) = column.editor() {
            match editor.render(&data, focused) {
                Ok(line) => return line,
                Err(err) => {
                    error!(column = %column.key, error = %err, "Edit component failed, using default input")
                }
            }
        }

        let input = resolve_input(column, row, self.layout);
        render_default_input(&input, data.get(&column.key), focused, self.input.cursor())
    }

    /// The base style passed by the owner.
    pub fn style(&self) -> Style {
        self.style
    }

    /// The block title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Render with the selected layout.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self.layout {
            LayoutMode::Wide => table::render(self, frame, area),
            LayoutMode::Compact => cards::render(self, frame, area),
        }
    }
}

/// View-mode content of a cell, with renderer failures degraded.
fn view_cell(column: &Column, row: &Row) -> CellView {
    let value = row.get(&column.key);
    match column.renderer() {
        Some(viewer) => match viewer.view(value, row) {
            Ok(view) => view,
            Err(err) => {
                error!(column = %column.key, error = %err, "Column renderer failed");
                CellView::text(fallback_text(value))
            }
        },
        None => CellView::text(display_text(value)),
    }
}

/// View-mode content of a card field. Audit timestamps without a renderer
/// are shown as `dd/mm/yyyy`.
fn card_view(column: &Column, row: &Row) -> CellView {
    if column.renderer().is_none() && column.is_audit_timestamp() {
        if let Some(date) = row.get(&column.key).and_then(Value::as_str).and_then(parse_timestamp) {
            return CellView::text(date.format("%d/%m/%Y").to_string());
        }
    }
    view_cell(column, row)
}

/// Whether the column's renderer hides the field for `row`. Failures count
/// as visible.
fn is_hidden(column: &Column, row: &Row) -> bool {
    column
        .renderer()
        .is_some_and(|viewer| matches!(viewer.view(row.get(&column.key), row), Ok(CellView::Hidden)))
}

fn default_actions(editing: bool) -> Line<'static> {
    if editing {
        Line::from(vec![
            Span::styled("✓", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled("✗", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        ])
    } else {
        Line::from(Span::styled("✎", Style::default().fg(Color::Cyan)))
    }
}

/// Parse the timestamp formats the backend and the datetime input produce.
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").ok())
}

/// Reject payloads whose `datetime_fim` is not after `datetime_inicio`.
fn validate_range(data: &Row) -> Result<(), GridError> {
    let start = data.get("datetime_inicio").and_then(Value::as_str).and_then(parse_timestamp);
    let end = data.get("datetime_fim").and_then(Value::as_str).and_then(parse_timestamp);
    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            warn!(%start, %end, "Rejected save with inverted date range");
            Err(GridError::InvalidRange)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        Row::from_value(value).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn people_grid() -> DataGrid {
        let mut grid = DataGrid::new(vec![
            Column::new("nome").header("Nome").editable(true),
            Column::new("ativo")
                .header("Ativo")
                .editable(true)
                .input_type(InputType::Checkbox),
            Column::actions(),
        ]);
        grid.set_data(vec![
            row(json!({"id": 1, "nome": "Alice", "ativo": true})),
            row(json!({"id": 2, "nome": "Bruno", "ativo": false})),
        ]);
        grid
    }

    #[test]
    fn test_body_state_loading_wins() {
        let mut grid = people_grid();
        grid.set_loading(true);
        assert_eq!(grid.body_state(), BodyState::Loading);

        grid.set_loading(false);
        assert_eq!(grid.body_state(), BodyState::Rows);

        grid.set_data(Vec::new());
        assert_eq!(grid.body_state(), BodyState::Empty);

        grid.set_loading(true);
        assert_eq!(grid.body_state(), BodyState::Loading);
    }

    #[test]
    fn test_end_to_end_edit_and_save() {
        let mut grid = people_grid();

        let events = grid.start_edit(&RowId::Int(1)).unwrap();
        let snapshot = row(json!({"id": 1, "nome": "Alice", "ativo": true}));
        assert!(events.contains(&GridEvent::EditDataChanged(snapshot.clone())));
        assert_eq!(grid.edit_buffer(), &snapshot);

        grid.change_field("nome", json!("Alicia")).unwrap();
        assert_eq!(grid.edit_buffer().get("nome"), Some(&json!("Alicia")));

        let events = grid.save(None).unwrap();
        assert_eq!(
            events[0],
            GridEvent::Save {
                row_id: RowId::Int(1),
                data: row(json!({"id": 1, "nome": "Alicia", "ativo": true})),
            }
        );
        assert_eq!(grid.editing_row_id(), None);
    }

    #[test]
    fn test_single_active_editor() {
        let mut grid = people_grid();
        grid.start_edit(&RowId::Int(1)).unwrap();
        grid.change_field("nome", json!("edited")).unwrap();

        grid.start_edit(&RowId::Int(2)).unwrap();
        assert_eq!(grid.editing_row_id(), Some(&RowId::Int(2)));
        assert_eq!(grid.edit_buffer().get("nome"), Some(&json!("Bruno")));

        let editing: Vec<_> = grid.rows().iter().filter(|r| grid.is_row_editing(r)).collect();
        assert_eq!(editing.len(), 1);
    }

    #[test]
    fn test_cancel_discards_edits() {
        let mut grid = people_grid();
        grid.start_edit(&RowId::Int(1)).unwrap();
        grid.change_field("nome", json!("discarded")).unwrap();
        grid.cancel();

        grid.start_edit(&RowId::Int(1)).unwrap();
        assert_eq!(grid.edit_buffer().get("nome"), Some(&json!("Alice")));
        assert_eq!(grid.rows()[0].get("nome"), Some(&json!("Alice")));
    }

    #[test]
    fn test_start_edit_unknown_row() {
        let mut grid = people_grid();
        assert_eq!(
            grid.start_edit(&RowId::Int(99)).unwrap_err(),
            GridError::UnknownRow(RowId::Int(99))
        );
    }

    #[test]
    fn test_save_with_overrides() {
        let mut grid = DataGrid::new(vec![Column::new("nome").editable(true)]);
        grid.set_data(vec![row(json!({"id": 1, "nome": "A", "cod": "X"}))]);
        grid.start_edit(&RowId::Int(1)).unwrap();
        grid.change_field("nome", json!("B")).unwrap();

        let events = grid.save(Some(&row(json!({"cod": "Y"})))).unwrap();
        assert_eq!(
            events[0],
            GridEvent::Save {
                row_id: RowId::Int(1),
                data: row(json!({"id": 1, "nome": "B", "cod": "Y"})),
            }
        );
    }

    #[test]
    fn test_page_requests_respect_bounds() {
        let mut grid = people_grid();
        grid.set_pagination(1, 1);
        assert_eq!(grid.request_prev_page(), None);
        assert_eq!(grid.request_next_page(), None);

        grid.set_pagination(2, 3);
        assert_eq!(grid.request_prev_page(), Some(GridEvent::PageChange(1)));
        assert_eq!(grid.request_next_page(), Some(GridEvent::PageChange(3)));
        // The grid never moves its own counter
        assert_eq!(grid.pagination().current_page(), 2);
    }

    #[test]
    fn test_keyboard_edit_flow() {
        let mut grid = people_grid();
        grid.handle_input(key(KeyCode::Char('e'))).unwrap();
        assert_eq!(grid.editing_row_id(), Some(&RowId::Int(1)));

        grid.handle_input(key(KeyCode::End)).unwrap();
        grid.handle_input(key(KeyCode::Backspace)).unwrap();
        grid.handle_input(key(KeyCode::Char('a'))).unwrap();
        assert_eq!(grid.edit_buffer().get("nome"), Some(&json!("Alica")));

        grid.handle_input(key(KeyCode::Tab)).unwrap();
        grid.handle_input(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(grid.edit_buffer().get("ativo"), Some(&json!(false)));

        let events = grid.handle_input(key(KeyCode::Enter)).unwrap();
        assert!(matches!(events[0], GridEvent::Save { .. }));
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_keyboard_escape_cancels() {
        let mut grid = people_grid();
        grid.handle_input(key(KeyCode::Char('j'))).unwrap();
        grid.handle_input(key(KeyCode::Enter)).unwrap();
        assert_eq!(grid.editing_row_id(), Some(&RowId::Int(2)));

        let events = grid.handle_input(key(KeyCode::Esc)).unwrap();
        assert_eq!(events[0], GridEvent::Cancelled);
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_keyboard_paging() {
        let mut grid = people_grid();
        grid.set_pagination(2, 3);
        assert_eq!(
            grid.handle_input(key(KeyCode::Char(']'))).unwrap(),
            vec![GridEvent::PageChange(3)]
        );
        assert_eq!(
            grid.handle_input(key(KeyCode::PageUp)).unwrap(),
            vec![GridEvent::PageChange(1)]
        );
    }

    #[test]
    fn test_keyboard_ignored_while_loading() {
        let mut grid = people_grid();
        grid.set_loading(true);
        assert!(grid.handle_input(key(KeyCode::Char('e'))).unwrap().is_empty());
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_unicode_typing() {
        let mut grid = people_grid();
        grid.start_edit(&RowId::Int(1)).unwrap();
        grid.handle_input(key(KeyCode::Char('ç'))).unwrap();
        grid.handle_input(key(KeyCode::Char('ã'))).unwrap();
        assert_eq!(grid.edit_buffer().get("nome"), Some(&json!("Aliceçã")));
    }

    #[test]
    fn test_number_input_keeps_leading_zeros() {
        let mut grid = DataGrid::new(vec![Column::new("vagas")
            .header("Vagas")
            .editable(true)
            .input_type(InputType::Number)]);
        grid.set_data(vec![row(json!({"id": 1, "vagas": ""}))]);
        grid.start_edit(&RowId::Int(1)).unwrap();

        for c in ['0', '0', '7'] {
            grid.handle_input(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(grid.edit_buffer().get("vagas"), Some(&json!("007")));
        assert_eq!(grid.input.value(), "007");
        assert_eq!(grid.input.cursor(), 3);

        grid.handle_input(key(KeyCode::Home)).unwrap();
        grid.handle_input(key(KeyCode::Delete)).unwrap();
        grid.handle_input(key(KeyCode::Delete)).unwrap();
        assert_eq!(grid.edit_buffer().get("vagas"), Some(&json!(7)));
    }

    #[test]
    fn test_renderer_fault_isolation() {
        let grid = {
            let mut grid = DataGrid::new(vec![
                Column::new("bloco").render(|value, _row| match value {
                    Some(Value::String(s)) if s == "B" => Err(CellError::new("boom")),
                    other => Ok(CellView::text(format!("Bloco {}", display_text(other)))),
                }),
                Column::new("numero"),
            ]);
            grid.set_data(vec![
                row(json!({"id": 1, "bloco": "A", "numero": 101})),
                row(json!({"id": 2, "bloco": "B", "numero": 202})),
            ]);
            grid
        };
        let columns = grid.columns().to_vec();
        let rows = grid.rows().to_vec();

        assert_eq!(line_text(&grid.table_cell(&rows[0], &columns[0])), "Bloco A");
        assert_eq!(line_text(&grid.table_cell(&rows[1], &columns[0])), "B");
        assert_eq!(line_text(&grid.table_cell(&rows[1], &columns[1])), "202");
    }

    #[test]
    fn test_renderer_fault_fallback_for_objects_and_nulls() {
        let failing = Column::new("unidade").render(|_, _| Err(CellError::new("boom")));
        let grid = DataGrid::new(vec![failing.clone()]);
        let with_object = row(json!({"id": 1, "unidade": {"bloco": "A"}}));
        let with_null = row(json!({"id": 2, "unidade": null}));
        assert_eq!(line_text(&grid.table_cell(&with_object, &failing)), r#"{"bloco":"A"}"#);
        assert_eq!(line_text(&grid.table_cell(&with_null, &failing)), "-");
    }

    #[test]
    fn test_table_edit_requires_explicit_flag() {
        let mut grid = DataGrid::new(vec![
            Column::new("nome").editable(true),
            Column::new("email"),
        ]);
        grid.set_data(vec![row(json!({"id": 1, "nome": "Ana", "email": "ana@x"}))]);
        grid.start_edit(&RowId::Int(1)).unwrap();
        let r = grid.rows()[0].clone();
        let columns = grid.columns().to_vec();

        assert_eq!(line_text(&grid.table_cell(&r, &columns[0])), "[Ana ]");
        assert_eq!(line_text(&grid.table_cell(&r, &columns[1])), "ana@x");
    }

    #[test]
    fn test_default_actions_follow_edit_state() {
        let mut grid = people_grid();
        let r = grid.rows()[0].clone();
        let actions = grid.columns()[2].clone();
        assert_eq!(line_text(&grid.table_cell(&r, &actions)), "✎");

        grid.start_edit(&RowId::Int(1)).unwrap();
        assert_eq!(line_text(&grid.table_cell(&r, &actions)), "✓ ✗");
    }

    #[test]
    fn test_custom_actions_renderer_is_used() {
        let actions = Column::actions().render(|_, row| {
            Ok(CellView::text(format!("reset {}", row.id().map(|id| id.to_string()).unwrap_or_default())))
        });
        let grid = DataGrid::new(vec![actions.clone()]);
        let r = row(json!({"id": 5}));
        assert_eq!(line_text(&grid.table_cell(&r, &actions)), "reset 5");
    }

    #[test]
    fn test_hidden_field_omitted_from_cards_in_view_and_edit() {
        let mut grid = DataGrid::new(vec![
            Column::new("nome").header("Nome"),
            Column::new("interno").header("Interno").render(|_, _| Ok(CellView::Hidden)),
        ]);
        grid.set_layout(LayoutMode::Compact);
        grid.set_data(vec![row(json!({"id": 1, "nome": "Ana", "interno": "x"}))]);
        let r = grid.rows()[0].clone();

        let keys: Vec<_> = grid.card_fields(&r).into_iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["nome"]);

        grid.start_edit(&RowId::Int(1)).unwrap();
        let fields = grid.card_fields(&r);
        assert_eq!(fields.len(), 1);
        assert!(fields[0].editing);
    }

    #[test]
    fn test_cards_suppress_actions_and_duplicate_event_fields() {
        let mut grid = DataGrid::new(vec![
            Column::new("titulo").header("Título"),
            Column::new("data_evento"),
            Column::new("hora_inicio"),
            Column::new("acoes").header("Ações"),
        ]);
        grid.set_layout(LayoutMode::Compact);
        grid.set_data(vec![row(json!({"id": 1, "titulo": "Festa"}))]);
        let r = grid.rows()[0].clone();
        let keys: Vec<_> = grid.card_fields(&r).into_iter().map(|f| f.key).collect();
        assert_eq!(keys, vec!["titulo"]);
    }

    #[test]
    fn test_cards_edit_everything_but_audit_and_opt_out() {
        let mut grid = DataGrid::new(vec![
            Column::new("nome"),
            Column::new("bloco").editable(false),
            Column::new("created_on"),
        ]);
        grid.set_layout(LayoutMode::Compact);
        grid.set_data(vec![row(json!({
            "id": 1,
            "nome": "Ana",
            "bloco": "A",
            "created_on": "2025-02-03T10:00:00Z"
        }))]);
        grid.start_edit(&RowId::Int(1)).unwrap();
        let r = grid.rows()[0].clone();
        let fields = grid.card_fields(&r);

        assert!(fields[0].editing);
        assert!(fields[0].focused);
        assert!(!fields[1].editing);
        assert!(!fields[2].editing);
        assert_eq!(line_text(&fields[2].content), "03/02/2025");
    }

    #[test]
    fn test_card_title_uses_first_data_column() {
        let grid = DataGrid::new(vec![Column::actions(), Column::new("nome").header("Nome")]);
        let r = row(json!({"id": 1, "nome": "Ana"}));
        assert_eq!(grid.card_title(&r), "Nome: Ana");

        let grid = DataGrid::new(vec![Column::actions()]);
        assert_eq!(grid.card_title(&r), "ID: 1");
    }

    #[test]
    fn test_compact_save_rejects_inverted_range() {
        let mut grid = DataGrid::new(vec![Column::new("datetime_inicio"), Column::new("datetime_fim")]);
        grid.set_layout(LayoutMode::Compact);
        grid.set_data(vec![row(json!({
            "id": 1,
            "datetime_inicio": "2025-05-01T10:00:00Z",
            "datetime_fim": "2025-05-01T12:00:00Z"
        }))]);
        grid.start_edit(&RowId::Int(1)).unwrap();
        grid.change_field("datetime_fim", json!("2025-05-01T09:00:00Z")).unwrap();

        assert_eq!(grid.save(None).unwrap_err(), GridError::InvalidRange);
        assert!(grid.is_editing());

        grid.change_field("datetime_fim", json!("2025-05-01T11:00:00Z")).unwrap();
        assert!(grid.save(None).is_ok());
    }

    #[test]
    fn test_external_editing_row_drives_session() {
        let mut grid = people_grid();
        let events = grid.set_editing_row(Some(RowId::Int(2)));
        assert_eq!(
            events,
            vec![GridEvent::EditDataChanged(grid.rows()[1].clone())]
        );
        assert!(grid.is_row_editing(&grid.rows()[1].clone()));

        grid.set_editing_row(None);
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_external_edit_data_drives_rendering_and_save() {
        let mut grid = people_grid();
        grid.set_delegate_field_edits(true);
        grid.start_edit(&RowId::Int(1)).unwrap();

        let events = grid.change_field("nome", json!("Owner")).unwrap();
        assert_eq!(
            events,
            vec![GridEvent::FieldEdit {
                key: "nome".to_string(),
                value: json!("Owner"),
            }]
        );

        grid.set_current_edit_data(Some(row(json!({"id": 1, "nome": "Owner", "ativo": true}))));
        let r = grid.rows()[0].clone();
        let nome = grid.columns()[0].clone();
        assert_eq!(line_text(&grid.table_cell(&r, &nome)), "[Owner ]");

        let events = grid.save(None).unwrap();
        assert_eq!(
            events[0],
            GridEvent::Save {
                row_id: RowId::Int(1),
                data: row(json!({"id": 1, "nome": "Owner", "ativo": true})),
            }
        );
    }

    #[test]
    fn test_resume_edit_restores_payload() {
        let mut grid = people_grid();
        let failed = row(json!({"id": 1, "nome": "Alicia", "ativo": true}));
        grid.resume_edit(&RowId::Int(1), &failed).unwrap();
        assert_eq!(grid.edit_buffer(), &failed);
    }

    #[test]
    fn test_new_data_ends_uncontrolled_session() {
        let mut grid = people_grid();
        grid.start_edit(&RowId::Int(1)).unwrap();
        let rows = grid.rows().to_vec();
        grid.set_data(rows);
        assert!(!grid.is_editing());
    }

    #[test]
    fn test_custom_editor_receives_merged_data() {
        struct Upper;
        impl Editor for Upper {
            fn render(&self, data: &Row, _focused: bool) -> Result<Line<'static>, CellError> {
                Ok(Line::raw(display_text(data.get("nome")).to_uppercase()))
            }
            fn handle_key(&self, _data: &Row, key: KeyEvent) -> Option<FieldChange> {
                match key.code {
                    KeyCode::Char('x') => Some(FieldChange::new("apelido", json!("X"))),
                    _ => None,
                }
            }
        }

        let mut grid = DataGrid::new(vec![Column::new("nome").editable(true).edit_component(Upper)]);
        grid.set_data(vec![row(json!({"id": 1, "nome": "ana"}))]);
        grid.start_edit(&RowId::Int(1)).unwrap();
        grid.change_field("nome", json!("bia")).unwrap();

        let r = grid.rows()[0].clone();
        let column = grid.columns()[0].clone();
        assert_eq!(line_text(&grid.table_cell(&r, &column)), "BIA");

        grid.handle_input(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(grid.edit_buffer().get("apelido"), Some(&json!("X")));
    }

    #[test]
    fn test_failing_editor_falls_back_to_default_input() {
        struct Broken;
        impl Editor for Broken {
            fn render(&self, _data: &Row, _focused: bool) -> Result<Line<'static>, CellError> {
                Err(CellError::new("broken"))
            }
            fn handle_key(&self, _data: &Row, _key: KeyEvent) -> Option<FieldChange> {
                None
            }
        }

        let mut grid = DataGrid::new(vec![Column::new("nome").editable(true).edit_component(Broken)]);
        grid.set_data(vec![row(json!({"id": 1, "nome": "ana"}))]);
        grid.start_edit(&RowId::Int(1)).unwrap();
        let r = grid.rows()[0].clone();
        let column = grid.columns()[0].clone();
        assert_eq!(line_text(&grid.table_cell(&r, &column)), "[ana ]");
    }
}
