//! Column descriptors.
//!
//! A column describes how one field of a row is displayed and edited. View
//! and edit behavior are two independent optional capabilities:
//!
//! - a [`Viewer`] turns `(value, row)` into display content
//! - an [`Editor`] draws the edit control from the in-progress edit data and
//!   turns key presses into [`FieldChange`] requests
//!
//! Columns without either fall back to the grid's default display and
//! default inputs.

use std::fmt;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::text::Line;
use serde_json::Value;
use thiserror::Error;

use super::row::Row;

/// Key of the reserved actions column.
pub const ACTIONS_KEY: &str = "actions";

/// Alternative spellings of the actions column recognised by the card renderer.
const ACTIONS_ALIASES: &[&str] = &["actions", "acoes"];

/// Audit timestamp fields. Never editable in compact mode.
const AUDIT_KEYS: &[&str] = &["created_on", "criado_em", "updated_on", "atualizado_em"];

/// What a viewer produced for a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    /// Content to display.
    Shown(Line<'static>),
    /// Omit the field entirely (honoured by the card renderer).
    Hidden,
}

impl CellView {
    /// Plain text content.
    pub fn text(text: impl Into<String>) -> Self {
        CellView::Shown(Line::raw(text.into()))
    }

    /// Whether this is the hidden-field sentinel.
    pub fn is_hidden(&self) -> bool {
        matches!(self, CellView::Hidden)
    }

    /// The displayed line, empty for hidden cells.
    pub fn into_line(self) -> Line<'static> {
        match self {
            CellView::Shown(line) => line,
            CellView::Hidden => Line::default(),
        }
    }
}

/// A column renderer failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CellError(String);

impl CellError {
    /// Create a renderer error with a message.
    pub fn new(msg: impl Into<String>) -> Self {
        CellError(msg.into())
    }
}

/// A requested change to one field of the edit buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// The field key. Editors may target any field, not only their own column.
    pub key: String,
    /// The new value.
    pub value: Value,
}

impl FieldChange {
    /// Create a field change.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// View-mode renderer for a column.
pub trait Viewer: Send + Sync {
    /// Produce the display content for a field.
    ///
    /// `value` is `row[key]`. Returning `Err` makes the grid log the failure
    /// and show a fallback rendering of the raw value instead.
    fn view(&self, value: Option<&Value>, row: &Row) -> Result<CellView, CellError>;
}

impl<F> Viewer for F
where
    F: Fn(Option<&Value>, &Row) -> Result<CellView, CellError> + Send + Sync,
{
    fn view(&self, value: Option<&Value>, row: &Row) -> Result<CellView, CellError> {
        self(value, row)
    }
}

/// Edit-mode control for a column.
pub trait Editor: Send + Sync {
    /// Draw the control from the active edit data (edit buffer merged over
    /// the original row).
    fn render(&self, data: &Row, focused: bool) -> Result<Line<'static>, CellError>;

    /// Turn a key press into a field change, or `None` to ignore it.
    fn handle_key(&self, data: &Row, key: KeyEvent) -> Option<FieldChange>;
}

/// An option of a select input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Stored value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl SelectOption {
    /// Create an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Semantic type of the default input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputType {
    /// Single-line free text.
    #[default]
    Text,
    /// Numeric text; stored as a JSON number when it parses.
    Number,
    /// `YYYY-MM-DD`.
    Date,
    /// `YYYY-MM-DDTHH:MM`, stored as `YYYY-MM-DDTHH:MM:00Z`.
    DateTime,
    /// Boolean toggle.
    Checkbox,
    /// One of a fixed set of string values.
    Select(Vec<SelectOption>),
    /// Masked free text.
    Password,
}

impl InputType {
    /// Whether this input is typed into character by character.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            InputType::Text
                | InputType::Number
                | InputType::Date
                | InputType::DateTime
                | InputType::Password
        )
    }
}

/// Describes one field of the entity being displayed.
#[derive(Clone)]
pub struct Column {
    /// Field key, used to index into rows.
    pub key: String,
    header: Option<String>,
    label: Option<String>,
    /// Proportional width hint (percent) for the table renderer.
    pub width: Option<u16>,
    /// Explicit editability. `None` lets each renderer apply its own default.
    pub editable: Option<bool>,
    /// Input type of the default editor.
    pub input_type: InputType,
    render: Option<Arc<dyn Viewer>>,
    edit_component: Option<Arc<dyn Editor>>,
}

impl Column {
    /// Create a column for a field key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: None,
            label: None,
            width: None,
            editable: None,
            input_type: InputType::default(),
            render: None,
            edit_component: None,
        }
    }

    /// Create the reserved actions column.
    pub fn actions() -> Self {
        Self::new(ACTIONS_KEY).header("Ações")
    }

    /// Set the header text.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Set the label text (synonym of header; header wins).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the proportional width hint.
    pub fn width(mut self, percent: u16) -> Self {
        self.width = Some(percent);
        self
    }

    /// Mark the column editable or explicitly non-editable.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    /// Set the default input type.
    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Set a view renderer from a closure.
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(Option<&Value>, &Row) -> Result<CellView, CellError> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Set a shared view renderer.
    pub fn viewer(mut self, viewer: Arc<dyn Viewer>) -> Self {
        self.render = Some(viewer);
        self
    }

    /// Set the edit control.
    pub fn edit_component<E: Editor + 'static>(mut self, editor: E) -> Self {
        self.edit_component = Some(Arc::new(editor));
        self
    }

    /// The view renderer, if any.
    pub fn renderer(&self) -> Option<&dyn Viewer> {
        self.render.as_deref()
    }

    /// The edit control, if any.
    pub fn editor(&self) -> Option<&dyn Editor> {
        self.edit_component.as_deref()
    }

    /// Display title: header, else label, else the key.
    pub fn title(&self) -> &str {
        self.header
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or(self.key.as_str())
    }

    /// Whether this is the reserved actions column.
    pub fn is_actions(&self) -> bool {
        self.key == ACTIONS_KEY
    }

    /// Broader actions detection used by the card renderer: alias keys and
    /// an "Ações" header or label.
    pub fn is_actions_like(&self) -> bool {
        ACTIONS_ALIASES.contains(&self.key.as_str())
            || [self.header.as_deref(), self.label.as_deref()]
                .into_iter()
                .flatten()
                .any(|text| text.to_lowercase() == "ações")
    }

    /// Whether the key is an audit timestamp.
    pub fn is_audit_timestamp(&self) -> bool {
        AUDIT_KEYS.contains(&self.key.as_str())
    }

    /// Editability in the table renderer: only explicit opt-in.
    pub fn editable_in_table(&self) -> bool {
        self.editable == Some(true) && !self.is_actions()
    }

    /// Editability in the card renderer: everything unless explicitly
    /// disabled, an actions column or an audit timestamp.
    pub fn editable_in_cards(&self) -> bool {
        self.editable != Some(false) && !self.is_actions_like() && !self.is_audit_timestamp()
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title())
            .field("width", &self.width)
            .field("editable", &self.editable)
            .field("input_type", &self.input_type)
            .field("has_render", &self.render.is_some())
            .field("has_edit_component", &self.edit_component.is_some())
            .finish()
    }
}
