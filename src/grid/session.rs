//! Row edit session.
//!
//! At most one row is edited at a time. The session holds the id of that
//! row and an edit buffer: a shallow copy of the row taken at edit start,
//! overlaid with every field the user changed since. The original row is
//! never touched.
//!
//! The session can be driven by the grid itself or by its owner. When the
//! owner supplies an editing row id, that id is authoritative and the buffer
//! is re-synchronised from the data whenever the id changes. When the owner
//! supplies its own edit data, that data supersedes the buffer for both
//! rendering and saving.

use serde_json::Value;
use thiserror::Error;

use super::row::{Row, RowId};

/// Notifications emitted by the grid, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Edit mode started (`Some`) or ended (`None`).
    EditRow(Option<RowId>),
    /// Full row at the moment edit mode started.
    EditStarted(Row),
    /// The user confirmed a save. `data` is the merged payload.
    Save {
        /// The edited row.
        row_id: RowId,
        /// Original row, overlaid by the edit data, overlaid by call-time overrides.
        data: Row,
    },
    /// The user aborted an edit.
    Cancelled,
    /// The edit buffer changed. Empty when the session ends.
    EditDataChanged(Row),
    /// A field edit delegated to the owner; the internal buffer was bypassed.
    FieldEdit {
        /// Field key.
        key: String,
        /// New value.
        value: Value,
    },
    /// The user asked for another page.
    PageChange(u32),
}

/// Misuse of the grid's edit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Save or field change with no row in edit mode.
    #[error("no row is being edited")]
    NotEditing,

    /// Edit requested for an id that is not in the current data.
    #[error("row {0} is not in the current page")]
    UnknownRow(RowId),

    /// The row has no usable id.
    #[error("row has no id field")]
    MissingId,

    /// End date/time is not after the start date/time.
    #[error("A data/hora de término deve ser posterior à data/hora de início.")]
    InvalidRange,
}

/// Single-slot edit session state.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    /// Row currently in edit mode.
    row_id: Option<RowId>,
    /// Internal edit buffer.
    buffer: Row,
    /// Last editing row id supplied by the owner.
    external_row_id: Option<RowId>,
    /// Edit data supplied by the owner.
    external_data: Option<Row>,
    /// Whether field edits are handed to the owner instead of the buffer.
    delegate_field_edits: bool,
}

impl EditSession {
    /// Create an idle, uncontrolled session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The row currently in edit mode.
    pub fn editing_row_id(&self) -> Option<&RowId> {
        self.row_id.as_ref()
    }

    /// Whether `id` is the row in edit mode.
    pub fn is_editing(&self, id: Option<&RowId>) -> bool {
        id.is_some() && self.row_id.as_ref() == id
    }

    /// Whether any row is in edit mode.
    pub fn is_active(&self) -> bool {
        self.row_id.is_some()
    }

    /// The internal buffer.
    pub fn buffer(&self) -> &Row {
        &self.buffer
    }

    /// Whether field edits are delegated to the owner.
    pub fn delegates_field_edits(&self) -> bool {
        self.delegate_field_edits
    }

    /// Delegate field edits to the owner (or take them back).
    pub fn set_delegate_field_edits(&mut self, delegate: bool) {
        self.delegate_field_edits = delegate;
    }

    /// Supply or withdraw owner edit data.
    pub fn set_external_data(&mut self, data: Option<Row>) {
        self.external_data = data;
    }

    /// The edit data in force: owner data when present and non-empty,
    /// otherwise the internal buffer.
    pub fn source(&self) -> &Row {
        match &self.external_data {
            Some(data) if !data.is_empty() => data,
            _ => &self.buffer,
        }
    }

    /// The edit data as seen by editors: the source merged over `row`.
    pub fn effective_data(&self, row: &Row) -> Row {
        row.merged(self.source())
    }

    /// Start editing `row`, replacing any session in progress.
    pub fn start(&mut self, row: &Row) -> Result<Vec<GridEvent>, GridError> {
        let id = row.id().ok_or(GridError::MissingId)?;
        self.row_id = Some(id.clone());
        self.buffer = row.clone();
        Ok(vec![
            GridEvent::EditDataChanged(self.buffer.clone()),
            GridEvent::EditRow(Some(id)),
            GridEvent::EditStarted(row.clone()),
        ])
    }

    /// Start editing `row` with `data` already applied to the buffer.
    ///
    /// Used to re-open a row whose save failed, so the user's edits are not
    /// lost.
    pub fn resume(&mut self, row: &Row, data: &Row) -> Result<Vec<GridEvent>, GridError> {
        let mut events = self.start(row)?;
        self.buffer.overlay(data);
        events.push(GridEvent::EditDataChanged(self.buffer.clone()));
        Ok(events)
    }

    /// Apply a field change.
    ///
    /// Delegated sessions only report the change; otherwise the buffer is
    /// updated and reported.
    pub fn change_field(&mut self, key: &str, value: Value) -> Result<Vec<GridEvent>, GridError> {
        if !self.is_active() {
            return Err(GridError::NotEditing);
        }
        if self.delegate_field_edits {
            return Ok(vec![GridEvent::FieldEdit {
                key: key.to_string(),
                value,
            }]);
        }
        self.buffer.set(key, value);
        Ok(vec![GridEvent::EditDataChanged(self.buffer.clone())])
    }

    /// Compute the save payload without ending the session.
    ///
    /// Precedence, highest first: `overrides`, the edit data in force,
    /// `original`.
    pub fn payload(&self, original: &Row, overrides: Option<&Row>) -> Row {
        let mut data = original.merged(self.source());
        if let Some(overrides) = overrides {
            data.overlay(overrides);
        }
        data
    }

    /// Hand the payload over and end the session.
    ///
    /// The session is cleared whether or not the owner's save later
    /// succeeds.
    pub fn save(&mut self, original: &Row, overrides: Option<&Row>) -> Result<Vec<GridEvent>, GridError> {
        let row_id = self.row_id.clone().ok_or(GridError::NotEditing)?;
        let data = self.payload(original, overrides);
        self.clear();
        Ok(vec![
            GridEvent::Save { row_id, data },
            GridEvent::EditRow(None),
            GridEvent::EditDataChanged(Row::new()),
        ])
    }

    /// Abort the session without saving.
    pub fn cancel(&mut self) -> Vec<GridEvent> {
        self.clear();
        vec![
            GridEvent::Cancelled,
            GridEvent::EditRow(None),
            GridEvent::EditDataChanged(Row::new()),
        ]
    }

    /// Record the owner's editing row id, re-synchronising on change.
    pub fn set_external_row_id(&mut self, id: Option<RowId>, data: &[Row]) -> Vec<GridEvent> {
        if self.external_row_id == id {
            return Vec::new();
        }
        self.external_row_id = id;
        self.sync(data)
    }

    /// One-way synchronisation from the owner's editing row id.
    ///
    /// Runs when the owner's id changes and whenever the data is replaced.
    /// With an id whose row is present, the buffer becomes a fresh copy of
    /// that row. Without an id, the buffer is emptied and edit mode ends.
    /// An id whose row is absent keeps the buffer as is.
    pub fn sync(&mut self, data: &[Row]) -> Vec<GridEvent> {
        let mut events = Vec::new();
        match &self.external_row_id {
            Some(id) => {
                if let Some(row) = data.iter().find(|row| row.id().as_ref() == Some(id)) {
                    self.buffer = row.clone();
                    events.push(GridEvent::EditDataChanged(self.buffer.clone()));
                }
            }
            None => {
                self.buffer = Row::new();
                events.push(GridEvent::EditDataChanged(Row::new()));
            }
        }
        self.row_id = self.external_row_id.clone();
        events
    }

    fn clear(&mut self) {
        self.row_id = None;
        self.buffer = Row::new();
    }
}
