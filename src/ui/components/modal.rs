//! Modal dialogs: the error dialog for critical failures and the yes/no
//! confirmation prompt.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;

/// A dismissable dialog blocking all other input while visible.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    title: String,
    message: String,
    hint: Option<String>,
    visible: bool,
}

impl ErrorDialog {
    /// Create a hidden dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an application error with its suggested action.
    pub fn show(&mut self, error: &AppError) {
        self.title = "Erro".to_string();
        self.message = error.user_message();
        self.hint = error.suggested_action().map(str::to_string);
        self.visible = true;
    }

    /// Hide the dialog.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    /// Check if the dialog is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The displayed message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render centered over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog = centered(area, 9);

        let mut lines = vec![Line::raw(""), Line::raw(self.message.clone())];
        if let Some(hint) = &self.hint {
            lines.push(Line::raw(""));
            lines.push(Line::styled(hint.clone(), Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "[Enter/Esc] fechar",
            Style::default().fg(Color::DarkGray),
        ));

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));

        frame.render_widget(Clear, dialog);
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            dialog,
        );
    }
}

/// Answer given to a [`ConfirmDialog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// A yes/no question asked before an irreversible action.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    message: String,
    visible: bool,
}

impl ConfirmDialog {
    /// Create a hidden dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask `message`.
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.visible = true;
    }

    /// Check if the dialog is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The question asked.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Handle a key; any answer hides the dialog.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        if !self.visible {
            return None;
        }
        let action = match key.code {
            KeyCode::Char('s' | 'S' | 'y' | 'Y') | KeyCode::Enter => ConfirmAction::Confirm,
            KeyCode::Char('n' | 'N') | KeyCode::Esc => ConfirmAction::Cancel,
            _ => return None,
        };
        self.visible = false;
        Some(action)
    }

    /// Render centered over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let dialog = centered(area, 7);
        let lines = vec![
            Line::raw(""),
            Line::raw(self.message.clone()),
            Line::raw(""),
            Line::styled(
                "[s/Enter] confirmar  [n/Esc] cancelar",
                Style::default().fg(Color::DarkGray),
            ),
        ];
        let block = Block::default()
            .title(" Confirmar ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        frame.render_widget(Clear, dialog);
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            dialog,
        );
    }
}

fn centered(area: Rect, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [dialog] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(row);
    dialog
}
