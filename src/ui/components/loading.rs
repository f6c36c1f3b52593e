//! Spinner shown in the status bar while requests are in flight.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A loading indicator with an animated spinner.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    message: String,
    frame: usize,
    active: bool,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingIndicator {
    /// Create an inactive indicator.
    pub fn new() -> Self {
        Self::with_message("Carregando...")
    }

    /// Create an inactive indicator with a custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: 0,
            active: false,
        }
    }

    /// Get the current message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Start the indicator.
    pub fn start(&mut self) {
        self.active = true;
        self.frame = 0;
    }

    /// Start with a specific message.
    pub fn start_with_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.start();
    }

    /// Stop the indicator.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Check if the indicator is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the animation. Called on every tick.
    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Get the current spinner frame.
    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }

    /// Spinner and message, or an empty string when inactive.
    pub fn text(&self) -> String {
        if self.active {
            format!("{} {}", self.spinner_frame(), self.message)
        } else {
            String::new()
        }
    }

    /// Render right-aligned in the given area.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }
        let paragraph = Paragraph::new(self.text())
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Right);
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_indicator_new() {
        let loader = LoadingIndicator::new();
        assert_eq!(loader.message(), "Carregando...");
        assert!(!loader.is_active());
        assert!(loader.text().is_empty());
    }

    #[test]
    fn test_start_with_message() {
        let mut loader = LoadingIndicator::new();
        loader.start_with_message("Salvando...");
        assert!(loader.is_active());
        assert!(loader.text().ends_with("Salvando..."));
        loader.stop();
        assert!(!loader.is_active());
    }

    #[test]
    fn test_tick_advances_and_wraps() {
        let mut loader = LoadingIndicator::new();
        loader.start();
        let first = loader.spinner_frame();
        loader.tick();
        assert_ne!(loader.spinner_frame(), first);

        for _ in 1..SPINNER_FRAMES.len() {
            loader.tick();
        }
        assert_eq!(loader.spinner_frame(), first);
    }

    #[test]
    fn test_tick_inactive_does_nothing() {
        let mut loader = LoadingIndicator::new();
        loader.tick();
        assert_eq!(loader.frame, 0);
    }
}
