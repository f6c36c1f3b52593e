//! Event handler implementation.
//!
//! Polls crossterm for terminal events and converts them to application events.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};

use super::Event;

/// Default tick rate for the event loop in milliseconds.
const TICK_RATE_MS: u64 = 250;

/// Handles application events by polling crossterm for terminal events.
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler with the default tick rate.
    pub fn new() -> Self {
        Self::with_tick_rate(TICK_RATE_MS)
    }

    /// Create a new event handler with a custom tick rate.
    pub fn with_tick_rate(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event.
    ///
    /// Blocks until an event is available or the tick rate elapses, in which
    /// case `Event::Tick` is returned.
    pub fn next(&self) -> std::io::Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }
        Ok(convert(event::read()?))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a crossterm event onto an application event.
///
/// Key releases (reported on Windows) are folded into ticks so each press
/// is handled once.
fn convert(event: CrosstermEvent) -> Event {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Release => Event::Tick,
        CrosstermEvent::Key(key) => Event::Key(key),
        CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
        CrosstermEvent::Mouse(_)
        | CrosstermEvent::FocusGained
        | CrosstermEvent::FocusLost
        | CrosstermEvent::Paste(_) => Event::Tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_event_handler_tick_rates() {
        assert_eq!(EventHandler::new().tick_rate, Duration::from_millis(TICK_RATE_MS));
        assert_eq!(EventHandler::with_tick_rate(50).tick_rate, Duration::from_millis(50));
        assert_eq!(EventHandler::default().tick_rate, Duration::from_millis(TICK_RATE_MS));
    }

    #[test]
    fn test_convert_resize() {
        assert_eq!(convert(CrosstermEvent::Resize(80, 24)), Event::Resize(80, 24));
    }

    #[test]
    fn test_convert_key_press_and_release() {
        let press = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE);
        assert_eq!(convert(CrosstermEvent::Key(press)), Event::Key(press));

        let release = KeyEvent {
            code: KeyCode::Char('e'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(convert(CrosstermEvent::Key(release)), Event::Tick);
    }

    #[test]
    fn test_convert_ignored_events() {
        assert_eq!(convert(CrosstermEvent::FocusGained), Event::Tick);
        assert_eq!(convert(CrosstermEvent::Paste("x".to_string())), Event::Tick);
    }
}
