//! Event handling for the application.
//!
//! Terminal input, resizes and ticks are turned into [`Event`]s; API results
//! arrive separately through the task channel.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{get_context_hints, get_keybindings_grouped, KeyContext, Keybinding};

/// Application events fed to `App::update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// The terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Periodic tick for animations and timers.
    Tick,
    /// Request to exit.
    Quit,
}
