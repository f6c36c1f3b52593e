//! Full-screen views.

mod help;

pub use help::{HelpAction, HelpView};
