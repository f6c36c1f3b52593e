//! Reusable UI components.

mod calendar;
mod help_bar;
mod input;
mod loading;
mod modal;
mod notification;
mod search_bar;

pub use calendar::{month_label, CalendarAction, ReservationCalendar};
pub use help_bar::render_context_help;
pub use input::TextInput;
pub use loading::LoadingIndicator;
pub use modal::{ConfirmAction, ConfirmDialog, ErrorDialog};
pub use notification::{Notification, NotificationManager, NotificationType};
pub use search_bar::{SearchAction, SearchBar};
