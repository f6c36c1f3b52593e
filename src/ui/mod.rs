//! User interface components and views.
//!
//! The data grid lives in `crate::grid`; this module holds everything
//! around it: inputs, the reservation calendar, toasts, dialogs and the
//! help screen.

mod components;
mod views;

pub use components::{
    month_label, render_context_help, CalendarAction, ConfirmAction, ConfirmDialog, ErrorDialog,
    LoadingIndicator, Notification, NotificationManager, NotificationType, ReservationCalendar,
    SearchAction, SearchBar, TextInput,
};
pub use views::{HelpAction, HelpView};
