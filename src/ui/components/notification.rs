//! Toast notifications.
//!
//! Save results and recoverable errors are reported as short-lived toasts
//! stacked in the bottom-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Maximum number of toasts on screen.
const MAX_VISIBLE: usize = 3;

/// The kind of notification, which determines its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
}

impl NotificationType {
    /// Icon prefix.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
            NotificationType::Warning => "⚠",
            NotificationType::Error => "✗",
        }
    }

    /// Foreground and border color.
    pub fn color(&self) -> Color {
        match self {
            NotificationType::Info => Color::Blue,
            NotificationType::Success => Color::Green,
            NotificationType::Warning => Color::Yellow,
            NotificationType::Error => Color::Red,
        }
    }

    fn default_duration(&self) -> Duration {
        match self {
            NotificationType::Info | NotificationType::Success => Duration::from_secs(3),
            NotificationType::Warning | NotificationType::Error => Duration::from_secs(5),
        }
    }
}

/// A single notification message.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The message.
    pub message: String,
    /// The kind of notification.
    pub notification_type: NotificationType,
    created_at: Instant,
    /// How long the notification stays on screen.
    pub duration: Duration,
}

impl Notification {
    /// Create a notification with the default duration for its kind.
    pub fn new(message: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            message: message.into(),
            notification_type,
            created_at: Instant::now(),
            duration: notification_type.default_duration(),
        }
    }

    /// Info notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info)
    }

    /// Success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Success)
    }

    /// Warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Warning)
    }

    /// Error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error)
    }

    /// Override the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }

    /// Rows needed to show the message at `inner_width` columns, plus borders.
    fn height(&self, inner_width: usize) -> u16 {
        // Icon and space.
        let len = self.message.chars().count() + 2;
        let lines = if inner_width > 0 {
            len.div_ceil(inner_width)
        } else {
            1
        };
        u16::try_from(lines).unwrap_or(u16::MAX).saturating_add(2)
    }
}

/// Queue of visible notifications, oldest first.
#[derive(Debug, Default)]
pub struct NotificationManager {
    notifications: VecDeque<Notification>,
}

impl NotificationManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notification, dropping the oldest beyond the visible limit.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        while self.notifications.len() > MAX_VISIBLE {
            self.notifications.pop_front();
        }
    }

    /// Add an info notification.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::info(message));
    }

    /// Add a success notification.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::success(message));
    }

    /// Add a warning notification.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::warning(message));
    }

    /// Add an error notification.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }

    /// Remove expired notifications. Called on every tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Render the stack in the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let width = 50.min(area.width.saturating_sub(4));
        // Borders and icon.
        let inner_width = usize::from(width.saturating_sub(4));
        let heights: Vec<u16> = self.notifications.iter().map(|n| n.height(inner_width)).collect();
        let total = heights.iter().sum::<u16>().min(area.height.saturating_sub(2));

        let stack = Rect::new(
            area.x + area.width.saturating_sub(width + 2),
            area.y + area.height.saturating_sub(total + 1),
            width,
            total,
        );
        let chunks = Layout::vertical(heights.iter().map(|&h| Constraint::Length(h))).split(stack);

        for (notification, chunk) in self.notifications.iter().zip(chunks.iter()) {
            render_notification(notification, frame, *chunk);
        }
    }
}

fn render_notification(notification: &Notification, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let kind = notification.notification_type;
    let style = Style::default().fg(kind.color());
    let text = Line::from(vec![
        Span::styled(format!("{} ", kind.icon()), style.add_modifier(Modifier::BOLD)),
        Span::styled(notification.message.clone(), style),
    ]);
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(style))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
