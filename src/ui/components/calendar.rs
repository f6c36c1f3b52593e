//! Reservation availability calendar.
//!
//! A month grid starting on Sunday. Days from today through the end of the
//! month one year ahead can be chosen, unless the space is already booked.

use std::collections::HashSet;

use chrono::{Datelike, Duration, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::warn;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

const DAY_NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// Width of one day cell.
const CELL_WIDTH: usize = 4;

/// Actions returned from the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarAction {
    /// A free day was chosen.
    Select(NaiveDate),
    /// The visible month changed; availability for it should be fetched.
    MonthChanged(NaiveDate),
    /// Close without choosing.
    Close,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Portuguese month label, e.g. "Março 2025".
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[date.month0() as usize], date.year())
}

/// Month calendar with occupied and out-of-range days.
#[derive(Debug, Clone)]
pub struct ReservationCalendar {
    today: NaiveDate,
    /// First day of the visible month.
    view: NaiveDate,
    cursor: NaiveDate,
    occupied: HashSet<NaiveDate>,
    selected: Option<NaiveDate>,
}

impl ReservationCalendar {
    /// Create a calendar showing the month of `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            view: first_of_month(today),
            cursor: today,
            occupied: HashSet::new(),
            selected: None,
        }
    }

    /// Start on an already chosen date.
    pub fn with_selected(mut self, date: NaiveDate) -> Self {
        self.selected = Some(date);
        if date >= self.min_date() && date <= self.max_date() {
            self.view = first_of_month(date);
            self.cursor = date;
        }
        self
    }

    /// Earliest selectable day.
    pub fn min_date(&self) -> NaiveDate {
        self.today
    }

    /// Latest selectable day: the last day of the month one year ahead.
    pub fn max_date(&self) -> NaiveDate {
        let ahead = self
            .today
            .checked_add_months(Months::new(12))
            .unwrap_or(self.today + Duration::days(365));
        last_of_month(ahead)
    }

    /// Replace the occupied days with ISO `YYYY-MM-DD` strings.
    /// Unparseable entries are skipped.
    pub fn set_occupied<I, S>(&mut self, dates: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.occupied = dates
            .into_iter()
            .filter_map(|date| {
                let text = date.as_ref();
                // Accept timestamps too, keeping only the date part
                let day = text.split('T').next().unwrap_or(text);
                match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                    Ok(date) => Some(date),
                    Err(err) => {
                        warn!(date = %text, error = %err, "Ignoring unparseable occupied date");
                        None
                    }
                }
            })
            .collect();
    }

    /// Whether `date` is already booked.
    pub fn is_occupied(&self, date: NaiveDate) -> bool {
        self.occupied.contains(&date)
    }

    /// Whether `date` is outside the selectable range.
    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        date < self.min_date() || date > self.max_date()
    }

    /// Whether `date` can be chosen.
    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        !self.is_disabled(date) && !self.is_occupied(date)
    }

    /// The chosen date.
    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// The day under the cursor.
    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    /// First day of the visible month.
    pub fn view_month(&self) -> NaiveDate {
        self.view
    }

    /// Whether the previous month can be shown.
    pub fn can_prev_month(&self) -> bool {
        !same_month(self.view, self.min_date())
    }

    /// Whether the next month can be shown.
    pub fn can_next_month(&self) -> bool {
        !same_month(self.view, self.max_date())
    }

    /// Show the previous month. Returns true if the month changed.
    pub fn prev_month(&mut self) -> bool {
        if !self.can_prev_month() {
            return false;
        }
        match self.view.checked_sub_months(Months::new(1)) {
            Some(view) => self.show_month(view),
            None => false,
        }
    }

    /// Show the next month. Returns true if the month changed.
    pub fn next_month(&mut self) -> bool {
        if !self.can_next_month() {
            return false;
        }
        match self.view.checked_add_months(Months::new(1)) {
            Some(view) => self.show_month(view),
            None => false,
        }
    }

    fn show_month(&mut self, view: NaiveDate) -> bool {
        self.view = view;
        // Keep the cursor on the same day number where the month allows it
        let last = last_of_month(view).day();
        self.cursor = view.with_day(self.cursor.day().min(last)).unwrap_or(view);
        true
    }

    /// Move the cursor by a number of days, following it into the
    /// neighbouring month when that month may be shown.
    fn move_cursor(&mut self, days: i64) -> Option<CalendarAction> {
        let target = self.cursor + Duration::days(days);
        if same_month(target, self.view) {
            self.cursor = target;
            return None;
        }
        let allowed = if target < self.view {
            self.can_prev_month()
        } else {
            self.can_next_month()
        };
        if !allowed {
            return None;
        }
        self.view = first_of_month(target);
        self.cursor = target;
        Some(CalendarAction::MonthChanged(self.view))
    }

    /// Grid cells for the visible month: leading blanks up to the first
    /// weekday, then every day.
    pub fn days(&self) -> Vec<Option<NaiveDate>> {
        let offset = self.view.weekday().num_days_from_sunday() as usize;
        let last = last_of_month(self.view).day();
        let mut days = vec![None; offset];
        days.extend((1..=last).filter_map(|day| self.view.with_day(day)).map(Some));
        days
    }

    /// Handle a key press.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<CalendarAction> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-7),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(7),
            KeyCode::Char('<') | KeyCode::PageUp => {
                self.prev_month().then_some(CalendarAction::MonthChanged(self.view))
            }
            KeyCode::Char('>') | KeyCode::PageDown => {
                self.next_month().then_some(CalendarAction::MonthChanged(self.view))
            }
            KeyCode::Enter => {
                if self.is_selectable(self.cursor) {
                    self.selected = Some(self.cursor);
                    Some(CalendarAction::Select(self.cursor))
                } else {
                    None
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => Some(CalendarAction::Close),
            _ => None,
        }
    }

    fn day_style(&self, date: NaiveDate) -> Style {
        let mut style = if self.is_disabled(date) {
            Style::default().fg(Color::DarkGray)
        } else if self.is_occupied(date) {
            Style::default().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(Color::Green)
        };
        if self.selected == Some(date) {
            style = style.bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD);
        }
        if self.cursor == date {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }

    /// Text lines of the calendar body.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let nav = |label: &'static str, enabled: bool| {
            let style = if enabled {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(label, style)
        };

        let mut lines = vec![
            Line::from(vec![
                nav("‹ ", self.can_prev_month()),
                Span::styled(
                    month_label(self.view),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                nav(" ›", self.can_next_month()),
            ])
            .alignment(Alignment::Center),
            Line::from(
                DAY_NAMES
                    .iter()
                    .map(|name| {
                        Span::styled(
                            format!("{:>width$}", name, width = CELL_WIDTH),
                            Style::default().fg(Color::Yellow),
                        )
                    })
                    .collect::<Vec<_>>(),
            ),
        ];

        for week in self.days().chunks(7) {
            let spans = week
                .iter()
                .map(|day| match day {
                    Some(date) => Span::styled(
                        format!("{:>width$}", date.day(), width = CELL_WIDTH),
                        self.day_style(*date),
                    ),
                    None => Span::raw(" ".repeat(CELL_WIDTH)),
                })
                .collect::<Vec<_>>();
            lines.push(Line::from(spans));
        }

        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Green)),
            Span::raw("Disponível  "),
            Span::styled("■ ", Style::default().fg(Color::Red)),
            Span::raw("Ocupado  "),
            Span::styled("■ ", Style::default().fg(Color::DarkGray)),
            Span::raw("Indisponível"),
        ]));
        lines
    }

    /// Render as a centered overlay.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = (CELL_WIDTH as u16 * 7 + 4).min(area.width);
        let height = 14u16.min(area.height);
        let overlay = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, overlay);
        let block = Block::default()
            .title(" Reservar data ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        frame.render_widget(Paragraph::new(self.lines()).block(block), overlay);
    }
}
