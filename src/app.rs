//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA) pattern for predictable
//! state management in the TUI application. Network work is never started
//! here: `update` queues [`Request`]s that the runtime drains with
//! [`App::take_requests`], and results come back through
//! [`App::handle_api_message`].

mod screens;

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::api::{ApiError, Page, Resource};
use crate::config::Profile;
use crate::error::AppError;
use crate::events::{Event, KeyContext};
use crate::grid::{DataGrid, GridError, GridEvent, ResponsiveSwitch, Row, RowId};
use crate::tasks::ApiMessage;
use crate::ui::{
    render_context_help, CalendarAction, ConfirmAction, ConfirmDialog, ErrorDialog, HelpAction,
    HelpView, LoadingIndicator, NotificationManager, ReservationCalendar, SearchAction, SearchBar,
};

use screens::Screen;

/// Field of a reservation holding the booked day.
const RESERVATION_DATE_KEY: &str = "data_reserva";

/// Field of a reservation holding the space id.
const RESERVATION_SPACE_KEY: &str = "espaco";

/// The current view/screen state of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Browsing (or editing) the records of the active screen.
    #[default]
    Browsing,
    /// Typing a search term.
    Searching,
    /// Picking a reservation date.
    Calendar,
    /// Waiting for a yes/no answer.
    Confirm,
    /// Help screen is displayed.
    Help,
    /// Application is in the process of exiting.
    Exiting,
}

/// Work the runtime should perform on the application's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Fetch one listing page.
    FetchPage {
        resource: Resource,
        page: u32,
        search: String,
    },
    /// Send a partial update.
    SaveRow {
        resource: Resource,
        id: RowId,
        payload: Row,
    },
    /// Create a record.
    CreateRow { resource: Resource, payload: Row },
    /// Delete a record.
    DeleteRow { resource: Resource, id: RowId },
    /// Fetch the occupied days of a space.
    FetchAvailability { space_id: RowId, month: NaiveDate },
}

/// What a date picked in the calendar is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CalendarPurpose {
    /// Change the date of the reservation being edited.
    Reschedule,
    /// Book the space on that date.
    Book,
}

/// The open reservation calendar and what it was opened for.
struct CalendarSession {
    calendar: ReservationCalendar,
    /// Space whose availability is shown.
    space_id: Option<RowId>,
    purpose: CalendarPurpose,
}

/// The main application struct that holds all state.
///
/// This implements the Model part of The Elm Architecture (TEA).
pub struct App {
    /// The current view state.
    state: AppState,
    /// Whether the application should quit.
    should_quit: bool,
    /// The profile in use.
    profile: Profile,
    /// Screens the profile's role may open.
    resources: &'static [Resource],
    /// Index of the active screen in `resources`.
    active: usize,
    /// The active screen.
    screen: Screen,
    /// Records of the active screen.
    grid: DataGrid,
    /// Table/cards switch driven by the terminal width.
    layout: ResponsiveSwitch,
    /// Page shown (or being fetched).
    page: u32,
    /// Search prompt.
    search: SearchBar,
    /// Reservation calendar, while open.
    calendar: Option<CalendarSession>,
    /// Delete confirmation prompt.
    confirm: ConfirmDialog,
    /// Record the confirmation prompt is about.
    pending_delete: Option<(Resource, RowId)>,
    /// The help screen.
    help: HelpView,
    /// Notification manager for toast messages.
    notifications: NotificationManager,
    /// Error dialog for critical errors.
    error_dialog: ErrorDialog,
    /// Global loading indicator.
    loading: LoadingIndicator,
    /// Requests not yet handed to the runtime.
    requests: Vec<Request>,
}

impl App {
    /// Create the application for `profile` on a terminal `width` columns
    /// wide, and queue the first page of the first screen.
    pub fn new(profile: Profile, breakpoint: u16, width: u16) -> Self {
        let resources = profile.role.resources();
        let resource = resources.first().copied().unwrap_or(Resource::Notices);
        debug!(profile = %profile.name, role = ?profile.role, %resource, "Creating application");

        let layout = ResponsiveSwitch::new(breakpoint, width);
        let screen = Screen::new(resource, profile.role);
        let grid = build_grid(&screen, &layout);

        let mut app = Self {
            state: AppState::Browsing,
            should_quit: false,
            profile,
            resources,
            active: 0,
            screen,
            grid,
            layout,
            page: 1,
            search: SearchBar::new(),
            calendar: None,
            confirm: ConfirmDialog::new(),
            pending_delete: None,
            help: HelpView::new(),
            notifications: NotificationManager::new(),
            error_dialog: ErrorDialog::new(),
            loading: LoadingIndicator::new(),
            requests: Vec::new(),
        };
        app.request_page();
        app
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Get the current application state.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// The active screen.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The records grid.
    pub fn grid(&self) -> &DataGrid {
        &self.grid
    }

    /// The page shown or being fetched.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Get a reference to the notification manager.
    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    /// Check if the error dialog is showing.
    pub fn has_error_dialog(&self) -> bool {
        self.error_dialog.is_visible()
    }

    /// Hand the queued requests over to the runtime.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update the application state based on an event.
    ///
    /// This is the Update part of The Elm Architecture (TEA).
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resized");
                if self.layout.observe(width) {
                    info!(width, mode = ?self.layout.mode(), "Switching grid layout");
                    self.grid.set_layout(self.layout.mode());
                }
            }
            Event::Tick => {
                self.loading.tick();
                self.notifications.tick();
            }
            Event::Quit => self.quit(),
        }
    }

    fn quit(&mut self) {
        info!("Quitting application");
        self.state = AppState::Exiting;
        self.should_quit = true;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.error_dialog.is_visible() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.error_dialog.dismiss();
            }
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        match self.state {
            AppState::Browsing => self.handle_browse_key(key),
            AppState::Searching => self.handle_search_key(key),
            AppState::Calendar => self.handle_calendar_key(key),
            AppState::Confirm => self.handle_confirm_key(key),
            AppState::Help => {
                if let Some(HelpAction::Close) = self.help.handle_input(key) {
                    self.state = AppState::Browsing;
                }
            }
            AppState::Exiting => {}
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        if self.grid.is_editing() {
            let result = self.grid.handle_input(key);
            self.apply_grid_result(result);
            return;
        }

        let count = self.resources.len();
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => self.quit(),
            (KeyCode::Char('?'), _) => {
                self.help.reset_scroll();
                self.state = AppState::Help;
            }
            (KeyCode::Char('/'), _) => {
                self.search.activate();
                self.state = AppState::Searching;
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => self.request_page(),
            (KeyCode::Tab, _) => self.open_screen((self.active + 1) % count),
            (KeyCode::BackTab, _) => self.open_screen((self.active + count - 1) % count),
            (KeyCode::Char(c), KeyModifiers::NONE) if matches!(c, '1'..='9') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                self.open_screen(index);
            }
            (KeyCode::Char('c'), KeyModifiers::NONE) if self.screen.has_calendar() => {
                self.open_calendar()
            }
            (KeyCode::Char('n'), KeyModifiers::NONE)
                if matches!(
                    self.screen.resource(),
                    Resource::Spaces | Resource::Reservations
                ) =>
            {
                self.open_booking()
            }
            (KeyCode::Char('d'), KeyModifiers::NONE) => self.confirm_delete(),
            (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Enter, _)
                if !self.screen.is_editable() =>
            {
                self.notifications.info("Somente leitura para o seu perfil");
            }
            _ => {
                let result = self.grid.handle_input(key);
                self.apply_grid_result(result);
            }
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match self.search.handle_input(key) {
            Some(SearchAction::Apply(term)) => {
                info!(resource = %self.screen.resource(), term = %term, "Searching");
                self.page = 1;
                self.request_page();
            }
            Some(SearchAction::Clear) => {
                info!(resource = %self.screen.resource(), "Search cleared");
                self.page = 1;
                self.request_page();
            }
            None => {}
        }
        if !self.search.is_active() {
            self.state = AppState::Browsing;
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        let Some(session) = self.calendar.as_mut() else {
            self.state = AppState::Browsing;
            return;
        };
        match session.calendar.handle_input(key) {
            Some(CalendarAction::Select(date)) => {
                let purpose = session.purpose;
                let space_id = session.space_id.clone();
                debug!(%date, ?purpose, "Reservation date chosen");
                self.close_calendar();
                let value = Value::String(date.format("%Y-%m-%d").to_string());
                match (purpose, space_id) {
                    (CalendarPurpose::Book, Some(space_id)) => self.book(space_id, value),
                    _ => {
                        let result = self.grid.change_field(RESERVATION_DATE_KEY, value);
                        self.apply_grid_result(result);
                    }
                }
            }
            Some(CalendarAction::MonthChanged(month)) => {
                if let Some(space_id) = session.space_id.clone() {
                    self.requests.push(Request::FetchAvailability { space_id, month });
                }
            }
            Some(CalendarAction::Close) => self.close_calendar(),
            None => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match self.confirm.handle_input(key) {
            Some(ConfirmAction::Confirm) => {
                if let Some((resource, id)) = self.pending_delete.take() {
                    info!(%resource, %id, "Deleting row");
                    self.loading.start_with_message("Excluindo...");
                    self.requests.push(Request::DeleteRow { resource, id });
                }
                self.state = AppState::Browsing;
            }
            Some(ConfirmAction::Cancel) => {
                debug!("Delete cancelled");
                self.pending_delete = None;
                self.state = AppState::Browsing;
            }
            None => {}
        }
    }

    /// Ask before deleting the highlighted record.
    fn confirm_delete(&mut self) {
        let resource = self.screen.resource();
        if !self.screen.is_editable() {
            self.notifications.info("Somente leitura para o seu perfil");
            return;
        }
        let Some(id) = self.grid.selected_row().and_then(Row::id) else {
            return;
        };
        if resource.delete_path(&id).is_none() {
            self.notifications
                .info(format!("{} não podem ser excluídos", resource.title()));
            return;
        }

        let question = if resource == Resource::Reservations {
            "Deseja cancelar esta reserva?".to_string()
        } else {
            format!("Excluir o registro {} de {}?", id, resource.title())
        };
        self.confirm.show(question);
        self.pending_delete = Some((resource, id));
        self.state = AppState::Confirm;
    }

    /// Space a new reservation would be made for: the highlighted space, or
    /// the space of the highlighted reservation.
    fn booking_space(&self) -> Option<RowId> {
        let row = self.grid.selected_row()?;
        match self.screen.resource() {
            Resource::Spaces => row.id(),
            Resource::Reservations => row.get(RESERVATION_SPACE_KEY).and_then(RowId::from_value),
            _ => None,
        }
    }

    /// Open the calendar to book a new reservation.
    fn open_booking(&mut self) {
        if !self.profile.role.can_edit(Resource::Reservations) {
            self.notifications.info("Somente leitura para o seu perfil");
            return;
        }
        match self.booking_space() {
            Some(space_id) => self.show_calendar(Some(space_id), None, CalendarPurpose::Book),
            None => self.notifications.info("Selecione um espaço para reservar"),
        }
    }

    fn book(&mut self, space_id: RowId, date: Value) {
        let mut payload = Row::new();
        payload.set(RESERVATION_SPACE_KEY, space_id.to_value());
        payload.set(RESERVATION_DATE_KEY, date);
        info!(space = %space_id, "Booking space");
        self.loading.start_with_message("Reservando...");
        self.requests.push(Request::CreateRow {
            resource: Resource::Reservations,
            payload,
        });
    }

    /// Open the reservation calendar for the row in edit mode, starting an
    /// edit on the highlighted row first if needed.
    fn open_calendar(&mut self) {
        if !self.grid.is_editing() {
            let result = self.grid.start_edit_selected();
            self.apply_grid_result(result);
            if !self.grid.is_editing() {
                return;
            }
        }

        let data = self.grid.edit_buffer();
        let space_id = data.get(RESERVATION_SPACE_KEY).and_then(RowId::from_value);
        let current = data
            .get(RESERVATION_DATE_KEY)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

        self.show_calendar(space_id, current, CalendarPurpose::Reschedule);
    }

    fn show_calendar(
        &mut self,
        space_id: Option<RowId>,
        selected: Option<NaiveDate>,
        purpose: CalendarPurpose,
    ) {
        let mut calendar = ReservationCalendar::new(Local::now().date_naive());
        if let Some(date) = selected {
            calendar = calendar.with_selected(date);
        }
        match &space_id {
            Some(space_id) => self.requests.push(Request::FetchAvailability {
                space_id: space_id.clone(),
                month: calendar.view_month(),
            }),
            None => warn!("Reservation has no space; availability unknown"),
        }

        self.calendar = Some(CalendarSession {
            calendar,
            space_id,
            purpose,
        });
        self.state = AppState::Calendar;
    }

    fn close_calendar(&mut self) {
        self.calendar = None;
        self.state = AppState::Browsing;
    }

    fn open_screen(&mut self, index: usize) {
        let Some(&resource) = self.resources.get(index) else {
            return;
        };
        if index == self.active {
            return;
        }
        info!(%resource, "Opening screen");
        self.active = index;
        self.screen = Screen::new(resource, self.profile.role);
        self.grid = build_grid(&self.screen, &self.layout);
        self.search.reset();
        self.close_calendar();
        self.page = 1;
        self.request_page();
    }

    fn request_page(&mut self) {
        self.grid.set_loading(true);
        self.loading.start_with_message("Carregando...");
        self.requests.push(Request::FetchPage {
            resource: self.screen.resource(),
            page: self.page,
            search: self.search.applied().to_string(),
        });
    }

    fn apply_grid_result(&mut self, result: Result<Vec<GridEvent>, GridError>) {
        match result {
            Ok(events) => self.apply_grid_events(events),
            Err(err) => self.handle_error(&AppError::Grid(err)),
        }
    }

    fn apply_grid_events(&mut self, events: Vec<GridEvent>) {
        for event in events {
            match event {
                GridEvent::Save { row_id, data } => {
                    let payload = self.screen.payload(&data);
                    info!(
                        resource = %self.screen.resource(),
                        id = %row_id,
                        fields = payload.len(),
                        "Saving row"
                    );
                    self.loading.start_with_message("Salvando...");
                    self.requests.push(Request::SaveRow {
                        resource: self.screen.resource(),
                        id: row_id,
                        payload,
                    });
                }
                GridEvent::PageChange(page) => {
                    debug!(page, "Changing page");
                    self.page = page;
                    self.request_page();
                }
                GridEvent::Cancelled => debug!("Edit cancelled"),
                other => trace!(event = ?other, "Grid event"),
            }
        }
    }

    /// Apply the result of a background task.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::PageFetched {
                resource,
                page,
                search,
                result,
            } => self.on_page_fetched(resource, page, &search, result),
            ApiMessage::RowSaved {
                resource,
                id,
                payload,
                result,
            } => self.on_row_saved(resource, id, payload, result),
            ApiMessage::RowCreated {
                resource,
                payload,
                result,
            } => self.on_row_created(resource, &payload, result),
            ApiMessage::RowDeleted {
                resource,
                id,
                result,
            } => self.on_row_deleted(resource, id, result),
            ApiMessage::AvailabilityFetched {
                space_id,
                month,
                result,
            } => self.on_availability(space_id, month, result),
        }
    }

    fn on_page_fetched(
        &mut self,
        resource: Resource,
        page: u32,
        search: &str,
        result: Result<Page, ApiError>,
    ) {
        if resource != self.screen.resource() || page != self.page || search != self.search.applied()
        {
            debug!(%resource, page, "Discarding stale page");
            return;
        }

        self.grid.set_loading(false);
        self.loading.stop();
        match result {
            Ok(fetched) if fetched.rows.is_empty() && page > 1 && fetched.total_pages < page => {
                // The listing shrank under us, e.g. after a delete
                debug!(%resource, page, total_pages = fetched.total_pages, "Page gone");
                self.page = fetched.total_pages.max(1);
                self.request_page();
            }
            Ok(fetched) => {
                debug!(%resource, page, rows = fetched.rows.len(), "Page loaded");
                let events = self.grid.set_data(fetched.rows);
                self.grid.set_pagination(page, fetched.total_pages);
                self.apply_grid_events(events);
            }
            Err(err) => self.handle_error(&AppError::Api(err)),
        }
    }

    fn on_row_saved(
        &mut self,
        resource: Resource,
        id: RowId,
        payload: Row,
        result: Result<(), ApiError>,
    ) {
        self.loading.stop();
        match result {
            Ok(()) => {
                info!(%resource, %id, "Row saved");
                self.notifications.success("Registro atualizado com sucesso");
                if resource == self.screen.resource() {
                    self.request_page();
                }
            }
            Err(err) => {
                self.handle_error(&AppError::Api(err));
                if resource != self.screen.resource() {
                    return;
                }
                // Give the user the rejected values back to fix them
                match self.grid.resume_edit(&id, &payload) {
                    Ok(events) => self.apply_grid_events(events),
                    Err(err) => warn!(%id, error = %err, "Could not resume the failed edit"),
                }
            }
        }
    }

    fn on_row_created(
        &mut self,
        resource: Resource,
        payload: &Row,
        result: Result<Value, ApiError>,
    ) {
        self.loading.stop();
        match result {
            Ok(created) => {
                let id = created.get("id").and_then(RowId::from_value);
                info!(%resource, ?id, fields = payload.len(), "Row created");
                self.notifications.success(if resource == Resource::Reservations {
                    "Reserva solicitada com sucesso"
                } else {
                    "Registro criado com sucesso"
                });
                if resource == self.screen.resource() {
                    self.request_page();
                }
            }
            Err(err) => self.handle_error(&AppError::Api(err)),
        }
    }

    fn on_row_deleted(&mut self, resource: Resource, id: RowId, result: Result<(), ApiError>) {
        self.loading.stop();
        match result {
            Ok(()) => {
                info!(%resource, %id, "Row deleted");
                self.notifications.success("Registro excluído com sucesso");
                if resource == self.screen.resource() {
                    self.request_page();
                }
            }
            Err(err) => self.handle_error(&AppError::Api(err)),
        }
    }

    fn on_availability(
        &mut self,
        space_id: RowId,
        month: NaiveDate,
        result: Result<Vec<String>, ApiError>,
    ) {
        let current = self.calendar.as_ref().is_some_and(|session| {
            session.calendar.view_month() == month && session.space_id.as_ref() == Some(&space_id)
        });
        if !current {
            debug!(%space_id, %month, "Discarding stale availability");
            return;
        }

        match result {
            Ok(dates) => {
                if let Some(session) = self.calendar.as_mut() {
                    session.calendar.set_occupied(dates);
                }
            }
            Err(err) => {
                warn!(%space_id, error = %err, "Availability fetch failed");
                self.notifications.warning(format!(
                    "Não foi possível carregar a disponibilidade: {}",
                    AppError::Api(err).user_message()
                ));
            }
        }
    }

    /// Show an error to the user: critical ones in the dialog, the rest as
    /// a toast.
    pub fn handle_error(&mut self, error: &AppError) {
        warn!(error = %error, "Application error");
        if error.is_critical() {
            self.error_dialog.show(error);
        } else {
            self.notifications.error(error.user_message());
        }
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    fn key_context(&self) -> KeyContext {
        match self.state {
            AppState::Help => KeyContext::Help,
            AppState::Searching => KeyContext::Search,
            AppState::Calendar => KeyContext::Calendar,
            AppState::Confirm => KeyContext::Confirm,
            AppState::Browsing | AppState::Exiting if self.grid.is_editing() => {
                KeyContext::Editing
            }
            AppState::Browsing | AppState::Exiting => KeyContext::Grid,
        }
    }

    /// Render the application.
    ///
    /// This is the View part of The Elm Architecture (TEA).
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header, search, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let who = format!(" {} ({}) ", self.profile.display_name(), self.profile.role);
        let who_width = u16::try_from(who.chars().count()).unwrap_or(u16::MAX);
        let [tabs_area, who_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(who_width)]).areas(header);

        let titles: Vec<Line> = self
            .resources
            .iter()
            .enumerate()
            .map(|(i, resource)| Line::raw(format!("{} {}", i + 1, resource.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.active)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .divider("|");
        frame.render_widget(tabs, tabs_area);
        frame.render_widget(
            Paragraph::new(Span::styled(who, Style::default().fg(Color::Yellow))),
            who_area,
        );

        self.search.render(frame, search);
        self.grid.render(frame, body);

        let [hints, spinner] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(20)]).areas(footer);
        render_context_help(frame, hints, self.key_context());
        self.loading.render(frame, spinner);

        match self.state {
            AppState::Calendar => {
                if let Some(session) = &self.calendar {
                    session.calendar.render(frame, body);
                }
            }
            AppState::Help => self.help.render(frame, body),
            _ => {}
        }

        self.confirm.render(frame, area);
        self.notifications.render(frame, area);
        self.error_dialog.render(frame, area);
    }
}

fn build_grid(screen: &Screen, layout: &ResponsiveSwitch) -> DataGrid {
    let mut grid = DataGrid::new(screen.columns())
        .with_title(format!(" {} ", screen.resource().title()))
        .with_style(screen.style());
    if let Some(key) = screen.title_column() {
        grid = grid.with_title_column(key);
    }
    grid.set_layout(layout.mode());
    grid
}
