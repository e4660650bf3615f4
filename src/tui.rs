// src/tui.rs
use crate::app::AppState;
use crate::config::Config;
use crate::error::{AppResult, TuiError};
use crate::forms::{self, NewClientForm, QUICK_ADJUSTMENTS};
use crate::models::{Client, ClientPatch, ClientStatus};
use crate::search::{self, StatusSummary};
use crate::templates::MessageTemplate;

use arboard; // For clipboard
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::collections::HashSet;
use std::io::{stdout, Stdout};
use std::time::Duration;
use log;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    username: String,
    password: String,
    field: usize,
}

impl LoginForm {
    const FIELDS: usize = 2;

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.username,
            _ => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    current: String,
    new: String,
    confirm: String,
    field: usize,
}

impl PasswordForm {
    const FIELDS: usize = 3;

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.current,
            1 => &mut self.new,
            _ => &mut self.confirm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Days,
    Notes,
    Message,
}

impl DetailField {
    fn next(self) -> Self {
        match self {
            DetailField::Days => DetailField::Notes,
            DetailField::Notes => DetailField::Message,
            DetailField::Message => DetailField::Days,
        }
    }

    fn prev(self) -> Self {
        match self {
            DetailField::Days => DetailField::Message,
            DetailField::Notes => DetailField::Days,
            DetailField::Message => DetailField::Notes,
        }
    }
}

/// Editable copies of one client's fields; the store is only touched on save.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailForm {
    client_id: String,
    days: String,
    notes: String,
    message: String,
    field: DetailField,
}

impl DetailForm {
    fn for_client(client: &Client) -> Self {
        DetailForm {
            client_id: client.id.clone(),
            days: client.subscription_days.to_string(),
            notes: client.notes.clone(),
            message: String::new(),
            field: DetailField::Days,
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            DetailField::Days => &mut self.days,
            DetailField::Notes => &mut self.notes,
            DetailField::Message => &mut self.message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddClientForm {
    form: NewClientForm,
    field: usize,
}

impl AddClientForm {
    const FIELDS: usize = 5;
    const DAYS_FIELD: usize = 3;

    fn field_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.form.name,
            1 => &mut self.form.email,
            2 => &mut self.form.phone,
            3 => &mut self.form.subscription_days,
            _ => &mut self.form.notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Login(LoginForm),
    ChangePassword(PasswordForm),
    Dashboard,
    Detail(DetailForm),
    AddClient(AddClientForm),
    Profile,
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Logout,
    HideClient { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
enum PopupKind {
    Notice,
    Confirm(Action),
}

/// Blocking prompt drawn over the current screen; it swallows keys until dismissed.
#[derive(Debug, Clone, PartialEq)]
struct Popup {
    title: String,
    body: String,
    kind: PopupKind,
}

pub struct App {
    state: AppState,
    screen: Screen,
    popup: Option<Popup>,
    should_quit: bool,
    app_status: String,
    search_query: String,
    searching: bool,
    // Remove-from-view only; the directory keeps the client.
    hidden_ids: HashSet<String>,
    list_state: ListState,
}

impl App {
    pub fn new(state: AppState) -> Self {
        let mut app = App {
            state,
            screen: Screen::Login(LoginForm::default()),
            popup: None,
            should_quit: false,
            app_status: "Sign in to manage WiFi subscriptions.".to_string(),
            search_query: String::new(),
            searching: false,
            hidden_ids: HashSet::new(),
            list_state: ListState::default(),
        };
        app.enforce_gate();
        app.clamp_selection();
        app
    }

    pub fn on_key(&mut self, key_event: KeyEvent) {
        if !matches!(key_event.code, KeyCode::Char(_)) {
            // Typed characters are not logged; they may be passwords.
            log::debug!("Key event received: {:?}", key_event.code);
        }
        if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Some(popup) = self.popup.take() {
            self.handle_popup_key(popup, key_event);
        } else {
            let screen = std::mem::replace(&mut self.screen, Screen::Dashboard);
            self.screen = match screen {
                Screen::Login(form) => self.handle_login_key(form, key_event),
                Screen::ChangePassword(form) => self.handle_password_key(form, key_event),
                Screen::Dashboard => self.handle_dashboard_key(key_event),
                Screen::Detail(form) => self.handle_detail_key(form, key_event),
                Screen::AddClient(form) => self.handle_add_client_key(form, key_event),
                Screen::Profile => self.handle_profile_key(key_event),
            };
        }
        self.enforce_gate();
    }

    /// Keeps navigation consistent with the session: no client screens while
    /// logged out, nothing but the password screen while a first-login change is due.
    fn enforce_gate(&mut self) {
        if self.state.is_ready() {
            if matches!(self.screen, Screen::Login(_)) {
                self.screen = Screen::Dashboard;
            }
        } else if !self.state.session.is_authenticated() {
            if !matches!(self.screen, Screen::Login(_)) {
                log::info!("Session not authenticated, showing login screen.");
                self.screen = Screen::Login(LoginForm::default());
            }
        } else if !matches!(self.screen, Screen::ChangePassword(_)) {
            self.screen = Screen::ChangePassword(PasswordForm::default());
        }
    }

    fn show_notice(&mut self, title: &str, body: impl Into<String>) {
        self.popup = Some(Popup { title: title.to_string(), body: body.into(), kind: PopupKind::Notice });
    }

    fn show_confirm(&mut self, title: &str, body: impl Into<String>, action: Action) {
        self.popup = Some(Popup { title: title.to_string(), body: body.into(), kind: PopupKind::Confirm(action) });
    }

    fn handle_popup_key(&mut self, popup: Popup, key_event: KeyEvent) {
        match (popup.kind.clone(), key_event.code) {
            (PopupKind::Notice, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) => {}
            (PopupKind::Confirm(action), KeyCode::Enter | KeyCode::Char('y')) => self.perform(action),
            (PopupKind::Confirm(_), KeyCode::Esc | KeyCode::Char('n')) => {
                self.app_status = "Cancelled.".to_string();
            }
            _ => self.popup = Some(popup),
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Logout => {
                self.state.session.logout();
                self.search_query.clear();
                self.searching = false;
                self.hidden_ids.clear();
                self.list_state.select(None);
                self.app_status = "Logged out.".to_string();
            }
            Action::HideClient { id, name } => {
                log::info!("Removing client {} from view", id);
                self.hidden_ids.insert(id);
                self.clamp_selection();
                self.show_notice("Success", format!("{} has been removed", name));
            }
        }
    }

    fn handle_login_key(&mut self, mut form: LoginForm, key_event: KeyEvent) -> Screen {
        match key_event.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => form.field = (form.field + 1) % LoginForm::FIELDS,
            KeyCode::BackTab | KeyCode::Up => {
                form.field = (form.field + LoginForm::FIELDS - 1) % LoginForm::FIELDS
            }
            KeyCode::Enter if form.field + 1 < LoginForm::FIELDS => form.field += 1,
            KeyCode::Enter => return self.submit_login(form),
            KeyCode::Backspace => {
                form.field_mut().pop();
            }
            KeyCode::Char(c) => form.field_mut().push(c),
            _ => {}
        }
        Screen::Login(form)
    }

    fn submit_login(&mut self, mut form: LoginForm) -> Screen {
        if let Err(e) = forms::validate_login(&form.username, &form.password) {
            self.show_notice("Error", e.to_string());
            return Screen::Login(form);
        }

        let outcome = self.state.session.login(&form.username, &form.password);
        if !outcome.success {
            form.password.clear();
            form.field = 1;
            self.show_notice("Login Failed", "Invalid username or password.");
            return Screen::Login(form);
        }

        if outcome.requires_password_change {
            self.app_status = "You must change your password before continuing.".to_string();
            Screen::ChangePassword(PasswordForm::default())
        } else {
            self.app_status = format!("Signed in as {}.", self.state.session.username());
            self.clamp_selection();
            Screen::Dashboard
        }
    }

    fn handle_password_key(&mut self, mut form: PasswordForm, key_event: KeyEvent) -> Screen {
        match key_event.code {
            KeyCode::Esc if self.state.session.is_first_login() => {
                self.app_status = "You must change your password before continuing.".to_string();
            }
            KeyCode::Esc => return Screen::Profile,
            KeyCode::Tab | KeyCode::Down => form.field = (form.field + 1) % PasswordForm::FIELDS,
            KeyCode::BackTab | KeyCode::Up => {
                form.field = (form.field + PasswordForm::FIELDS - 1) % PasswordForm::FIELDS
            }
            KeyCode::Enter if form.field + 1 < PasswordForm::FIELDS => form.field += 1,
            KeyCode::Enter => return self.submit_password_change(form),
            KeyCode::Backspace => {
                form.field_mut().pop();
            }
            KeyCode::Char(c) => form.field_mut().push(c),
            _ => {}
        }
        Screen::ChangePassword(form)
    }

    fn submit_password_change(&mut self, mut form: PasswordForm) -> Screen {
        if let Err(e) = forms::validate_password_change(&form.current, &form.new, &form.confirm) {
            self.show_notice("Error", e.to_string());
            return Screen::ChangePassword(form);
        }

        if !self.state.session.change_password(&form.current, &form.new) {
            if self.state.session.verify_current_password(&form.current) {
                log::error!("Password change failed after the current password was accepted");
                self.show_notice("Error", "Could not update the password. Please try again.");
            } else {
                form.current.clear();
                form.field = 0;
                self.show_notice("Error", "Current password is incorrect");
            }
            return Screen::ChangePassword(form);
        }

        self.show_notice("Success", "Password changed successfully");
        self.app_status = "Password updated.".to_string();
        self.clamp_selection();
        Screen::Dashboard
    }

    fn visible_clients(&self) -> Vec<&Client> {
        let unhidden = self
            .state
            .directory
            .clients()
            .iter()
            .filter(|client| !self.hidden_ids.contains(&client.id));
        search::filter_clients(unhidden, &self.search_query, None)
    }

    fn selected_client(&self) -> Option<&Client> {
        let index = self.list_state.selected()?;
        self.visible_clients().get(index).copied()
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_clients().len();
        if count == 0 {
            self.list_state.select(None);
        } else {
            let current = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(current.min(count - 1)));
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let count = self.visible_clients().len();
        if count == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as i32;
        let new_index = (current + delta).clamp(0, count as i32 - 1);
        self.list_state.select(Some(new_index as usize));
    }

    fn handle_dashboard_key(&mut self, key_event: KeyEvent) -> Screen {
        if self.searching {
            match key_event.code {
                KeyCode::Enter | KeyCode::Down => self.searching = false,
                KeyCode::Esc => {
                    self.searching = false;
                    self.search_query.clear();
                }
                KeyCode::Backspace => {
                    self.search_query.pop();
                }
                KeyCode::Char(c) => self.search_query.push(c),
                _ => {}
            }
            self.clamp_selection();
            return Screen::Dashboard;
        }

        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('/') => {
                self.searching = true;
                self.app_status = "Searching by name, email or phone.".to_string();
            }
            KeyCode::Char('a') => return Screen::AddClient(AddClientForm::default()),
            KeyCode::Char('p') => return Screen::Profile,
            KeyCode::Char('L') => self.perform(Action::Logout),
            KeyCode::Char('d') => match self.selected_client().map(|c| (c.id.clone(), c.name.clone())) {
                Some((id, name)) => self.show_confirm(
                    "Remove Client",
                    format!("Are you sure you want to remove {}?", name),
                    Action::HideClient { id, name },
                ),
                None => self.app_status = "No client selected to remove.".to_string(),
            },
            KeyCode::Enter => match self.selected_client().map(DetailForm::for_client) {
                Some(form) => return Screen::Detail(form),
                None => self.app_status = "No client selected.".to_string(),
            },
            _ => {}
        }
        Screen::Dashboard
    }

    fn handle_detail_key(&mut self, mut form: DetailForm, key_event: KeyEvent) -> Screen {
        let Some(client) = self.state.directory.get_by_id(&form.client_id).cloned() else {
            return match key_event.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Screen::Dashboard,
                _ => Screen::Detail(form),
            };
        };

        match key_event.code {
            KeyCode::Esc => return Screen::Dashboard,
            KeyCode::Tab => form.field = form.field.next(),
            KeyCode::BackTab => form.field = form.field.prev(),
            KeyCode::F(n @ 1..=4) => {
                let offset = QUICK_ADJUSTMENTS[usize::from(n - 1)];
                match forms::quick_adjust(client.subscription_days, offset) {
                    Ok(days) => form.days = days.to_string(),
                    Err(e) => self.show_notice("Error", e.to_string()),
                }
            }
            KeyCode::F(n @ 5..=7) => {
                let template = MessageTemplate::ALL[usize::from(n - 5)];
                form.message = template.render(&client.name, &form.days);
                form.field = DetailField::Message;
            }
            KeyCode::F(9) => self.copy_to_clipboard(client.email.clone(), "Email"),
            KeyCode::F(10) => self.copy_to_clipboard(client.phone.clone(), "Phone"),
            KeyCode::Enter if form.field == DetailField::Message => return self.send_message(form, &client),
            KeyCode::Enter => return self.save_subscription(form, &client),
            KeyCode::Backspace => {
                form.field_mut().pop();
            }
            KeyCode::Char(c) if form.field != DetailField::Days || c.is_ascii_digit() => {
                form.field_mut().push(c)
            }
            _ => {}
        }
        Screen::Detail(form)
    }

    fn save_subscription(&mut self, form: DetailForm, client: &Client) -> Screen {
        let days = match forms::parse_subscription_days(&form.days) {
            Ok(days) => days,
            Err(e) => {
                self.show_notice("Invalid Input", e.to_string());
                return Screen::Detail(form);
            }
        };

        let patch = ClientPatch { notes: Some(form.notes), ..ClientPatch::days(days) };
        self.state.directory.update(&client.id, patch);
        self.app_status = format!("Updated {}.", client.name);
        self.show_notice("Success", format!("Subscription updated to {} days", days));
        Screen::Dashboard
    }

    fn send_message(&mut self, form: DetailForm, client: &Client) -> Screen {
        if let Err(e) = forms::validate_message(&form.message) {
            self.show_notice("Error", e.to_string());
            return Screen::Detail(form);
        }

        self.state.directory.send_update_message(&client.id, &form.message);
        self.app_status = format!("Message recorded for {}.", client.name);
        self.show_notice("Message Sent", format!("Update message sent to {}", client.name));
        Screen::Dashboard
    }

    fn handle_add_client_key(&mut self, mut form: AddClientForm, key_event: KeyEvent) -> Screen {
        match key_event.code {
            KeyCode::Esc => {
                self.app_status = "Add client cancelled.".to_string();
                return Screen::Dashboard;
            }
            KeyCode::Tab | KeyCode::Down => form.field = (form.field + 1) % AddClientForm::FIELDS,
            KeyCode::BackTab | KeyCode::Up => {
                form.field = (form.field + AddClientForm::FIELDS - 1) % AddClientForm::FIELDS
            }
            KeyCode::Enter if form.field + 1 < AddClientForm::FIELDS => form.field += 1,
            KeyCode::Enter => return self.submit_new_client(form),
            KeyCode::Backspace => {
                form.field_mut().pop();
            }
            KeyCode::Char(c) if form.field != AddClientForm::DAYS_FIELD || c.is_ascii_digit() => {
                form.field_mut().push(c)
            }
            _ => {}
        }
        Screen::AddClient(form)
    }

    fn submit_new_client(&mut self, form: AddClientForm) -> Screen {
        match form.form.validate() {
            Ok(fields) => {
                let name = fields.name.clone();
                self.state.directory.add_client(fields);
                self.clamp_selection();
                self.show_notice("Success", format!("{} has been added successfully", name));
                Screen::Dashboard
            }
            Err(e) => {
                self.show_notice("Error", e.to_string());
                Screen::AddClient(form)
            }
        }
    }

    fn handle_profile_key(&mut self, key_event: KeyEvent) -> Screen {
        match key_event.code {
            KeyCode::Char('c') => return Screen::ChangePassword(PasswordForm::default()),
            KeyCode::Char('l') => {
                self.show_confirm("Logout", "Are you sure you want to logout?", Action::Logout)
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('b') => return Screen::Dashboard,
            _ => {}
        }
        Screen::Profile
    }

    fn copy_to_clipboard(&mut self, content: String, field_name: &str) {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => match clipboard.set_text(content) {
                Ok(_) => {
                    self.app_status = format!("{} copied to clipboard!", field_name);
                    log::info!("Copied {} to clipboard.", field_name);
                }
                Err(err) => {
                    self.app_status = format!("Error copying {}: {}", field_name, err);
                    log::error!("Error setting clipboard text for {}: {}", field_name, err);
                }
            },
            Err(err) => {
                self.app_status = format!("Error initializing clipboard: {}", err);
                log::error!("Error initializing clipboard: {}", err);
            }
        }
    }
}

pub fn run_tui(config: &Config) -> AppResult<()> {
    log::info!("Initializing TUI...");
    let state = AppState::from_config(config)?;

    enable_raw_mode().map_err(|e| { log::error!("Failed to enable raw mode: {}", e); TuiError::Io(e) })?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| { log::error!("Failed to setup terminal screen: {}", e); TuiError::Io(e) })?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| { log::error!("Failed to create terminal: {}", e); TuiError::Io(e) })?;

    let mut app = App::new(state);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    log::info!("Starting TUI application loop.");
    let res = run_app_loop(&mut terminal, &mut app, tick_rate);
    log::info!("TUI application loop finished.");

    disable_raw_mode().map_err(|e| { log::error!("Failed to disable raw mode: {}", e); TuiError::Io(e) })?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)
        .map_err(|e| { log::error!("Failed to restore terminal screen: {}", e); TuiError::Io(e) })?;

    res?;
    log::info!("TUI shutdown complete.");
    Ok(())
}

fn run_app_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<(), TuiError> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app)).map_err(|e| { log::error!("Terminal draw error: {}", e); TuiError::Io(e) })?;

        if event::poll(tick_rate).map_err(|e| { log::error!("Event poll error: {}", e); TuiError::Io(e) })? {
            if let Event::Key(key_event) = event::read().map_err(|e| { log::error!("Event read error: {}", e); TuiError::Io(e) })? {
                if key_event.kind == KeyEventKind::Press {
                    app.on_key(key_event);
                }
            }
        }
    }
    Ok(())
}

fn status_color(status: ClientStatus) -> Color {
    match status {
        ClientStatus::Active => Color::Green,
        ClientStatus::Expiring => Color::Yellow,
        ClientStatus::Expired => Color::Red,
    }
}

fn input_field<'a>(label: &'a str, value: &str, masked: bool, focused: bool) -> Paragraph<'a> {
    let mut shown = if masked { "•".repeat(value.chars().count()) } else { value.to_string() };
    if focused {
        shown.push('▋');
    }
    Paragraph::new(shown)
        .block(Block::default().borders(Borders::ALL).title(label))
        .style(if focused { Style::default().fg(Color::Yellow) } else { Style::default() })
}

fn key_hints(app: &App) -> String {
    if app.popup.is_some() {
        return String::new();
    }
    match &app.screen {
        Screen::Login(_) => "(Tab) Next field | (Enter) Sign in | (Esc) Quit".to_string(),
        Screen::ChangePassword(_) if app.state.session.is_first_login() => {
            "(Tab) Next | (Enter) Next/Save".to_string()
        }
        Screen::ChangePassword(_) => "(Tab) Next | (Enter) Next/Save | (Esc) Cancel".to_string(),
        Screen::Dashboard if app.searching => "Type to search | (Enter) Done | (Esc) Clear".to_string(),
        Screen::Dashboard => {
            "(q) Quit | (j/k) Nav | (Enter) Open | (/) Search | (a) Add | (d) Remove | (p) Profile | (L) Logout"
                .to_string()
        }
        Screen::Detail(_) => {
            "(Tab) Field | (Enter) Save/Send | (F1-F4) Quick days | (F5-F7) Templates | (F9/F10) Copy email/phone | (Esc) Back"
                .to_string()
        }
        Screen::AddClient(_) => "(Tab) Next | (Enter) Next/Add | (Esc) Cancel".to_string(),
        Screen::Profile => "(c) Change password | (l) Logout | (Esc) Back | (q) Quit".to_string(),
    }
}

/// Renders the current screen, the status bar and any popup on top.
fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.size());

    match &app.screen {
        Screen::Login(form) => draw_login(f, chunks[0], form),
        Screen::ChangePassword(form) => draw_change_password(f, chunks[0], form, app.state.session.is_first_login()),
        Screen::Dashboard => draw_dashboard(f, chunks[0], app),
        Screen::Detail(form) => draw_detail(f, chunks[0], app, form),
        Screen::AddClient(form) => draw_add_client(f, chunks[0], form),
        Screen::Profile => draw_profile(f, chunks[0], app),
    }

    let hints = key_hints(app);
    let status_text = if hints.is_empty() { app.app_status.clone() } else { format!("{} | {}", app.app_status, hints) };
    let status_paragraph = Paragraph::new(status_text).block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_paragraph, chunks[1]);

    if let Some(popup) = &app.popup {
        draw_popup(f, popup);
    }
}

fn draw_login(f: &mut Frame, area: Rect, form: &LoginForm) {
    let form_area = centered_rect(50, 50, area);
    f.render_widget(Clear, form_area);
    f.render_widget(Block::default().borders(Borders::ALL).title("WiFi Admin Login"), form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(2), Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(form_area);

    let heading = Paragraph::new("Manage your WiFi subscription clients").alignment(Alignment::Center);
    f.render_widget(heading, rows[0]);
    f.render_widget(input_field("Username", &form.username, false, form.field == 0), rows[1]);
    f.render_widget(input_field("Password", &form.password, true, form.field == 1), rows[2]);
}

fn draw_change_password(f: &mut Frame, area: Rect, form: &PasswordForm, first_login: bool) {
    let form_area = centered_rect(60, 70, area);
    f.render_widget(Clear, form_area);
    f.render_widget(Block::default().borders(Borders::ALL).title("Change Password"), form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(form_area);

    let banner = if first_login {
        Paragraph::new(vec![
            Line::from(Span::styled(
                "You must change your password before continuing",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from("Please set a new secure password"),
        ])
    } else {
        Paragraph::new("Update your password")
    };
    f.render_widget(banner.alignment(Alignment::Center), rows[0]);
    f.render_widget(input_field("Current Password", &form.current, true, form.field == 0), rows[1]);
    f.render_widget(input_field("New Password", &form.new, true, form.field == 1), rows[2]);
    f.render_widget(input_field("Confirm New Password", &form.confirm, true, form.field == 2), rows[3]);
    let hint = format!("Minimum {} characters", forms::MIN_PASSWORD_LEN);
    f.render_widget(Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)), rows[4]);
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let welcome = Paragraph::new(Line::from(vec![
        Span::raw("Welcome back, "),
        Span::styled(app.state.session.admin_name().to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("WiFi Subscriptions"));
    f.render_widget(welcome, rows[0]);

    let visible = app.visible_clients();
    let summary = StatusSummary::tally(visible.iter().copied());
    let stats = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} Active ", summary.active), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled(format!(" {} Expiring ", summary.expiring), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(format!(" {} Expired ", summary.expired), Style::default().fg(Color::Red)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(stats, rows[1]);

    let query = if app.search_query.is_empty() && !app.searching {
        "Press / to search clients...".to_string()
    } else {
        app.search_query.clone()
    };
    f.render_widget(input_field("Search", &query, false, app.searching), rows[2]);

    let list_block = Block::default().borders(Borders::ALL).title(format!("Clients ({})", visible.len()));
    if visible.is_empty() {
        let empty = Paragraph::new("No clients found")
            .block(list_block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(empty, rows[3]);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|client| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<9}", client.status.label()), Style::default().fg(status_color(client.status))),
                Span::raw(format!(" {}  {}  {}  ", client.name, client.email, client.phone)),
                Span::styled(format!("{} days", client.subscription_days), Style::default().add_modifier(Modifier::BOLD)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(list_block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::Gray))
        .highlight_symbol("> ");
    let mut list_state = app.list_state.clone();
    f.render_stateful_widget(list, rows[3], &mut list_state);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App, form: &DetailForm) {
    let Some(client) = app.state.directory.get_by_id(&form.client_id) else {
        let missing = Paragraph::new("Client not found")
            .block(Block::default().borders(Borders::ALL).title("Client"))
            .alignment(Alignment::Center);
        f.render_widget(missing, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let info = vec![
        Line::from(vec![
            Span::styled(format!("[{}] ", client.initials()), bold),
            Span::styled(client.name.clone(), bold),
        ]),
        Line::from(Span::styled(
            client.status.as_str().to_uppercase(),
            Style::default().fg(status_color(client.status)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("Email: ", bold), Span::raw(client.email.clone())]),
        Line::from(vec![Span::styled("Phone: ", bold), Span::raw(client.phone.clone())]),
        Line::from(vec![
            Span::styled("Expires: ", bold),
            Span::raw(client.subscription_end_date.with_timezone(&Local).format("%-m/%-d/%Y").to_string()),
        ]),
        Line::from(vec![
            Span::styled("Last update: ", bold),
            Span::raw(client.last_update.with_timezone(&Local).format("%-m/%-d/%Y %H:%M").to_string()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Notes:", bold)),
        Line::from(client.notes.clone()),
    ];
    let info_paragraph = Paragraph::new(info)
        .block(Block::default().borders(Borders::ALL).title("Client"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_paragraph, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    f.render_widget(input_field("Days Remaining", &form.days, false, form.field == DetailField::Days), rows[0]);

    let quick: Vec<String> = QUICK_ADJUSTMENTS
        .iter()
        .enumerate()
        .map(|(i, offset)| format!("F{} {:+}", i + 1, offset))
        .collect();
    f.render_widget(
        Paragraph::new(format!("Quick: {}", quick.join("  "))).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    f.render_widget(input_field("Notes", &form.notes, false, form.field == DetailField::Notes), rows[2]);
    f.render_widget(
        input_field("Update Message", &form.message, false, form.field == DetailField::Message)
            .wrap(Wrap { trim: false }),
        rows[3],
    );

    let templates: Vec<String> = MessageTemplate::ALL
        .iter()
        .enumerate()
        .map(|(i, template)| format!("F{} {}", i + 5, template.title()))
        .collect();
    f.render_widget(
        Paragraph::new(format!("Templates: {}", templates.join("  "))).style(Style::default().fg(Color::DarkGray)),
        rows[4],
    );
}

fn draw_add_client(f: &mut Frame, area: Rect, form: &AddClientForm) {
    let form_area = centered_rect(60, 90, area);
    f.render_widget(Clear, form_area);
    f.render_widget(Block::default().borders(Borders::ALL).title("Add New Client"), form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(form_area);

    let fields: [(&str, &str); AddClientForm::FIELDS] = [
        ("Name *", &form.form.name),
        ("Email *", &form.form.email),
        ("Phone *", &form.form.phone),
        ("Subscription Days *", &form.form.subscription_days),
        ("Notes (Optional)", &form.form.notes),
    ];
    for (i, (label, value)) in fields.iter().enumerate() {
        f.render_widget(input_field(label, value, false, form.field == i), rows[i]);
    }
}

fn draw_profile(f: &mut Frame, area: Rect, app: &App) {
    let session = &app.state.session;
    let summary = StatusSummary::tally(app.state.directory.clients());
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let text = vec![
        Line::from(Span::styled(format!("[{}]", crate::models::initials(session.admin_name())), bold)),
        Line::from(Span::styled(session.admin_name().to_string(), bold)),
        Line::from("Administrator"),
        Line::from(""),
        Line::from(vec![Span::styled("Username: ", bold), Span::raw(session.username().to_string())]),
        Line::from(""),
        Line::from(Span::styled("Client Statistics", bold)),
        Line::from(vec![
            Span::raw(format!("Total: {}  ", summary.total())),
            Span::styled(format!("Active: {}  ", summary.active), Style::default().fg(Color::Green)),
            Span::styled(format!("Expiring: {}  ", summary.expiring), Style::default().fg(Color::Yellow)),
            Span::styled(format!("Expired: {}", summary.expired), Style::default().fg(Color::Red)),
        ]),
    ];
    let profile = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Profile"))
        .alignment(Alignment::Center);
    f.render_widget(profile, centered_rect(50, 50, area));
}

fn draw_popup(f: &mut Frame, popup: &Popup) {
    let area = centered_rect(50, 25, f.size());
    f.render_widget(Clear, area);

    let footer = match popup.kind {
        PopupKind::Notice => "(Enter) OK",
        PopupKind::Confirm(_) => "(y) Yes | (n) No",
    };
    let text = vec![
        Line::from(popup.body.clone()),
        Line::from(""),
        Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(popup.title.clone()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Helper to create a centered rect for popups.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::fresh_state;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn clear_field(app: &mut App, len: usize) {
        for _ in 0..len {
            press(app, KeyCode::Backspace);
        }
    }

    fn popup_title(app: &App) -> Option<&str> {
        app.popup.as_ref().map(|p| p.title.as_str())
    }

    fn ready_app() -> App {
        let mut state = fresh_state();
        assert!(state.session.login("admin", "admin123").success);
        assert!(state.session.change_password("admin123", "newpass1"));
        App::new(state)
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn open_password_change(app: &mut App, current: &str, new: &str) {
        press(app, KeyCode::Char('p'));
        press(app, KeyCode::Char('c'));
        type_text(app, current);
        press(app, KeyCode::Tab);
        type_text(app, new);
        press(app, KeyCode::Tab);
        type_text(app, new);
        press(app, KeyCode::Enter);
    }

    #[test]
    fn test_first_login_forces_password_change() {
        let mut app = App::new(fresh_state());
        assert!(matches!(app.screen, Screen::Login(_)));

        type_text(&mut app, "admin");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "admin123");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.screen, Screen::ChangePassword(_)));

        // Cannot escape to the client list before changing the password.
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.screen, Screen::ChangePassword(_)));

        type_text(&mut app, "admin123");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "newpass1");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "newpass1");
        press(&mut app, KeyCode::Enter);

        assert_eq!(popup_title(&app), Some("Success"));
        assert_eq!(app.screen, Screen::Dashboard);
        assert!(!app.state.session.is_first_login());
        press(&mut app, KeyCode::Enter);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_failed_login_shows_popup_and_clears_password() {
        let mut app = App::new(fresh_state());
        type_text(&mut app, "admin");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "wrong");
        press(&mut app, KeyCode::Enter);

        assert_eq!(popup_title(&app), Some("Login Failed"));
        match &app.screen {
            Screen::Login(form) => {
                assert_eq!(form.username, "admin");
                assert!(form.password.is_empty());
            }
            other => panic!("Expected login screen, got {:?}", other),
        }
        assert!(!app.state.session.is_authenticated());
    }

    #[test]
    fn test_empty_login_is_rejected_before_the_store() {
        let mut app = App::new(fresh_state());
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.popup.as_ref().map(|p| p.body.as_str()), Some("Please enter both username and password"));
    }

    #[test]
    fn test_password_form_rules_are_enforced() {
        let mut app = App::new(fresh_state());
        type_text(&mut app, "admin");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "admin123");
        press(&mut app, KeyCode::Enter);

        type_text(&mut app, "admin123");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            app.popup.as_ref().map(|p| p.body.as_str()),
            Some("New password must be at least 6 characters long")
        );
        assert!(app.state.session.is_first_login());
    }

    #[test]
    fn test_search_then_update_subscription() {
        let mut app = ready_app();
        assert_eq!(app.screen, Screen::Dashboard);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "SARAH");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.visible_clients().len(), 1);

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.screen, Screen::Detail(ref form) if form.client_id == "2"));

        clear_field(&mut app, 3);
        type_text(&mut app, "x0");
        press(&mut app, KeyCode::Enter);

        assert_eq!(popup_title(&app), Some("Success"));
        let client = app.state.directory.get_by_id("2").unwrap();
        assert_eq!(client.subscription_days, 0);
        assert_eq!(client.status, ClientStatus::Expired);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_empty_days_input_is_invalid() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        clear_field(&mut app, 5);
        press(&mut app, KeyCode::Enter);
        assert_eq!(popup_title(&app), Some("Invalid Input"));
        assert!(matches!(app.screen, Screen::Detail(_)));
    }

    #[test]
    fn test_quick_adjust_uses_stored_days_and_rejects_negative() {
        let mut app = ready_app();
        // Seeded client 3 has 0 days.
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.screen, Screen::Detail(ref form) if form.client_id == "3"));

        press(&mut app, KeyCode::F(2));
        assert_eq!(app.popup.as_ref().map(|p| p.body.as_str()), Some("Subscription days cannot be negative"));
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::F(4));
        press(&mut app, KeyCode::F(3));
        match &app.screen {
            Screen::Detail(form) => assert_eq!(form.days, "7"),
            other => panic!("Expected detail screen, got {:?}", other),
        }
    }

    #[test]
    fn test_template_fill_and_send() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::F(5));
        match &app.screen {
            Screen::Detail(form) => {
                assert_eq!(form.field, DetailField::Message);
                assert!(form.message.starts_with("Hi John Smith, your WiFi subscription has 25 days remaining."));
            }
            other => panic!("Expected detail screen, got {:?}", other),
        }

        press(&mut app, KeyCode::Enter);
        assert_eq!(popup_title(&app), Some("Message Sent"));
        let notes = &app.state.directory.get_by_id("1").unwrap().notes;
        assert!(notes.starts_with("Hi John Smith"));
        assert!(notes.contains("(Sent: "));
    }

    #[test]
    fn test_blank_message_is_rejected() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.popup.as_ref().map(|p| p.body.as_str()), Some("Please enter a message"));
        assert_eq!(app.state.directory.get_by_id("1").unwrap().notes, "Premium plan, pays monthly");
    }

    #[test]
    fn test_hide_client_from_view_only() {
        let mut app = ready_app();
        let before = app.visible_clients().len();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(popup_title(&app), Some("Remove Client"));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.visible_clients().len(), before);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.visible_clients().len(), before - 1);
        assert!(app.state.directory.get_by_id("1").is_some());
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_add_client_flow() {
        let mut app = ready_app();
        let before = app.state.directory.len();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Nina Park");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "nina@example.com");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "555-0142");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter); // keep default 30 days
        press(&mut app, KeyCode::Enter);

        assert_eq!(popup_title(&app), Some("Success"));
        assert_eq!(app.state.directory.len(), before + 1);
        let added = app.state.directory.clients().last().unwrap();
        assert_eq!(added.name, "Nina Park");
        assert_eq!(added.status, ClientStatus::Active);
        assert_eq!(added.notes, "New client");
    }

    #[test]
    fn test_profile_logout_requires_confirmation() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.screen, Screen::Profile);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(popup_title(&app), Some("Logout"));
        press(&mut app, KeyCode::Char('y'));
        assert!(!app.state.session.is_authenticated());
        assert!(matches!(app.screen, Screen::Login(_)));
    }

    #[test]
    fn test_change_password_from_profile_can_be_cancelled() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('c'));
        assert!(matches!(app.screen, Screen::ChangePassword(_)));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Profile);
    }

    #[test]
    fn test_profile_shows_directory_statistics() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('p'));
        let screen = render(&app);
        assert!(screen.contains("Client Statistics"));
        assert!(screen.contains("Total: 6  Active: 3  Expiring: 2  Expired: 1"));

        // Hidden clients still count; the statistics cover the whole directory.
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('p'));
        assert!(render(&app).contains("Total: 6"));
    }

    #[test]
    fn test_detail_for_missing_client() {
        let mut app = ready_app();
        let mut form = DetailForm::for_client(app.state.directory.get_by_id("1").unwrap());
        form.client_id = "missing".to_string();
        app.screen = Screen::Detail(form);

        assert!(render(&app).contains("Client not found"));
        press(&mut app, KeyCode::Char('x'));
        assert!(matches!(app.screen, Screen::Detail(_)));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_wrong_current_password_from_profile() {
        let mut app = ready_app();
        open_password_change(&mut app, "wrongpw", "another1");
        assert_eq!(app.popup.as_ref().map(|p| p.body.as_str()), Some("Current password is incorrect"));
        assert!(matches!(app.screen, Screen::ChangePassword(ref form) if form.current.is_empty()));
    }

    #[test]
    fn test_hashing_failure_is_not_reported_as_wrong_password() {
        let mut app = ready_app();
        app.state.session.set_argon2_params(crate::config::Argon2Params { m_cost: 1024, t_cost: 0, p_cost: 1 });
        open_password_change(&mut app, "newpass1", "another1");
        assert_eq!(
            app.popup.as_ref().map(|p| p.body.as_str()),
            Some("Could not update the password. Please try again.")
        );
        assert!(matches!(app.screen, Screen::ChangePassword(ref form) if form.current == "newpass1"));
        assert!(app.state.session.verify_current_password("newpass1"));
    }

    #[test]
    fn test_every_screen_renders() {
        let mut app = App::new(fresh_state());
        render(&app);
        app = ready_app();
        render(&app);
        press(&mut app, KeyCode::Enter);
        render(&app);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('a'));
        render(&app);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('p'));
        render(&app);
        press(&mut app, KeyCode::Char('l'));
        render(&app);
    }
}
