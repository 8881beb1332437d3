//! UI state and key handling.
//!
//! [`App`] wraps the [`Navigator`] with what only the terminal needs: the
//! list cursor, the line being typed and whether a field edit or delete
//! confirmation is in progress. Keys are first turned into a [`Command`]
//! (synchronously, so the event loop can draw a busy frame) and then
//! executed against the navigator.

#![forbid(unsafe_code)]

use std::mem::{self, Discriminant};

use cf_dns_edit_lib::{CfDnsError, Connect, Navigator, RecordDraft, RecordField, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

/// Entries of the record detail menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailItem {
    Field(RecordField),
    Save,
    Delete,
    Back,
}

pub const DETAIL_MENU: [DetailItem; 9] = [
    DetailItem::Field(RecordField::Type),
    DetailItem::Field(RecordField::Name),
    DetailItem::Field(RecordField::Content),
    DetailItem::Field(RecordField::Proxied),
    DetailItem::Field(RecordField::Comment),
    DetailItem::Field(RecordField::Ttl),
    DetailItem::Save,
    DetailItem::Delete,
    DetailItem::Back,
];

/// The screen on top of the stack, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Login,
    DomainList,
    RecordList,
    RecordDetail,
    AddRecord,
    About,
    Closed,
}

impl From<Option<&Screen>> for ScreenKind {
    fn from(screen: Option<&Screen>) -> Self {
        match screen {
            Some(Screen::Login) => Self::Login,
            Some(Screen::DomainList) => Self::DomainList,
            Some(Screen::RecordList { .. }) => Self::RecordList,
            Some(Screen::RecordDetail { .. }) => Self::RecordDetail,
            Some(Screen::AddRecord { .. }) => Self::AddRecord,
            Some(Screen::About) => Self::About,
            None => Self::Closed,
        }
    }
}

/// What the keyboard is currently driving on top of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    /// Typing a new value for one field of the open record.
    Editing(RecordField),
    /// Waiting for the y/N answer to a delete.
    ConfirmDelete,
}

/// A navigator action requested by a key press.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    SelectDomain(usize),
    SelectRecord(usize),
    BeginAdd,
    AddInput(String),
    EditField(RecordField, String),
    Save,
    ConfirmDelete(String),
    Refresh,
    Logout,
    About,
    Back,
    Exit,
}

impl Command {
    /// Whether executing the command may wait on Cloudflare.
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Login(_)
                | Self::SelectDomain(_)
                | Self::AddInput(_)
                | Self::Save
                | Self::ConfirmDelete(_)
                | Self::Refresh
        )
    }
}

/// A single line of text input.
#[derive(securefmt::Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    #[sensitive]
    value: String,
}

impl LineInput {
    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn pop(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Returns the text and empties the line.
    pub fn take(&mut self) -> String {
        mem::take(&mut self.value)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// One `*` per character.
    pub fn masked(&self) -> String {
        "*".repeat(self.value.chars().count())
    }
}

/// Raw text to pre-fill when editing `field`.
pub fn initial_input(draft: &RecordDraft, field: RecordField) -> String {
    match field {
        RecordField::Type => draft.record_type.to_string(),
        RecordField::Name => draft.name.clone(),
        RecordField::Content => draft.content.clone(),
        RecordField::Proxied => (if draft.proxied { "yes" } else { "no" }).to_string(),
        RecordField::Comment => draft.comment.clone().unwrap_or_default(),
        RecordField::Ttl => draft.ttl.to_string(),
    }
}

pub struct App<C: Connect> {
    pub nav: Navigator<C>,
    pub list: ListState,
    pub input: LineInput,
    pub mode: Mode,
    /// Set while a remote call is in flight.
    pub working: bool,
    shown: Option<(usize, Discriminant<Screen>)>,
}

impl<C: Connect> App<C> {
    pub fn new(nav: Navigator<C>) -> Self {
        let mut app = Self {
            nav,
            list: ListState::default(),
            input: LineInput::default(),
            mode: Mode::Browse,
            working: false,
            shown: None,
        };
        app.sync();
        app
    }

    pub fn screen_kind(&self) -> ScreenKind {
        ScreenKind::from(self.nav.screen())
    }

    pub fn selected(&self) -> usize {
        self.list.selected().unwrap_or(0)
    }

    fn list_len(&self) -> usize {
        match self.screen_kind() {
            ScreenKind::DomainList => self.nav.domains().len(),
            ScreenKind::RecordList => self.nav.records().len(),
            ScreenKind::RecordDetail => DETAIL_MENU.len(),
            _ => 0,
        }
    }

    /// Whether the bottom line is taking typed text.
    pub fn accepts_text(&self) -> bool {
        self.mode != Mode::Browse
            || matches!(self.screen_kind(), ScreenKind::Login | ScreenKind::AddRecord)
    }

    /// Resets the cursor and input when a different screen comes up, and
    /// keeps the cursor inside the current list.
    pub fn sync(&mut self) {
        let current = self
            .nav
            .screen()
            .map(|screen| (self.nav.depth(), mem::discriminant(screen)));
        if current != self.shown {
            self.shown = current;
            self.mode = Mode::Browse;
            self.input.clear();
            self.list.select(Some(0));
        }

        let len = self.list_len();
        match self.list.selected() {
            _ if len == 0 => self.list.select(None),
            Some(index) if index >= len => self.list.select(Some(len - 1)),
            None => self.list.select(Some(0)),
            Some(_) => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.list_len();
        if len == 0 {
            return;
        }
        let next = self.selected().saturating_add_signed(delta).min(len - 1);
        self.list.select(Some(next));
    }

    /// Turns a key press into a command, updating local UI state on the way.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Exit);
        }

        match self.mode {
            Mode::Editing(field) => return self.handle_edit_key(key.code, field),
            Mode::ConfirmDelete => return self.handle_confirm_key(key.code),
            Mode::Browse => {}
        }

        match self.screen_kind() {
            ScreenKind::Login => match key.code {
                KeyCode::Enter => Some(Command::Login(self.input.take())),
                KeyCode::Esc => Some(Command::Exit),
                code => self.type_text(code),
            },
            ScreenKind::DomainList => self.handle_list_key(key.code, Command::SelectDomain),
            ScreenKind::RecordList => match key.code {
                KeyCode::Char('a') => Some(Command::BeginAdd),
                code => self.handle_list_key(code, Command::SelectRecord),
            },
            ScreenKind::RecordDetail => self.handle_detail_key(key.code),
            ScreenKind::AddRecord => match key.code {
                KeyCode::Enter => Some(Command::AddInput(self.input.take())),
                KeyCode::Esc => Some(Command::Back),
                code => self.type_text(code),
            },
            ScreenKind::About => match key.code {
                KeyCode::Char('q') => Some(Command::Exit),
                _ => Some(Command::Back),
            },
            ScreenKind::Closed => Some(Command::Exit),
        }
    }

    fn type_text(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => self.input.pop(),
            _ => {}
        }
        None
    }

    fn handle_list_key(
        &mut self,
        code: KeyCode,
        select: fn(usize) -> Command,
    ) -> Option<Command> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.list.select(Some(0)),
            KeyCode::End => self.move_selection(isize::MAX),
            KeyCode::Enter => return self.list.selected().map(select),
            KeyCode::Char('r') => return Some(Command::Refresh),
            KeyCode::Char('l') => return Some(Command::Logout),
            KeyCode::Char('?' | 'i') => return Some(Command::About),
            KeyCode::Char('q') => return Some(Command::Exit),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => return Some(Command::Back),
            _ => {}
        }
        None
    }

    fn handle_detail_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter => match DETAIL_MENU.get(self.selected()) {
                Some(DetailItem::Field(field)) => self.start_edit(*field),
                Some(DetailItem::Save) => return Some(Command::Save),
                Some(DetailItem::Delete) => self.start_confirm(),
                Some(DetailItem::Back) => return Some(Command::Back),
                None => {}
            },
            KeyCode::Char('s') => return Some(Command::Save),
            KeyCode::Char('d') => self.start_confirm(),
            KeyCode::Char('?' | 'i') => return Some(Command::About),
            KeyCode::Char('q') => return Some(Command::Exit),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => return Some(Command::Back),
            _ => {}
        }
        None
    }

    fn handle_edit_key(&mut self, code: KeyCode, field: RecordField) -> Option<Command> {
        match code {
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                Some(Command::EditField(field, self.input.take()))
            }
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.input.clear();
                None
            }
            code => self.type_text(code),
        }
    }

    fn handle_confirm_key(&mut self, code: KeyCode) -> Option<Command> {
        match code {
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                Some(Command::ConfirmDelete(self.input.take()))
            }
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.input.clear();
                Some(Command::ConfirmDelete(String::new()))
            }
            code => self.type_text(code),
        }
    }

    fn start_edit(&mut self, field: RecordField) {
        if let Some(Screen::RecordDetail { draft, .. }) = self.nav.screen() {
            self.input.set(initial_input(draft, field));
            self.mode = Mode::Editing(field);
        }
    }

    fn start_confirm(&mut self) {
        self.input.clear();
        self.mode = Mode::ConfirmDelete;
    }

    /// Runs `command` against the navigator.
    ///
    /// # Errors
    ///
    /// Passes on the navigator's fatal errors.
    pub async fn execute(&mut self, command: Command) -> Result<(), CfDnsError> {
        match command {
            Command::Login(token) => self.nav.login(&token).await?,
            Command::SelectDomain(index) => self.nav.select_domain(index).await?,
            Command::SelectRecord(index) => self.nav.select_record(index),
            Command::BeginAdd => self.nav.begin_add(),
            Command::AddInput(input) => self.nav.submit_add_input(&input).await?,
            Command::EditField(field, input) => self.nav.edit_field(field, &input),
            Command::Save => self.nav.save().await?,
            Command::ConfirmDelete(answer) => self.nav.confirm_delete(&answer).await?,
            Command::Refresh => self.nav.refresh().await?,
            Command::Logout => self.nav.logout(),
            Command::About => self.nav.show_about(),
            Command::Back => self.nav.back(),
            Command::Exit => self.nav.exit(),
        }
        self.sync();
        Ok(())
    }
}
