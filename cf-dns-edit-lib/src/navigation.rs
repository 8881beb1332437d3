//! Screen navigation for the interactive editor.
//!
//! [`Navigator`] owns the session and a stack of [`Screen`]s. The terminal
//! front-end only renders the top of the stack and forwards user actions to
//! the methods here; every remote call goes through the session's
//! [`DnsGateway`].
//!
//! Methods return `Err` only for failures that should end the program, such
//! as being unable to write the config file. Remote and validation failures
//! are reported through [`Navigator::notice`] and leave the current screen in
//! place.

#![forbid(unsafe_code)]

use tracing::{debug, error, info, warn};

use crate::{
    credentials::{CredentialStore, TokenSource},
    error::CfDnsError,
    gateway::{Connect, DnsGateway},
    helpers::{is_affirmative, pluralize},
    record::{Record, RecordDraft, RecordField},
    zone::Domain,
};

/// A verified gateway together with where its token came from.
pub struct Session<G> {
    gateway: G,
    source: TokenSource,
}

impl<G: DnsGateway> Session<G> {
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub const fn source(&self) -> TokenSource {
        self.source
    }
}

/// A screen on the navigation stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Token prompt.
    Login,
    DomainList,
    /// Records of one domain.
    RecordList { domain: Domain },
    /// One record and the draft being edited.
    RecordDetail { record: Record, draft: RecordDraft },
    /// Step-by-step creation of a record in `domain`.
    AddRecord { domain: Domain, form: AddRecordForm },
    About,
}

/// Progress through the add-record prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRecordForm {
    draft: RecordDraft,
    step: usize,
}

impl AddRecordForm {
    /// The field currently being asked for, or `None` once all are filled in.
    #[must_use]
    pub fn current_field(&self) -> Option<RecordField> {
        RecordField::ALL.get(self.step).copied()
    }

    #[must_use]
    pub const fn draft(&self) -> &RecordDraft {
        &self.draft
    }

    /// Fields answered so far.
    pub fn answered(&self) -> impl Iterator<Item = RecordField> + '_ {
        RecordField::ALL.iter().copied().take(self.step)
    }

    /// Applies `input` to the current field and moves on.
    ///
    /// Returns `true` when the last field has been filled in. On a validation
    /// error the step does not advance.
    fn submit(&mut self, input: &str) -> Result<bool, CfDnsError> {
        let Some(field) = self.current_field() else {
            return Ok(true);
        };
        self.draft.apply(field, input)?;
        self.step += 1;
        Ok(self.current_field().is_none())
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-line message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// The editor state machine.
pub struct Navigator<C: Connect> {
    connector: C,
    store: CredentialStore,
    session: Option<Session<C::Gateway>>,
    stack: Vec<Screen>,
    domains: Vec<Domain>,
    records: Vec<Record>,
    notice: Option<Notice>,
    exited: bool,
}

impl<C: Connect> Navigator<C> {
    /// Creates a navigator showing the login screen.
    pub fn new(connector: C, store: CredentialStore) -> Self {
        Self {
            connector,
            store,
            session: None,
            stack: vec![Screen::Login],
            domains: Vec::new(),
            records: Vec::new(),
            notice: None,
            exited: false,
        }
    }

    /// Logs in with a stored token if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn start(&mut self) -> Result<(), CfDnsError> {
        match self.store.load() {
            Some(stored) => {
                info!("Found stored API token ({:?})", stored.source);
                self.authenticate(&stored.token, stored.source).await
            }
            None => {
                debug!("No stored API token, showing login");
                Ok(())
            }
        }
    }

    /// Logs in with a token typed at the prompt. The token is saved once it
    /// has been verified.
    ///
    /// # Errors
    ///
    /// Returns an error if the verified token cannot be saved.
    pub async fn login(&mut self, token: &str) -> Result<(), CfDnsError> {
        self.authenticate(token, TokenSource::Prompt).await
    }

    async fn authenticate(&mut self, token: &str, source: TokenSource) -> Result<(), CfDnsError> {
        let token = token.trim();
        if token.is_empty() {
            self.notify(NoticeLevel::Warning, "API token cannot be empty.");
            return Ok(());
        }

        let gateway = match self.connector.connect(token) {
            Ok(gateway) => gateway,
            Err(e) => {
                error!("Failed to set up Cloudflare client: {e}");
                self.notify(NoticeLevel::Error, format!("Could not connect: {e}"));
                return Ok(());
            }
        };

        match gateway.verify().await {
            Ok(()) => {
                if source == TokenSource::Prompt {
                    self.store.save(token)?;
                }
                self.session = Some(Session { gateway, source });
                self.stack = vec![Screen::DomainList];
                info!("Logged in");
                self.load_domains().await
            }
            Err(e) if e.is_auth() => {
                warn!("API token rejected: {e}");
                if source != TokenSource::Environment {
                    self.store.clear()?;
                }
                self.reset_to_login();
                self.notify(NoticeLevel::Error, "Invalid API token, please try again.");
                Ok(())
            }
            Err(e) => {
                error!("Token verification failed: {e}");
                self.notify(
                    NoticeLevel::Error,
                    format!("Could not verify API token: {e}"),
                );
                Ok(())
            }
        }
    }

    /// Fetches every domain in the account.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn load_domains(&mut self) -> Result<(), CfDnsError> {
        let Some(session) = &self.session else {
            self.lost_session();
            return Ok(());
        };

        match session.gateway.list_zones().await {
            Ok(domains) => {
                let text = if domains.is_empty() {
                    "No domains found in your Cloudflare account.".to_string()
                } else {
                    format!("Found {}.", pluralize(domains.len(), "domain"))
                };
                info!("Loaded {}", pluralize(domains.len(), "domain"));
                self.domains = domains;
                self.notify(NoticeLevel::Info, text);
                Ok(())
            }
            Err(e) => {
                self.domains.clear();
                self.remote_failure(&e, "Failed to load domains")
            }
        }
    }

    /// Fetches the records of the domain whose record list is open.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn load_records(&mut self) -> Result<(), CfDnsError> {
        let Some(domain) = self.current_domain().cloned() else {
            return Ok(());
        };
        let Some(session) = &self.session else {
            self.lost_session();
            return Ok(());
        };

        match session.gateway.list_records(&domain.id).await {
            Ok(records) => {
                let text = if records.is_empty() {
                    format!("No DNS records found for {domain}.")
                } else {
                    format!("Found {}.", pluralize(records.len(), "DNS record"))
                };
                info!(
                    "Loaded {} for {domain}",
                    pluralize(records.len(), "record")
                );
                self.records = records;
                self.notify(NoticeLevel::Info, text);
                Ok(())
            }
            Err(e) => {
                self.records.clear();
                self.remote_failure(&e, "Failed to load DNS records")
            }
        }
    }

    /// Opens the record list of the domain at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn select_domain(&mut self, index: usize) -> Result<(), CfDnsError> {
        if self.screen() != Some(&Screen::DomainList) {
            return Ok(());
        }
        let Some(domain) = self.domains.get(index).cloned() else {
            return Ok(());
        };

        debug!("Opening {domain} ({})", domain.id);
        self.records.clear();
        self.stack.push(Screen::RecordList { domain });
        self.load_records().await
    }

    /// Opens the record at `index` for editing.
    pub fn select_record(&mut self, index: usize) {
        if !matches!(self.screen(), Some(Screen::RecordList { .. })) {
            return;
        }
        if let Some(record) = self.records.get(index).cloned() {
            let draft = RecordDraft::from(&record);
            self.stack.push(Screen::RecordDetail { record, draft });
        }
    }

    /// Sets one field of the open record's draft. Nothing is sent.
    pub fn edit_field(&mut self, field: RecordField, input: &str) {
        let result = match self.stack.last_mut() {
            Some(Screen::RecordDetail { draft, .. }) => draft.apply(field, input),
            _ => return,
        };

        match result {
            Ok(()) => self.notify(
                NoticeLevel::Info,
                format!("{} updated. Save to apply.", field.label()),
            ),
            Err(e) => self.notify(NoticeLevel::Warning, e.to_string()),
        }
    }

    /// Sends the draft of the open record, replacing the remote record.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn save(&mut self) -> Result<(), CfDnsError> {
        let Some(Screen::RecordDetail { record, draft }) = self.screen() else {
            return Ok(());
        };
        if let Err(e) = draft.validate() {
            self.notify(NoticeLevel::Warning, e.to_string());
            return Ok(());
        }
        let (record, draft) = (record.clone(), draft.clone());
        let Some(session) = &self.session else {
            self.lost_session();
            return Ok(());
        };

        match session
            .gateway
            .update_record(&record.zone_id, &record.id, &draft)
            .await
        {
            Ok(updated) => {
                self.stack.pop();
                self.load_records().await?;
                self.report_success(format!("Updated DNS record for {}", updated.name));
                Ok(())
            }
            Err(e) => self.remote_failure(&e, "Failed to update DNS record"),
        }
    }

    /// Deletes the open record if `answer` confirms it.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn confirm_delete(&mut self, answer: &str) -> Result<(), CfDnsError> {
        let Some(Screen::RecordDetail { record, .. }) = self.screen() else {
            return Ok(());
        };
        if !is_affirmative(answer) {
            self.notify(NoticeLevel::Info, "Deletion cancelled.");
            return Ok(());
        }
        let record = record.clone();
        let Some(session) = &self.session else {
            self.lost_session();
            return Ok(());
        };

        match session
            .gateway
            .delete_record(&record.zone_id, &record.id)
            .await
        {
            Ok(()) => {
                info!("Deleted {} record {}", record.record_type, record.name);
                self.stack.pop();
                self.load_records().await?;
                self.report_success(format!("Deleted DNS record for {}", record.name));
                Ok(())
            }
            Err(e) => self.remote_failure(&e, "Failed to delete DNS record"),
        }
    }

    /// Starts the add-record prompts for the open domain.
    pub fn begin_add(&mut self) {
        if let Some(Screen::RecordList { domain }) = self.screen() {
            let domain = domain.clone();
            self.stack.push(Screen::AddRecord {
                domain,
                form: AddRecordForm::default(),
            });
        }
    }

    /// Answers the current add-record prompt. After the last answer the
    /// record is created and the record list is shown again.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn submit_add_input(&mut self, input: &str) -> Result<(), CfDnsError> {
        let outcome = match self.stack.last_mut() {
            Some(Screen::AddRecord { domain, form }) => form
                .submit(input)
                .map(|done| done.then(|| (domain.id.clone(), form.draft.clone()))),
            _ => return Ok(()),
        };

        let (zone_id, draft) = match outcome {
            Ok(Some(complete)) => complete,
            Ok(None) => return Ok(()),
            Err(e) => {
                self.notify(NoticeLevel::Warning, e.to_string());
                return Ok(());
            }
        };
        let Some(session) = &self.session else {
            self.lost_session();
            return Ok(());
        };

        let result = session.gateway.create_record(&zone_id, &draft).await;
        self.stack.pop();
        match result {
            Ok(record) => {
                info!("Created {} record {}", record.record_type, record.name);
                self.load_records().await?;
                self.report_success(format!("Added new DNS record for {}", record.name));
                Ok(())
            }
            Err(e) => self.remote_failure(&e, "Failed to add DNS record"),
        }
    }

    /// Reloads whichever list is on screen.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal failures, see [`Navigator`].
    pub async fn refresh(&mut self) -> Result<(), CfDnsError> {
        match self.screen() {
            Some(Screen::DomainList) => self.load_domains().await,
            Some(Screen::RecordList { .. }) => self.load_records().await,
            _ => Ok(()),
        }
    }

    /// Pops the current screen. Leaving the last screen exits.
    pub fn back(&mut self) {
        match self.stack.pop() {
            Some(Screen::RecordList { .. }) => self.records.clear(),
            Some(Screen::AddRecord { .. }) => self.notify(NoticeLevel::Info, "Add cancelled."),
            _ => {}
        }
        if self.stack.is_empty() {
            self.exit();
        }
    }

    /// Drops the session and shows the login screen. The stored token is kept.
    pub fn logout(&mut self) {
        info!("Logged out");
        self.session = None;
        self.reset_to_login();
        self.notify(NoticeLevel::Info, "Logged out");
    }

    pub fn show_about(&mut self) {
        if self.screen() != Some(&Screen::About) {
            self.stack.push(Screen::About);
        }
    }

    pub fn exit(&mut self) {
        debug!("Exit requested");
        self.exited = true;
    }

    #[must_use]
    pub const fn is_exited(&self) -> bool {
        self.exited
    }

    /// The screen on top of the stack.
    #[must_use]
    pub fn screen(&self) -> Option<&Screen> {
        self.stack.last()
    }

    /// Number of screens on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Domain of the innermost open record list.
    #[must_use]
    pub fn current_domain(&self) -> Option<&Domain> {
        self.stack.iter().rev().find_map(|screen| match screen {
            Screen::RecordList { domain } | Screen::AddRecord { domain, .. } => Some(domain),
            _ => None,
        })
    }

    #[must_use]
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session<C::Gateway>> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
        });
    }

    /// Replaces the reload notice unless the reload itself failed.
    fn report_success(&mut self, text: String) {
        if self.notice.as_ref().map(|notice| notice.level) != Some(NoticeLevel::Error) {
            self.notify(NoticeLevel::Success, text);
        }
    }

    fn reset_to_login(&mut self) {
        self.domains.clear();
        self.records.clear();
        self.stack = vec![Screen::Login];
    }

    fn lost_session(&mut self) {
        error!("Remote call attempted without a session");
        self.reset_to_login();
        self.notify(NoticeLevel::Error, "Unknown error, please log back in.");
    }

    fn remote_failure(&mut self, e: &CfDnsError, context: &str) -> Result<(), CfDnsError> {
        if !e.is_auth() {
            error!("{context}: {e}");
            self.notify(NoticeLevel::Error, format!("{context}: {e}"));
            return Ok(());
        }

        warn!("Session rejected by Cloudflare: {e}");
        if let Some(session) = self.session.take() {
            if session.source != TokenSource::Environment {
                self.store.clear()?;
            }
        }
        self.reset_to_login();
        self.notify(
            NoticeLevel::Error,
            "Your API token is no longer valid, please log in again.",
        );
        Ok(())
    }
}
