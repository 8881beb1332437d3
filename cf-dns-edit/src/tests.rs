//! Tests for the cf-dns-edit CLI and terminal front-end.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cf_dns_edit_lib::{
    CfDnsError, CloudflareConnector, Connect, CredentialStore, DnsGateway, Domain, Navigator,
    Record, RecordDraft, RecordField, RecordType, Screen, Ttl,
};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;

use crate::{
    cli::{version_line, Cli},
    commands, load_env_file, open_log_file,
    tui::{
        app::{initial_input, Command, LineInput, Mode, ScreenKind},
        view::{help_text, is_too_small, truncate, type_color},
        App,
    },
};

const GOOD_TOKEN: &str = "good-token";

#[derive(Clone, Default)]
struct FakeCloudflare {
    calls: Arc<Mutex<Vec<String>>>,
}

struct FakeGateway {
    token: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeCloudflare {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }
}

impl Connect for FakeCloudflare {
    type Gateway = FakeGateway;

    fn connect(&self, token: &str) -> Result<FakeGateway, CfDnsError> {
        Ok(FakeGateway {
            token: token.to_string(),
            calls: Arc::clone(&self.calls),
        })
    }
}

impl FakeGateway {
    fn log(&self, call: &str) {
        self.calls.lock().expect("calls").push(call.to_string());
    }
}

fn stored(id: &str, zone_id: &str, draft: &RecordDraft) -> Record {
    Record {
        id: id.to_string(),
        zone_id: zone_id.to_string(),
        record_type: draft.record_type.clone(),
        name: draft.name.clone(),
        content: draft.content.clone(),
        proxied: draft.proxied,
        comment: draft.comment.clone(),
        ttl: draft.ttl,
    }
}

#[async_trait]
impl DnsGateway for FakeGateway {
    async fn verify(&self) -> Result<(), CfDnsError> {
        self.log("verify");
        if self.token == GOOD_TOKEN {
            Ok(())
        } else {
            Err(CfDnsError::Auth("Invalid API Token".to_string()))
        }
    }

    async fn list_zones(&self) -> Result<Vec<Domain>, CfDnsError> {
        self.log("list_zones");
        Ok(vec![
            Domain::new("zone-1", "example.com"),
            Domain::new("zone-2", "test.org"),
        ])
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, CfDnsError> {
        self.log(&format!("list_records:{zone_id}"));
        let draft = RecordDraft {
            record_type: RecordType::A,
            name: "www.test.org".to_string(),
            content: "198.51.100.7".to_string(),
            proxied: true,
            comment: None,
            ttl: Ttl::AUTO,
        };
        Ok(vec![stored("rec-1", zone_id, &draft)])
    }

    async fn create_record(&self, zone_id: &str, draft: &RecordDraft) -> Result<Record, CfDnsError> {
        self.log(&format!("create_record:{zone_id}"));
        Ok(stored("rec-new", zone_id, draft))
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        draft: &RecordDraft,
    ) -> Result<Record, CfDnsError> {
        self.log(&format!("update_record:{zone_id}:{record_id}"));
        Ok(stored(record_id, zone_id, draft))
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), CfDnsError> {
        self.log(&format!("delete_record:{zone_id}:{record_id}"));
        Ok(())
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_into<C: Connect>(app: &mut App<C>, text: &str) {
    for c in text.chars() {
        assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
    }
}

async fn press<C: Connect>(app: &mut App<C>, code: KeyCode) {
    if let Some(command) = app.handle_key(key(code)) {
        app.execute(command).await.expect("command should not be fatal");
    }
}

fn fake_app(dir: &tempfile::TempDir) -> (FakeCloudflare, App<FakeCloudflare>) {
    let connector = FakeCloudflare::default();
    let store = CredentialStore::new(dir.path().join("cf-dns-edit.json"));
    let app = App::new(Navigator::new(connector.clone(), store));
    (connector, app)
}

async fn open_first_record(app: &mut App<FakeCloudflare>) {
    type_into(app, GOOD_TOKEN);
    press(app, KeyCode::Enter).await;
    press(app, KeyCode::Down).await;
    press(app, KeyCode::Enter).await;
    press(app, KeyCode::Enter).await;
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["cf-dns-edit"]).expect("no arguments is valid");
    assert!(!cli.version);
    assert!(!cli.check);
    assert!(cli.config.is_none());
}

#[test]
fn test_version_flags() {
    for flag in ["-v", "--version"] {
        let cli = Cli::try_parse_from(["cf-dns-edit", flag]).expect("version flag is valid");
        assert!(cli.version, "{flag} should request the version");
    }
    assert_eq!(
        version_line(),
        format!("cf-dns-edit version {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_config_and_check_flags() {
    let cli = Cli::try_parse_from(["cf-dns-edit", "--config", "/tmp/cf.json", "--check"])
        .expect("flags are valid");
    assert!(cli.check);
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/cf.json"))
    );

    assert!(Cli::try_parse_from(["cf-dns-edit", "--zone"]).is_err());
}

#[test]
fn test_terminal_size_threshold() {
    assert!(is_too_small(70, 30));
    assert!(is_too_small(71, 29));
    assert!(!is_too_small(71, 30));
    assert!(!is_too_small(200, 60));
}

#[test]
fn test_record_type_colors() {
    assert_eq!(type_color(&RecordType::A), Color::Green);
    assert_eq!(type_color(&RecordType::AAAA), Color::Green);
    assert_eq!(type_color(&RecordType::CNAME), Color::Blue);
    assert_eq!(type_color(&RecordType::MX), Color::Magenta);
    assert_eq!(type_color(&RecordType::TXT), Color::Yellow);
    assert_eq!(type_color(&RecordType::NS), Color::Cyan);
    assert_eq!(type_color(&RecordType::SRV), Color::Red);
    assert_eq!(type_color(&RecordType::from("HTTPS")), Color::Gray);
}

#[test]
fn test_truncate_counts_characters() {
    assert_eq!(truncate("example.com", 20), "example.com");
    assert_eq!(truncate("a-very-long-subdomain.example.com", 12), "a-very-lo...");
    assert_eq!(truncate("ééééééééééé", 6), "ééé...");
}

#[test]
fn test_help_text_follows_mode() {
    assert_eq!(
        help_text(ScreenKind::RecordDetail, Mode::ConfirmDelete),
        "Enter confirm  Esc cancel"
    );
    assert!(help_text(ScreenKind::RecordList, Mode::Browse).contains("a add"));
    assert!(help_text(ScreenKind::DomainList, Mode::Browse).contains("l logout"));
}

#[test]
fn test_line_input_masks_and_takes() {
    let mut input = LineInput::default();
    for c in "tökén".chars() {
        input.push(c);
    }
    assert_eq!(input.masked(), "*****");
    input.pop();
    assert_eq!(input.take(), "tök\u{e9}");
    assert_eq!(input.as_str(), "");
}

#[test]
fn test_initial_input_uses_raw_values() {
    let mut draft = RecordDraft {
        record_type: RecordType::MX,
        name: "example.com".to_string(),
        content: "mail.example.com".to_string(),
        proxied: false,
        comment: None,
        ttl: Ttl::AUTO,
    };
    assert_eq!(initial_input(&draft, RecordField::Type), "MX");
    assert_eq!(initial_input(&draft, RecordField::Proxied), "no");
    assert_eq!(initial_input(&draft, RecordField::Comment), "");
    assert_eq!(initial_input(&draft, RecordField::Ttl), "Auto");

    draft.ttl = Ttl::new(600);
    draft.comment = Some("primary".to_string());
    assert_eq!(initial_input(&draft, RecordField::Ttl), "600");
    assert_eq!(initial_input(&draft, RecordField::Comment), "primary");
}

#[test]
fn test_login_screen_collects_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CredentialStore::new(dir.path().join("cf-dns-edit.json"));
    let mut app = App::new(Navigator::new(CloudflareConnector::default(), store));
    assert_eq!(app.screen_kind(), ScreenKind::Login);
    assert!(app.accepts_text());

    type_into(&mut app, "abcd");
    assert!(app.handle_key(key(KeyCode::Backspace)).is_none());
    assert_eq!(app.input.masked(), "***");

    let command = app.handle_key(key(KeyCode::Enter));
    assert!(matches!(command, Some(Command::Login(ref token)) if token == "abc"));
    assert!(matches!(command, Some(ref login) if login.is_remote()));
    assert_eq!(app.input.as_str(), "");

    assert!(matches!(
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Command::Exit)
    ));
}

#[tokio::test]
async fn test_keys_drive_navigation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (connector, mut app) = fake_app(&dir);

    type_into(&mut app, GOOD_TOKEN);
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.screen_kind(), ScreenKind::DomainList);
    assert_eq!(app.list.selected(), Some(0));

    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Down).await;
    assert_eq!(app.list.selected(), Some(1));

    press(&mut app, KeyCode::Enter).await;
    assert_eq!(
        app.nav.screen(),
        Some(&Screen::RecordList {
            domain: Domain::new("zone-2", "test.org")
        })
    );
    assert_eq!(app.list.selected(), Some(0));

    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.screen_kind(), ScreenKind::DomainList);
    assert!(app.nav.records().is_empty());

    press(&mut app, KeyCode::Char('?')).await;
    assert_eq!(app.screen_kind(), ScreenKind::About);
    press(&mut app, KeyCode::Char('x')).await;
    assert_eq!(app.screen_kind(), ScreenKind::DomainList);

    press(&mut app, KeyCode::Char('q')).await;
    assert!(app.nav.is_exited());
    assert_eq!(
        connector.calls(),
        vec!["verify", "list_zones", "list_records:zone-2"]
    );
}

#[tokio::test]
async fn test_field_edit_prefills_and_applies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (connector, mut app) = fake_app(&dir);
    open_first_record(&mut app).await;
    assert_eq!(app.screen_kind(), ScreenKind::RecordDetail);

    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.mode, Mode::Editing(RecordField::Content));
    assert_eq!(app.input.as_str(), "198.51.100.7");

    press(&mut app, KeyCode::Backspace).await;
    assert_eq!(app.input.as_str(), "198.51.100.");
    type_into(&mut app, "200");
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.mode, Mode::Browse);

    let Some(Screen::RecordDetail { draft, .. }) = app.nav.screen() else {
        panic!("expected record detail");
    };
    assert_eq!(draft.content, "198.51.100.200");

    press(&mut app, KeyCode::Char('s')).await;
    assert_eq!(app.screen_kind(), ScreenKind::RecordList);
    assert!(connector
        .calls()
        .contains(&"update_record:zone-2:rec-1".to_string()));
}

#[tokio::test]
async fn test_delete_needs_confirmation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (connector, mut app) = fake_app(&dir);
    open_first_record(&mut app).await;

    press(&mut app, KeyCode::Char('d')).await;
    assert_eq!(app.mode, Mode::ConfirmDelete);
    assert!(app.accepts_text());
    type_into(&mut app, "n");
    press(&mut app, KeyCode::Enter).await;

    assert_eq!(app.screen_kind(), ScreenKind::RecordDetail);
    assert_eq!(
        app.nav.notice().map(|notice| notice.text.as_str()),
        Some("Deletion cancelled.")
    );

    press(&mut app, KeyCode::Char('d')).await;
    type_into(&mut app, "y");
    press(&mut app, KeyCode::Enter).await;

    assert_eq!(app.screen_kind(), ScreenKind::RecordList);
    let deletes: Vec<_> = connector
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("delete_record"))
        .collect();
    assert_eq!(deletes, vec!["delete_record:zone-2:rec-1"]);
}

#[tokio::test]
async fn test_add_flow_from_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (connector, mut app) = fake_app(&dir);
    type_into(&mut app, GOOD_TOKEN);
    press(&mut app, KeyCode::Enter).await;
    press(&mut app, KeyCode::Enter).await;

    press(&mut app, KeyCode::Char('a')).await;
    assert_eq!(app.screen_kind(), ScreenKind::AddRecord);

    for answer in ["TXT", "_dmarc.example.com", "v=DMARC1; p=none", "no", "", "auto"] {
        type_into(&mut app, answer);
        press(&mut app, KeyCode::Enter).await;
    }

    assert_eq!(app.screen_kind(), ScreenKind::RecordList);
    assert!(connector
        .calls()
        .contains(&"create_record:zone-1".to_string()));
    assert_eq!(
        app.nav.notice().map(|notice| notice.text.as_str()),
        Some("Added new DNS record for _dmarc.example.com")
    );
}

#[tokio::test]
async fn test_check_without_token_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CredentialStore::new(dir.path().join("cf-dns-edit.json"));

    let err = commands::check(&FakeCloudflare::default(), &store)
        .await
        .expect_err("no token to check");
    assert!(err.to_string().contains("CLOUDFLARE_API_TOKEN"));
}

#[tokio::test]
async fn test_check_clears_rejected_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CredentialStore::new(dir.path().join("cf-dns-edit.json"));
    store.save("abc123").expect("save");

    let result = commands::check(&FakeCloudflare::default(), &store).await;

    assert!(result.is_err());
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn test_check_accepts_valid_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CredentialStore::new(dir.path().join("cf-dns-edit.json"));
    store.save(GOOD_TOKEN).expect("save");
    let connector = FakeCloudflare::default();

    commands::check(&connector, &store)
        .await
        .expect("token is valid");

    assert_eq!(connector.calls(), vec!["verify", "list_zones"]);
    assert!(store.load().is_some());
}

#[test]
fn test_log_file_directory_is_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("cf-dns-edit.log");

    open_log_file(&path).expect("log file should open");
    assert!(path.is_file());
}

#[test]
fn test_log_file_open_failure_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").expect("write");

    assert!(open_log_file(&blocker.join("cf-dns-edit.log")).is_err());
}

#[test]
fn test_env_file_fills_unset_variables_only() {
    let unset = "CF_DNS_EDIT_DOTENV_TEST_TOKEN";
    let preset = "CF_DNS_EDIT_DOTENV_TEST_PRESET";
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(".env");
    std::fs::write(&path, format!("{unset}=from-file\n{preset}=from-file\n")).expect("write");

    std::env::remove_var(unset);
    std::env::set_var(preset, "from-shell");
    assert_eq!(load_env_file(Some(&path)), Some(path.clone()));

    assert_eq!(std::env::var(unset).as_deref(), Ok("from-file"));
    assert_eq!(std::env::var(preset).as_deref(), Ok("from-shell"));
    std::env::remove_var(unset);
    std::env::remove_var(preset);
}

#[test]
fn test_missing_env_file_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert_eq!(load_env_file(Some(&dir.path().join(".env"))), None);
}
