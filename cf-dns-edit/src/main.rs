//! cf-dns-edit - Cloudflare DNS records in the terminal
//!
//! Starts the interactive editor, or with `--check` verifies the stored API
//! token and exits.

#![forbid(unsafe_code)]

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use cf_dns_edit_lib::{CloudflareConnector, CredentialStore, Navigator, TOKEN_ENV_VAR};
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::Cli;

mod cli;
mod commands;
mod tui;

#[cfg(test)]
mod tests;

/// File name of the interactive session log, kept next to the config file.
const LOG_FILE_NAME: &str = "cf-dns-edit.log";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    if cli.version {
        println!("{}", cli::version_line());
        return Ok(());
    }

    let env_file = load_env_file(None);
    let store = credential_store(cli.config.as_deref())?;
    let connector = CloudflareConnector::default();

    if cli.check {
        init_tracing(None);
        debug!("CLI args: {cli:?}");
        log_env_file(env_file.as_deref());
        return commands::check(&connector, &store).await;
    }

    init_tracing(Some(&log_path(&store)));
    debug!("CLI args: {cli:?}");
    log_env_file(env_file.as_deref());
    debug!("Config file: {}", store.path().display());

    let app = tui::App::new(Navigator::new(connector, store));
    tui::run(app).await
}

/// Builds the credential store, honouring `--config`.
fn credential_store(config: Option<&Path>) -> Result<CredentialStore> {
    let store = match config {
        Some(path) => CredentialStore::new(path).with_env_var(TOKEN_ENV_VAR),
        None => CredentialStore::from_default_location()?,
    };
    Ok(store)
}

/// Loads variables from a `.env` file. Variables already set are kept.
///
/// Without a path, `.env` is searched for from the current directory up.
fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

fn log_env_file(path: Option<&Path>) {
    if let Some(path) = path {
        debug!("Loaded environment from {}", path.display());
    }
}

fn log_path(store: &CredentialStore) -> PathBuf {
    store.path().with_file_name(LOG_FILE_NAME)
}

/// Initializes the tracing subscriber for logging.
///
/// With a path, events are appended to that file so they stay off the
/// terminal UI. Without one they go to stderr.
fn init_tracing(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return;
    };

    match open_log_file(path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            eprintln!("Logging disabled, cannot open {}: {e}", path.display());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
}

/// Opens `path` for appending, creating it and its directory if needed.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
