//! Non-interactive command handlers for the cf-dns-edit CLI.

#![forbid(unsafe_code)]

use cf_dns_edit_lib::{
    helpers::pluralize, Connect, CredentialStore, DnsGateway, TokenSource, TOKEN_ENV_VAR,
};
use color_eyre::eyre::{bail, Result};
use tracing::{info, warn};

/// Verifies the stored API token and reports how many domains it can see.
///
/// A token Cloudflare rejects is removed from the config file and the
/// command fails, so the process exits with status 1.
pub async fn check<C: Connect>(connector: &C, store: &CredentialStore) -> Result<()> {
    let Some(stored) = store.load() else {
        bail!(
            "No API token found. Set {TOKEN_ENV_VAR} or run cf-dns-edit to log in."
        );
    };
    info!("Checking API token from {:?}", stored.source);

    let gateway = connector.connect(&stored.token)?;
    if let Err(e) = gateway.verify().await {
        if e.is_auth() && stored.source == TokenSource::ConfigFile {
            warn!("Removing rejected API token from {}", store.path().display());
            store.clear()?;
        }
        return Err(e.into());
    }

    let domains = gateway.list_zones().await?;
    println!(
        "API token is valid and can see {}.",
        pluralize(domains.len(), "domain")
    );
    Ok(())
}
