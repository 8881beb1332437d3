//! The seam between the editor and the remote DNS service.
//!
//! [`DnsGateway`] is the contract the navigation controller talks to;
//! [`crate::api::CloudflareGateway`] implements it against the Cloudflare
//! API. [`Connect`] turns a raw token into a gateway so that logging in can be
//! driven without knowing which implementation sits behind it.

#![forbid(unsafe_code)]

use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::CfDnsError,
    record::{Record, RecordDraft},
    zone::Domain,
};

/// Authenticated access to a DNS provider account.
#[async_trait]
pub trait DnsGateway: Send + Sync {
    /// Checks that the token is valid and active.
    async fn verify(&self) -> Result<(), CfDnsError>;

    /// Lists every zone in the account, following pagination to the end.
    async fn list_zones(&self) -> Result<Vec<Domain>, CfDnsError>;

    /// Lists every record of a zone, following pagination to the end.
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, CfDnsError>;

    /// Creates a record and returns it as stored remotely.
    async fn create_record(&self, zone_id: &str, draft: &RecordDraft)
        -> Result<Record, CfDnsError>;

    /// Replaces a record with the full contents of `draft`.
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        draft: &RecordDraft,
    ) -> Result<Record, CfDnsError>;

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), CfDnsError>;
}

/// Builds a gateway from an API token.
pub trait Connect {
    type Gateway: DnsGateway;

    /// Creates an unverified gateway for `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    fn connect(&self, token: &str) -> Result<Self::Gateway, CfDnsError>;
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of pages reported by the server.
    pub total_pages: u32,
}

/// Fetches pages starting at 1 until the server reports no more.
///
/// Items are returned in the order the server produced them. An empty page
/// ends the listing even if the reported page count says otherwise.
///
/// # Errors
///
/// Returns the first error produced by `fetch`; earlier pages are discarded.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, CfDnsError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, CfDnsError>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch(page).await?;
        debug!(
            "Fetched page {page}/{} with {} items",
            batch.total_pages,
            batch.items.len()
        );

        let exhausted = batch.items.is_empty() || page >= batch.total_pages;
        items.extend(batch.items);
        if exhausted {
            return Ok(items);
        }
        page += 1;
    }
}
