//! Cloudflare implementation of [`DnsGateway`].
//!
//! Token verification and zone listing go through the `cloudflare` client.
//! DNS record endpoints are called over plain HTTP because the record model
//! needs the `comment` field and must accept record types the `cloudflare`
//! crate's `DnsContent` enum does not know.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use cloudflare::{
    endpoints::{
        account::user::GetUserTokenStatus,
        zones::zone::{ListZones, ListZonesParams},
    },
    framework::{
        auth::Credentials,
        client::{async_api, ClientConfig},
        response::ApiFailure,
        Environment,
    },
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::CfDnsError,
    gateway::{collect_pages, Connect, DnsGateway, Page},
    helpers::{CF_API_BASE, RECORDS_PER_PAGE, ZONES_PER_PAGE},
    record::{Record, RecordDraft, RecordType, Ttl},
    zone::Domain,
};

/// Builds [`CloudflareGateway`]s.
#[derive(Debug, Clone)]
pub struct CloudflareConnector {
    base_url: String,
}

impl Default for CloudflareConnector {
    fn default() -> Self {
        Self {
            base_url: CF_API_BASE.to_string(),
        }
    }
}

impl CloudflareConnector {
    /// Sends every request to `base_url` instead of the public API.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Connect for CloudflareConnector {
    type Gateway = CloudflareGateway;

    fn connect(&self, token: &str) -> Result<Self::Gateway, CfDnsError> {
        CloudflareGateway::new(token, &self.base_url)
    }
}

/// Authenticated access to one Cloudflare account.
pub struct CloudflareGateway {
    client: async_api::Client,
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl CloudflareGateway {
    /// Creates a gateway for `token`. Nothing is sent until the first call.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL or either HTTP client
    /// cannot be created.
    pub fn new(token: &str, base_url: &str) -> Result<Self, CfDnsError> {
        let base_url = base_url.trim_end_matches('/');
        reqwest::Url::parse(base_url)
            .map_err(|e| CfDnsError::Config(format!("invalid API base URL {base_url}: {e}")))?;

        // Endpoint paths are joined onto the base, which needs the trailing slash.
        let client = async_api::Client::new(
            Credentials::UserAuthToken {
                token: token.to_string(),
            },
            ClientConfig::default(),
            Environment::Custom(format!("{base_url}/")),
        )
        .map_err(|e| CfDnsError::Transport(format!("failed to create Cloudflare client: {e:?}")))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("cf-dns-edit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            http,
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{zone_id}/dns_records", self.base_url)
    }

    fn record_url(&self, zone_id: &str, record_id: &str) -> String {
        format!("{}/{record_id}", self.records_url(zone_id))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, CfDnsError> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Cloudflare responded with {status}");

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            status_error(
                status,
                format!("unexpected response from Cloudflare ({status}): {e}"),
            )
        })?;

        if !envelope.success || !status.is_success() {
            return Err(status_error(status, envelope.describe_errors(status)));
        }

        Ok(envelope)
    }

    async fn write_record(
        &self,
        request: RequestBuilder,
        zone_id: &str,
        draft: &RecordDraft,
    ) -> Result<Record, CfDnsError> {
        draft.validate()?;
        let envelope: Envelope<WireRecord> =
            self.send(request.json(&RecordBody::from(draft))).await?;
        envelope
            .into_result()
            .map(|record| record.into_record(zone_id))
    }
}

#[async_trait]
impl DnsGateway for CloudflareGateway {
    async fn verify(&self) -> Result<(), CfDnsError> {
        let response = self
            .client
            .request(&GetUserTokenStatus {})
            .await
            .map_err(classify_api_failure)?;

        let status = response.result.status;
        if status == "active" {
            info!("API token verified");
            Ok(())
        } else {
            Err(CfDnsError::Auth(format!("token is {status}")))
        }
    }

    async fn list_zones(&self) -> Result<Vec<Domain>, CfDnsError> {
        let client = &self.client;
        collect_pages(|page| async move {
            let response = client
                .request(&ListZones {
                    params: ListZonesParams {
                        page: Some(page),
                        per_page: Some(ZONES_PER_PAGE),
                        ..Default::default()
                    },
                })
                .await
                .map_err(classify_api_failure)?;

            Ok(Page {
                total_pages: total_pages(response.result_info.as_ref()),
                items: response
                    .result
                    .into_iter()
                    .map(|zone| Domain::new(zone.id, zone.name))
                    .collect(),
            })
        })
        .await
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, CfDnsError> {
        let url = self.records_url(zone_id);
        collect_pages(|page| {
            let request = self
                .http
                .get(&url)
                .query(&[("page", page), ("per_page", RECORDS_PER_PAGE)]);
            async move {
                let envelope: Envelope<Vec<WireRecord>> = self.send(request).await?;
                let total_pages = envelope.result_info.as_ref().map_or(1, |info| info.total_pages);
                Ok(Page {
                    total_pages,
                    items: envelope
                        .into_result()?
                        .into_iter()
                        .map(|record| record.into_record(zone_id))
                        .collect(),
                })
            }
        })
        .await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        draft: &RecordDraft,
    ) -> Result<Record, CfDnsError> {
        info!("Creating {} record {}", draft.record_type, draft.name);
        let request = self.http.post(self.records_url(zone_id));
        self.write_record(request, zone_id, draft).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        draft: &RecordDraft,
    ) -> Result<Record, CfDnsError> {
        info!("Updating record {record_id} ({})", draft.name);
        let request = self.http.put(self.record_url(zone_id, record_id));
        self.write_record(request, zone_id, draft).await
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), CfDnsError> {
        info!("Deleting record {record_id}");
        let request = self.http.delete(self.record_url(zone_id, record_id));
        self.send::<Value>(request).await.map(|_| ())
    }
}

/// Standard Cloudflare response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<T, CfDnsError> {
        self.result.ok_or_else(|| {
            CfDnsError::Transport("Cloudflare response did not contain a result".to_string())
        })
    }

    fn describe_errors(&self, status: StatusCode) -> String {
        if self.errors.is_empty() {
            return format!("request failed with {status}");
        }
        self.errors
            .iter()
            .map(|error| format!("{} (code {})", error.message, error.code))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

/// A DNS record as serialized by the Cloudflare API.
#[derive(Debug, Deserialize)]
struct WireRecord {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    proxied: bool,
    #[serde(default)]
    comment: Option<String>,
    ttl: u32,
}

impl WireRecord {
    fn into_record(self, zone_id: &str) -> Record {
        Record {
            id: self.id,
            zone_id: zone_id.to_string(),
            record_type: RecordType::from(self.record_type.as_str()),
            name: self.name,
            content: self.content,
            proxied: self.proxied,
            comment: self.comment.filter(|comment| !comment.is_empty()),
            ttl: Ttl::new(self.ttl),
        }
    }
}

/// Body of create and update requests. Always the whole record.
#[derive(Debug, Serialize)]
struct RecordBody<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    proxied: bool,
    ttl: u32,
    comment: Option<&'a str>,
}

impl<'a> From<&'a RecordDraft> for RecordBody<'a> {
    fn from(draft: &'a RecordDraft) -> Self {
        Self {
            record_type: draft.record_type.as_str(),
            name: &draft.name,
            content: &draft.content,
            proxied: draft.proxied,
            ttl: draft.ttl.seconds(),
            comment: draft.comment.as_deref(),
        }
    }
}

const fn is_auth_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

fn status_error(status: StatusCode, message: String) -> CfDnsError {
    if is_auth_status(status.as_u16()) {
        CfDnsError::Auth(message)
    } else {
        CfDnsError::Transport(message)
    }
}

fn classify_api_failure(failure: ApiFailure) -> CfDnsError {
    match &failure {
        ApiFailure::Error(status, _) if is_auth_status(status.as_u16()) => {
            CfDnsError::Auth(failure.to_string())
        }
        _ => CfDnsError::Cloudflare(failure),
    }
}

fn total_pages(result_info: Option<&Value>) -> u32 {
    result_info
        .and_then(|info| info.get("total_pages"))
        .and_then(Value::as_u64)
        .and_then(|pages| u32::try_from(pages).ok())
        .unwrap_or(1)
}
