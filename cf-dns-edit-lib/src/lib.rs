//! cf-dns-edit library - Cloudflare DNS record editing
//!
//! The domain logic behind the `cf-dns-edit` terminal editor: token storage,
//! access to the Cloudflare API and the screen-by-screen state machine the
//! front-end drives.
//!
//! # Modules
//!
//! - [`api`]: Cloudflare implementation of the gateway
//! - [`credentials`]: API token lookup and persistence
//! - [`error`]: Error types for cf-dns-edit operations
//! - [`gateway`]: The `DnsGateway` contract and pagination
//! - [`navigation`]: Screen stack and user actions
//! - [`record`]: DNS records, TTLs and editable drafts
//! - [`zone`]: Domains in the account
//!
//! # Example
//!
//! ```ignore
//! use cf_dns_edit_lib::{CloudflareConnector, CredentialStore, Navigator};
//!
//! let store = CredentialStore::from_default_location()?;
//! let mut nav = Navigator::new(CloudflareConnector::default(), store);
//! nav.start().await?;
//! nav.select_domain(0).await?;
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod helpers;
pub mod navigation;
pub mod record;
pub mod zone;

// Re-export commonly used types at the crate root
pub use api::{CloudflareConnector, CloudflareGateway};
pub use credentials::{CredentialStore, StoredToken, TokenSource};
pub use error::CfDnsError;
pub use gateway::{Connect, DnsGateway};
pub use helpers::{TOKEN_ENV_VAR, TOKEN_URL};
pub use navigation::{AddRecordForm, Navigator, Notice, NoticeLevel, Screen, Session};
pub use record::{Record, RecordDraft, RecordField, RecordType, Ttl};
pub use zone::Domain;
