//! Zones (domains) in a Cloudflare account.

#![forbid(unsafe_code)]

use std::fmt;

/// A domain managed by Cloudflare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Cloudflare zone identifier.
    pub id: String,
    /// Domain name, e.g. `example.com`.
    pub name: String,
}

impl Domain {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
