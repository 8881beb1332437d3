//! Credential storage for the Cloudflare API token.
//!
//! A token is looked up in an environment variable first and in the per-user
//! JSON config file second. Only the config file is ever written.

#![forbid(unsafe_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_derive::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Map, Value};
use tracing::{debug, info, warn};

use crate::{
    error::CfDnsError,
    helpers::{CONFIG_FILE_NAME, TOKEN_ENV_VAR},
};

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The token environment variable.
    Environment,
    /// The config file.
    ConfigFile,
    /// Typed in at the login prompt.
    Prompt,
}

/// A token found by [`CredentialStore::load`].
#[derive(securefmt::Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    #[sensitive]
    pub token: String,
    pub source: TokenSource,
}

/// On-disk layout of the config file. Keys other than `token` are kept as-is.
#[derive(securefmt::Debug, Clone, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[sensitive]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Reads and writes the API token.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    env_var: Option<String>,
}

impl CredentialStore {
    /// Creates a store backed by the config file at `path`.
    ///
    /// The environment is not consulted until [`Self::with_env_var`] is used.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_var: None,
        }
    }

    /// Creates a store at the default location that also honours
    /// `CLOUDFLARE_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user config directory cannot be determined.
    pub fn from_default_location() -> Result<Self, CfDnsError> {
        Ok(Self::new(Self::default_path()?).with_env_var(TOKEN_ENV_VAR))
    }

    /// Also look for a token in the environment variable `name`.
    #[must_use]
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// `<user config dir>/cf-dns-edit.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, CfDnsError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                CfDnsError::Config("could not determine the user config directory".to_string())
            })
    }

    /// Path of the backing config file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a token, environment first.
    ///
    /// An unreadable or corrupt config file is logged and treated as holding
    /// no token. Blank tokens count as absent.
    pub fn load(&self) -> Option<StoredToken> {
        if let Some(token) = self.env_token() {
            debug!("Using API token from the environment");
            return Some(StoredToken {
                token,
                source: TokenSource::Environment,
            });
        }

        match self.read() {
            Ok(file) => file
                .token
                .filter(|token| !token.trim().is_empty())
                .map(|token| StoredToken {
                    token,
                    source: TokenSource::ConfigFile,
                }),
            Err(e) => {
                warn!("Ignoring config file {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Persists `token`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self, token: &str) -> Result<(), CfDnsError> {
        let mut file = self.read().unwrap_or_else(|e| {
            warn!("Overwriting unreadable config file: {e}");
            ConfigFile::default()
        });
        file.token = Some(token.to_string());
        self.write(&file)?;
        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }

    /// Removes a stored token, keeping any other settings in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be rewritten.
    pub fn clear(&self) -> Result<(), CfDnsError> {
        let Ok(mut file) = self.read() else {
            return Ok(());
        };
        if file.token.take().is_none() {
            return Ok(());
        }
        self.write(&file)?;
        info!("Removed stored API token from {}", self.path.display());
        Ok(())
    }

    fn env_token(&self) -> Option<String> {
        let name = self.env_var.as_deref()?;
        std::env::var(name)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    fn read(&self) -> Result<ConfigFile, CfDnsError> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CfDnsError::Config(format!("failed to read config file: {e}")))?;

        serde_json::from_str(&content)
            .map_err(|e| CfDnsError::Config(format!("failed to parse config: {e}")))
    }

    fn write(&self, file: &ConfigFile) -> Result<(), CfDnsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CfDnsError::Config(format!(
                    "failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        serde::Serialize::serialize(file, &mut serializer)?;
        buf.push(b'\n');

        fs::write(&self.path, buf).map_err(|e| {
            CfDnsError::Config(format!(
                "failed to write config file {}: {e}",
                self.path.display()
            ))
        })
    }
}
