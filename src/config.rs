//! Alias-keyed connection configuration.
//!
//! A configuration document maps connection aliases to a provider and a
//! provider-native connection string:
//!
//! ```json
//! {
//!   "default_alias": "orders",
//!   "connections": {
//!     "orders":  { "provider": "mssql",  "connection_string": "Server=tcp:db1,1433;Database=orders;User Id=app;Password=secret;TrustServerCertificate=true" },
//!     "legacy":  { "provider": "sybase", "connection_string": "Driver={FreeTDS};Server=ase1;Port=5000;Database=legacy;UID=app;PWD=secret" },
//!     "scratch": { "provider": "sqlite", "connection_string": "/tmp/scratch.db" }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DataAccessError;
use crate::types::Provider;

pub const DEFAULT_MAX_POOL_SIZE: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Prefix of the environment variables that override a connection string.
pub const ENV_PREFIX: &str = "SQL_ACCESS_";

/// Settings for a single alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    pub provider: Provider,
    pub connection_string: String,
    #[serde(default)]
    pub max_pool_size: Option<u32>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl ConnectionSettings {
    #[must_use]
    pub fn new(provider: Provider, connection_string: impl Into<String>) -> Self {
        Self {
            provider,
            connection_string: connection_string.into(),
            max_pool_size: None,
            connect_timeout_secs: None,
        }
    }

    #[must_use]
    pub fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = Some(max_pool_size);
        self
    }

    #[must_use]
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn max_pool_size_or_default(&self) -> u32 {
        self.max_pool_size.unwrap_or(DEFAULT_MAX_POOL_SIZE)
    }

    #[must_use]
    pub fn connect_timeout_or_default(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    fn validate(&self, alias: &str) -> Result<(), DataAccessError> {
        if self.connection_string.trim().is_empty() {
            return Err(DataAccessError::ConfigError(format!(
                "alias '{alias}' has an empty connection string"
            )));
        }
        if self.max_pool_size == Some(0) {
            return Err(DataAccessError::ConfigError(format!(
                "alias '{alias}': max_pool_size must be greater than 0"
            )));
        }
        Ok(())
    }
}

/// All configured aliases plus the optional default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAccessConfig {
    #[serde(default)]
    pub default_alias: Option<String>,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionSettings>,
}

/// Aliases compare case-insensitively.
#[must_use]
pub fn normalize_alias(alias: &str) -> String {
    alias.trim().to_lowercase()
}

fn env_key(alias: &str) -> String {
    format!(
        "{ENV_PREFIX}{}_CONNECTION",
        alias.to_uppercase().replace(['-', '.', ' '], "_")
    )
}

impl DataAccessConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an alias.
    #[must_use]
    pub fn with_connection(mut self, alias: &str, settings: ConnectionSettings) -> Self {
        self.connections.insert(normalize_alias(alias), settings);
        self
    }

    #[must_use]
    pub fn with_default_alias(mut self, alias: &str) -> Self {
        self.default_alias = Some(normalize_alias(alias));
        self
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, DataAccessError> {
        let parsed: DataAccessConfig = serde_json::from_str(json)
            .map_err(|e| DataAccessError::ConfigError(format!("invalid configuration: {e}")))?;
        parsed.validate()?;
        Ok(parsed.normalized())
    }

    /// Read a JSON document from disk.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataAccessError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DataAccessError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Replace connection strings from `SQL_ACCESS_<ALIAS>_CONNECTION` variables.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for (alias, settings) in &mut self.connections {
            if let Some(value) = lookup(&env_key(alias)) {
                tracing::debug!(alias = %alias, "connection string overridden from environment");
                settings.connection_string = value;
            }
        }
        self
    }

    /// Lowercase every alias key and the default alias.
    pub(crate) fn normalized(self) -> Self {
        Self {
            default_alias: self.default_alias.as_deref().map(normalize_alias),
            connections: self
                .connections
                .into_iter()
                .map(|(alias, settings)| (normalize_alias(&alias), settings))
                .collect(),
        }
    }

    /// Aliases are checked as they compare, so `"Main"` and `"main"` in one
    /// document are a collision.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` describing the first problem found.
    pub fn validate(&self) -> Result<(), DataAccessError> {
        if self.connections.is_empty() {
            return Err(DataAccessError::ConfigError(
                "no connections configured".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for (alias, settings) in &self.connections {
            let key = normalize_alias(alias);
            if key.is_empty() {
                return Err(DataAccessError::ConfigError(
                    "connection alias must not be empty".to_string(),
                ));
            }
            if !seen.insert(key.clone()) {
                return Err(DataAccessError::ConfigError(format!(
                    "alias '{alias}' collides with another alias that differs only by case"
                )));
            }
            settings.validate(&key)?;
        }
        if let Some(default) = &self.default_alias
            && !seen.contains(&normalize_alias(default))
        {
            return Err(DataAccessError::ConfigError(format!(
                "default alias '{default}' is not configured"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&ConnectionSettings> {
        self.connections.get(&normalize_alias(alias))
    }
}
