//! Alias-to-connection resolution.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::{ConnectionSettings, DataAccessConfig, normalize_alias};
use crate::error::DataAccessError;
use crate::pool::{DbConnection, ProviderPool};
use crate::types::Provider;
use crate::uow::UnitOfWork;

/// Hands out connections by alias.
///
/// Each alias gets its pool the first time it is opened; the pool then lives as
/// long as the factory. Cloning pools is cheap, so the cache lock is only held
/// for lookups and inserts, never while a connection is in use.
#[derive(Debug)]
pub struct ConnectionFactory {
    config: RwLock<DataAccessConfig>,
    pools: RwLock<HashMap<String, ProviderPool>>,
}

impl ConnectionFactory {
    /// Aliases in `config` may use any case; they are normalized here.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if `config` does not validate.
    pub fn new(config: DataAccessConfig) -> Result<Self, DataAccessError> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(config.normalized()),
            pools: RwLock::new(HashMap::new()),
        })
    }

    /// Check out a connection for `alias`.
    ///
    /// # Errors
    /// Returns `DataAccessError::UnknownAlias` for an unconfigured alias,
    /// `DataAccessError::Unimplemented` if its provider is not compiled in, or
    /// the pool's connect error.
    pub async fn open(&self, alias: &str) -> Result<DbConnection, DataAccessError> {
        let pool = self.pool_for(alias).await?;
        pool.get_connection().await
    }

    /// Check out a connection for the configured default alias.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` when no default alias is set,
    /// otherwise as [`open`](Self::open).
    pub async fn open_default(&self) -> Result<DbConnection, DataAccessError> {
        let alias = self.config.read().await.default_alias.clone().ok_or_else(|| {
            DataAccessError::ConfigError("no default alias configured".into())
        })?;
        self.open(&alias).await
    }

    /// Check out a connection for `alias` and start a unit of work on it.
    ///
    /// # Errors
    /// As [`open`](Self::open), or the error from starting the transaction.
    pub async fn begin(&self, alias: &str) -> Result<UnitOfWork, DataAccessError> {
        UnitOfWork::begin(self.open(alias).await?).await
    }

    /// Add or replace an alias. Replacing drops the cached pool; connections
    /// already checked out from it stay usable until returned.
    ///
    /// # Errors
    /// Returns `DataAccessError::ConfigError` if the settings do not validate.
    pub async fn register(
        &self,
        alias: &str,
        settings: ConnectionSettings,
    ) -> Result<(), DataAccessError> {
        let key = normalize_alias(alias);
        let mut config = self.config.write().await;
        let candidate = config.clone().with_connection(&key, settings);
        candidate.validate()?;
        *config = candidate;
        if self.pools.write().await.remove(&key).is_some() {
            info!(alias = %key, "alias re-registered; cached pool dropped");
        }
        Ok(())
    }

    /// Configured aliases, sorted.
    pub async fn aliases(&self) -> Vec<String> {
        self.config.read().await.connections.keys().cloned().collect()
    }

    /// Provider configured for `alias`.
    ///
    /// # Errors
    /// Returns `DataAccessError::UnknownAlias` for an unconfigured alias.
    pub async fn provider(&self, alias: &str) -> Result<Provider, DataAccessError> {
        self.settings(alias).await.map(|s| s.provider)
    }

    pub async fn contains(&self, alias: &str) -> bool {
        self.config.read().await.get(alias).is_some()
    }

    async fn settings(&self, alias: &str) -> Result<ConnectionSettings, DataAccessError> {
        self.config
            .read()
            .await
            .get(alias)
            .cloned()
            .ok_or_else(|| DataAccessError::UnknownAlias(alias.to_string()))
    }

    async fn pool_for(&self, alias: &str) -> Result<ProviderPool, DataAccessError> {
        let key = normalize_alias(alias);
        if let Some(pool) = self.pools.read().await.get(&key) {
            return Ok(pool.clone());
        }

        let settings = self.settings(&key).await?;
        if !settings.provider.is_enabled() {
            return Err(DataAccessError::Unimplemented(format!(
                "alias '{key}' uses provider '{}' which is not enabled in this build",
                settings.provider
            )));
        }

        // built outside the lock; a racing build for the same alias loses to the first insert
        let built = ProviderPool::build(&settings).await?;
        let mut pools = self.pools.write().await;
        let pool = match pools.entry(key.clone()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                info!(
                    alias = %key,
                    provider = %settings.provider,
                    max_size = settings.max_pool_size_or_default(),
                    "connection pool created"
                );
                slot.insert(built).clone()
            }
        };
        Ok(pool)
    }
}
