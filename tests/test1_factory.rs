#![cfg(feature = "sqlite")]

use sql_access::prelude::*;
use tempfile::TempDir;

fn sqlite_config(dir: &TempDir) -> DataAccessConfig {
    let path = dir.path().join("factory.db");
    DataAccessConfig::new()
        .with_connection(
            "Main",
            ConnectionSettings::new(Provider::Sqlite, path.to_string_lossy()).with_max_pool_size(2),
        )
        .with_default_alias("main")
}

async fn table_exists(conn: &mut DbConnection, name: &str) -> Result<bool, DataAccessError> {
    let n: Option<i64> = execute_scalar(
        conn,
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        &[name.into()],
    )
    .await?;
    Ok(n == Some(1))
}

#[test]
fn test1_open_by_alias_is_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let factory = ConnectionFactory::new(sqlite_config(&dir))?;
        assert!(factory.contains("MAIN").await);
        assert!(!factory.contains("other").await);
        assert_eq!(factory.provider("Main").await?, Provider::Sqlite);
        assert_eq!(factory.aliases().await, vec!["main".to_string()]);

        let mut conn = factory.open("mAiN").await?;
        assert_eq!(conn.provider(), Provider::Sqlite);
        let two: Option<i64> = execute_scalar(&mut conn, "SELECT 1 + 1", &[]).await?;
        assert_eq!(two, Some(2));

        let mut default_conn = factory.open_default().await?;
        default_conn
            .execute_batch("CREATE TABLE IF NOT EXISTS t (id INTEGER PRIMARY KEY);")
            .await?;
        // both aliases share the same file through the cached pool
        assert!(table_exists(&mut conn, "t").await?);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test1_struct_literal_config_with_mixed_case_alias() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("literal.db");
    let mut connections = std::collections::BTreeMap::new();
    connections.insert(
        "Main".to_string(),
        ConnectionSettings::new(Provider::Sqlite, path.to_string_lossy()),
    );
    let config = DataAccessConfig {
        default_alias: Some("Main".to_string()),
        connections,
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let factory = ConnectionFactory::new(config)?;
        assert_eq!(factory.aliases().await, vec!["main".to_string()]);
        let mut conn = factory.open("Main").await?;
        assert_eq!(conn.provider(), Provider::Sqlite);
        let mut default_conn = factory.open_default().await?;
        let one: Option<i64> = execute_scalar(&mut default_conn, "SELECT 1", &[]).await?;
        assert_eq!(one, Some(1));

        let mut colliding = std::collections::BTreeMap::new();
        colliding.insert(
            "A".to_string(),
            ConnectionSettings::new(Provider::Sqlite, "a.db"),
        );
        colliding.insert(
            "a".to_string(),
            ConnectionSettings::new(Provider::Sqlite, "b.db"),
        );
        let err = ConnectionFactory::new(DataAccessConfig {
            default_alias: None,
            connections: colliding,
        })
        .unwrap_err();
        assert!(matches!(err, DataAccessError::ConfigError(_)));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test1_unknown_alias_and_missing_default() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let factory = ConnectionFactory::new(sqlite_config(&dir))?;
        let err = factory.open("nope").await.unwrap_err();
        assert!(matches!(err, DataAccessError::UnknownAlias(ref a) if a == "nope"));
        assert!(matches!(
            factory.provider("nope").await,
            Err(DataAccessError::UnknownAlias(_))
        ));

        let path = dir.path().join("nodefault.db");
        let no_default = ConnectionFactory::new(DataAccessConfig::new().with_connection(
            "x",
            ConnectionSettings::new(Provider::Sqlite, path.to_string_lossy()),
        ))?;
        assert!(matches!(
            no_default.open_default().await,
            Err(DataAccessError::ConfigError(_))
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test1_register_replaces_cached_pool() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let first = dir.path().join("first.db");
    let second = dir.path().join("second.db");
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let factory = ConnectionFactory::new(sqlite_config(&dir))?;
        factory
            .register(
                "reports",
                ConnectionSettings::new(Provider::Sqlite, first.to_string_lossy()),
            )
            .await?;
        {
            let mut conn = factory.open("reports").await?;
            conn.execute_batch("CREATE TABLE only_in_first (id INTEGER);")
                .await?;
            assert!(table_exists(&mut conn, "only_in_first").await?);
        }

        factory
            .register(
                "REPORTS",
                ConnectionSettings::new(Provider::Sqlite, second.to_string_lossy()),
            )
            .await?;
        let mut conn = factory.open("reports").await?;
        assert!(!table_exists(&mut conn, "only_in_first").await?);
        assert_eq!(factory.aliases().await, vec!["main", "reports"]);

        let bad = factory
            .register("broken", ConnectionSettings::new(Provider::Sqlite, ""))
            .await;
        assert!(matches!(bad, Err(DataAccessError::ConfigError(_))));
        assert!(!factory.contains("broken").await);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test1_factory_from_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("from_file.db");
    let json = serde_json::json!({
        "default_alias": "Local",
        "connections": {
            "Local": { "provider": "sqlite", "connection_string": db_path.to_string_lossy() }
        }
    });
    let cfg_path = dir.path().join("sql_access.json");
    std::fs::write(&cfg_path, json.to_string())?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let config = DataAccessConfig::from_file(&cfg_path)?;
        let factory = ConnectionFactory::new(config)?;
        let mut conn = factory.open_default().await?;
        let one: Option<i64> = execute_scalar(&mut conn, "SELECT 1", &[]).await?;
        assert_eq!(one, Some(1));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    assert!(DataAccessConfig::from_file(dir.path().join("missing.json")).is_err());
    Ok(())
}

#[cfg(not(feature = "mssql"))]
#[test]
fn test1_disabled_provider_is_unimplemented() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let factory = ConnectionFactory::new(sqlite_config(&dir))?;
        factory
            .register(
                "orders",
                ConnectionSettings::new(Provider::Mssql, "Server=tcp:localhost,1433"),
            )
            .await?;
        assert!(matches!(
            factory.open("orders").await,
            Err(DataAccessError::Unimplemented(_))
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test1_raw_sqlite_access() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let factory = ConnectionFactory::new(sqlite_config(&dir))?;
        let mut conn = factory.open("main").await?;
        let (autocommit, fk): (bool, i64) = conn
            .with_blocking_sqlite(|raw| {
                let fk: i64 = raw.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?;
                Ok((raw.is_autocommit(), fk))
            })
            .await?;
        assert!(autocommit);
        assert_eq!(fk, 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
