#![cfg(feature = "sqlite")]

use sql_access::prelude::*;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: i64,
    name: String,
    age: Option<i64>,
    city_id: i64,
}

impl FromRow for Person {
    fn from_row(row: &DbRow) -> Result<Self, DataAccessError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            age: row.try_get("age")?,
            city_id: row.try_get("city_id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Place {
    id: i64,
    name: String,
}

impl FromRow for Place {
    fn from_row(row: &DbRow) -> Result<Self, DataAccessError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

const SCHEMA: &str = "
    CREATE TABLE countries (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
    CREATE TABLE cities (id INTEGER PRIMARY KEY, name TEXT NOT NULL, country_id INTEGER NOT NULL);
    CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER, city_id INTEGER NOT NULL);
    INSERT INTO countries (id, name) VALUES (1, 'Norway'), (2, 'Chile');
    INSERT INTO cities (id, name, country_id) VALUES (10, 'Bergen', 1), (20, 'Valparaiso', 2);
    INSERT INTO people (id, name, age, city_id) VALUES
        (1, 'Astrid', 34, 10),
        (2, 'Bruno', NULL, 20),
        (3, 'Carmen', 51, 20);
";

async fn seeded(dir: &TempDir) -> Result<DbConnection, DataAccessError> {
    let path = dir.path().join("executor.db");
    let factory = ConnectionFactory::new(DataAccessConfig::new().with_connection(
        "main",
        ConnectionSettings::new(Provider::Sqlite, path.to_string_lossy()),
    ))?;
    let mut conn = factory.open("main").await?;
    conn.execute_batch(SCHEMA).await?;
    Ok(conn)
}

#[test]
fn test2_query_helpers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = seeded(&dir).await?;

        let people: Vec<Person> =
            query(&mut conn, "SELECT * FROM people ORDER BY id", &[]).await?;
        assert_eq!(people.len(), 3);
        assert_eq!(people[1].age, None);
        assert_eq!(people[2].name, "Carmen");

        let first: Option<Person> = query_first(
            &mut conn,
            "SELECT * FROM people WHERE city_id = ?1 ORDER BY id",
            &[DbValue::Int(20)],
        )
        .await?;
        assert_eq!(first.map(|p| p.name).as_deref(), Some("Bruno"));

        let none: Option<Person> =
            query_first(&mut conn, "SELECT * FROM people WHERE id = ?1", &[99.into()]).await?;
        assert!(none.is_none());

        let single: Place =
            query_single(&mut conn, "SELECT id, name FROM cities WHERE id = ?1", &[10.into()])
                .await?;
        assert_eq!(single, Place { id: 10, name: "Bergen".into() });

        let many = query_single::<Place, _>(&mut conn, "SELECT id, name FROM cities", &[]).await;
        assert!(matches!(many, Err(DataAccessError::MappingError(_))));
        let zero =
            query_single::<Place, _>(&mut conn, "SELECT id, name FROM cities WHERE 0", &[]).await;
        assert!(zero.is_err());

        let raw: Vec<DbRow> = query(&mut conn, "SELECT name AS Label FROM countries", &[]).await?;
        assert_eq!(raw[0].get("label").and_then(DbValue::as_text), Some("Norway"));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test2_execute_and_scalars() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = seeded(&dir).await?;

        let touched = execute(
            &mut conn,
            "UPDATE people SET age = age + 1 WHERE age > ?1",
            &[DbValue::Int(30)],
        )
        .await?;
        assert_eq!(touched, 2);

        let total: Option<i64> =
            execute_scalar(&mut conn, "SELECT SUM(age) FROM people", &[]).await?;
        assert_eq!(total, Some(35 + 52));

        let missing: Option<String> =
            execute_scalar(&mut conn, "SELECT name FROM people WHERE id = 42", &[]).await?;
        assert_eq!(missing, None);

        let null_age: Option<Option<i64>> =
            execute_scalar(&mut conn, "SELECT age FROM people WHERE id = 2", &[]).await?;
        assert_eq!(null_age, Some(None));

        let wrong_type = execute_scalar::<i64, _>(&mut conn, "SELECT name FROM people", &[]).await;
        assert!(matches!(wrong_type, Err(DataAccessError::MappingError(_))));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test2_query_multiple_returns_every_result_set() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = seeded(&dir).await?;
        let sets = query_multiple(
            &mut conn,
            "SELECT COUNT(*) AS n FROM people WHERE city_id = ?1;
             UPDATE people SET age = 1 WHERE id = 2;
             SELECT name FROM cities ORDER BY id;",
            &[DbValue::Int(20)],
        )
        .await?;
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].first().and_then(|r| r.get("n")).and_then(DbValue::as_int), Some(2));
        let names: Vec<String> = sets[1]
            .iter()
            .map(|r| r.try_get::<String>("name"))
            .collect::<Result<_, _>>()?;
        assert_eq!(names, ["Bergen", "Valparaiso"]);

        let age: Option<i64> =
            execute_scalar(&mut conn, "SELECT age FROM people WHERE id = 2", &[]).await?;
        assert_eq!(age, Some(1));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test2_interpolated_queries() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = seeded(&dir).await?;

        let found: Vec<Person> = query_interpolated(
            &mut conn,
            "SELECT * FROM people WHERE city_id = {1} AND (age >= {0} OR name = '{0}') ORDER BY id",
            &[DbValue::Int(40), DbValue::Int(20)],
        )
        .await?;
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), [3]);

        let removed = execute_interpolated(
            &mut conn,
            "DELETE FROM people WHERE name = {0} OR name = {0}",
            &["Astrid".into()],
        )
        .await?;
        assert_eq!(removed, 1);

        let err =
            query_interpolated::<Person, _>(&mut conn, "SELECT * FROM people WHERE id = {2}", &[])
                .await
                .unwrap_err();
        assert!(matches!(err, DataAccessError::ParameterError(_)));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test2_multi_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = seeded(&dir).await?;

        let pairs = query_map2(
            &mut conn,
            "SELECT p.id, p.name, p.age, p.city_id, c.id, c.name
             FROM people p JOIN cities c ON c.id = p.city_id
             ORDER BY p.id",
            &[],
            "id",
            |person: Person, city: Place| (person.name, city.name),
        )
        .await?;
        assert_eq!(
            pairs,
            vec![
                ("Astrid".to_string(), "Bergen".to_string()),
                ("Bruno".to_string(), "Valparaiso".to_string()),
                ("Carmen".to_string(), "Valparaiso".to_string()),
            ]
        );

        let triples = query_map3(
            &mut conn,
            "SELECT p.id, p.name, p.age, p.city_id, c.id, c.name, k.id, k.name
             FROM people p
             JOIN cities c ON c.id = p.city_id
             JOIN countries k ON k.id = c.country_id
             WHERE p.id = ?1",
            &[DbValue::Int(3)],
            "ID",
            |person: Person, city: Place, country: Place| {
                format!("{} / {} / {}", person.name, city.name, country.name)
            },
        )
        .await?;
        assert_eq!(triples, ["Carmen / Valparaiso / Chile"]);

        let missing = query_map2(
            &mut conn,
            "SELECT p.id, p.name, p.age, p.city_id FROM people p",
            &[],
            "city_key",
            |person: Person, city: Place| (person, city),
        )
        .await;
        assert!(matches!(missing, Err(DataAccessError::MappingError(_))));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
