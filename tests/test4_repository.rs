#![cfg(feature = "sqlite")]

use sql_access::prelude::*;
use tempfile::TempDir;

#[derive(Debug, Clone, Default, PartialEq)]
struct Product {
    id: i64,
    sku: String,
    price: f64,
    note: Option<String>,
    display: String,
}

sql_access::entity! {
    Product => "products" {
        id: [column_name("product_id"), key, identity],
        sku: [required, max_length(12)],
        price,
        note,
    }
    not_mapped { display }
}

#[derive(Debug, Clone, PartialEq)]
struct OrderLine {
    order_id: i64,
    line_no: i64,
    qty: i64,
}

sql_access::entity! {
    OrderLine => "order_lines" {
        order_id: [key],
        line_no: [key],
        qty,
    }
}

const SCHEMA: &str = "
    CREATE TABLE products (
        product_id INTEGER PRIMARY KEY AUTOINCREMENT,
        sku TEXT NOT NULL,
        price REAL NOT NULL,
        note TEXT
    );
    CREATE TABLE order_lines (
        order_id INTEGER NOT NULL,
        line_no INTEGER NOT NULL,
        qty INTEGER NOT NULL,
        PRIMARY KEY (order_id, line_no)
    );
";

async fn open(dir: &TempDir) -> Result<DbConnection, DataAccessError> {
    let path = dir.path().join("repo.db");
    let factory = ConnectionFactory::new(DataAccessConfig::new().with_connection(
        "shop",
        ConnectionSettings::new(Provider::Sqlite, path.to_string_lossy()),
    ))?;
    let mut conn = factory.open("shop").await?;
    conn.execute_batch(SCHEMA).await?;
    Ok(conn)
}

fn product(sku: &str, price: f64) -> Product {
    Product {
        sku: sku.into(),
        price,
        ..Product::default()
    }
}

#[test]
fn test4_crud_with_identity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = open(&dir).await?;
        let mut repo = Repository::<Product, _>::new(&mut conn)?;

        let first = repo.insert(&product("A-100", 9.5)).await?;
        let second = repo
            .insert(&Product {
                note: Some("fragile".into()),
                ..product("B-200", 20.0)
            })
            .await?;
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
        assert_eq!(repo.count().await?, 2);

        let mut loaded = repo.get(&[2.into()]).await?.expect("row 2 exists");
        assert_eq!(loaded.sku, "B-200");
        assert_eq!(loaded.note.as_deref(), Some("fragile"));
        assert_eq!(loaded.display, "");
        assert!(repo.get(&[99.into()]).await?.is_none());

        let pricey = repo.find("price > {0} ORDER BY sku", &[DbValue::Float(10.0)]).await?;
        assert_eq!(pricey.len(), 1);
        assert_eq!(pricey[0].id, 2);

        loaded.price = 18.25;
        loaded.note = None;
        assert_eq!(repo.update(&loaded).await?, 1);
        let reloaded = repo.get(&[2.into()]).await?.expect("row 2 exists");
        assert_eq!(reloaded.price, 18.25);
        assert_eq!(reloaded.note, None);

        assert!(repo.exists(&[1.into()]).await?);
        assert_eq!(repo.delete(&reloaded).await?, 1);
        assert!(!repo.exists(&[2.into()]).await?);
        assert_eq!(repo.delete_by_key(&[1.into()]).await?, 1);
        assert_eq!(repo.delete_by_key(&[1.into()]).await?, 0);
        assert_eq!(repo.count().await?, 0);
        assert!(repo.get_all().await?.is_empty());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test4_validation_and_key_arity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = open(&dir).await?;
        let mut repo = Repository::<Product, _>::new(&mut conn)?;

        let too_long = repo.insert(&product("SKU-THAT-IS-TOO-LONG", 1.0)).await;
        assert!(matches!(
            too_long,
            Err(DataAccessError::ValidationError { ref column, .. }) if column == "sku"
        ));
        assert_eq!(repo.count().await?, 0);

        assert!(matches!(
            repo.get(&[]).await,
            Err(DataAccessError::ParameterError(_))
        ));
        assert!(matches!(
            repo.delete_by_key(&[1.into(), 2.into()]).await,
            Err(DataAccessError::ParameterError(_))
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test4_composite_keys_without_identity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut conn = open(&dir).await?;
        let mut lines = Repository::<OrderLine, _>::new(&mut conn)?;

        for line_no in 1..=3 {
            let generated = lines
                .insert(&OrderLine {
                    order_id: 7,
                    line_no,
                    qty: line_no * 10,
                })
                .await?;
            assert_eq!(generated, None);
        }

        let line = lines.get(&[7.into(), 2.into()]).await?;
        assert_eq!(
            line,
            Some(OrderLine {
                order_id: 7,
                line_no: 2,
                qty: 20
            })
        );

        let updated = lines
            .update(&OrderLine {
                order_id: 7,
                line_no: 2,
                qty: 5,
            })
            .await?;
        assert_eq!(updated, 1);

        let small = lines.find("qty < {0} ORDER BY line_no", &[DbValue::Int(15)]).await?;
        assert_eq!(
            small.iter().map(|l| l.line_no).collect::<Vec<_>>(),
            [1, 2]
        );
        assert!(matches!(
            lines.exists(&[7.into()]).await,
            Err(DataAccessError::ParameterError(_))
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn test4_metadata_from_macro() {
    let meta = Product::metadata();
    assert_eq!(meta.table, "products");
    assert_eq!(meta.column_name_for("id"), "product_id");
    assert_eq!(
        meta.insert_columns().map(|c| c.column.as_str()).collect::<Vec<_>>(),
        ["sku", "price", "note"]
    );
    assert!(meta.column_for_field("display").is_some_and(|c| c.not_mapped));
    assert_eq!(meta.qualified_table(Provider::Mssql.dialect()), "[products]");

    let p = Product {
        id: 4,
        note: None,
        ..product("X", 1.0)
    };
    assert_eq!(p.key_values(), vec![DbValue::Int(4)]);
    assert_eq!(p.values().len(), 4);

    let line = OrderLine {
        order_id: 1,
        line_no: 2,
        qty: 3,
    };
    assert_eq!(line.key_values(), vec![DbValue::Int(1), DbValue::Int(2)]);
}
