//! CSV directory source tests
//!
//! Tables are written to temporary directories and queried through the
//! engine the same way the CLI does.

use std::fs;
use std::path::Path;

use tabquery::config::EngineConfig;
use tabquery::engine::QueryEngine;
use tabquery::planner::QueryErrorCode;
use tabquery::source::{CsvDirectory, SourceError, TableCatalog, TableProvider};
use tabquery::value::Value;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "products.csv",
        "productID,productName,categoryID,unitPrice,discontinued\n\
         1,Chai,1,18,false\n\
         2,Chang,1,19,false\n\
         3,\"Chef Anton's Gumbo Mix, 36 boxes\",2,21.35,true\n\
         4,Konbu,8,,false\n",
    );
    write(
        dir.path(),
        "categories.csv",
        "categoryID\tcategoryName\n1\tBeverages\n2\tCondiments\n8\tSeafood\n",
    );
    write(dir.path(), "empty.csv", "a,b\n");
    write(dir.path(), "README.md", "not a table");
    fs::create_dir(dir.path().join("nested.csv")).unwrap();
    dir
}

// =============================================================================
// CATALOG
// =============================================================================

/// Test: Only regular `.csv` files are tables, sorted by name.
#[test]
fn test_catalog_lists_csv_files() {
    let dir = fixture();
    let source = CsvDirectory::new(dir.path());
    assert_eq!(source.table_names(), vec!["categories", "empty", "products"]);
}

/// Test: A missing directory has no tables.
#[test]
fn test_catalog_missing_directory() {
    let source = CsvDirectory::new("/nonexistent/tabquery-data");
    assert!(source.table_names().is_empty());
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Test: Cells are typed, quoted fields keep their commas.
#[tokio::test]
async fn test_fetch_typed_rows() {
    let dir = fixture();
    let rows = CsvDirectory::new(dir.path()).fetch_table("products").await.unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].get("unitPrice"), Some(&Value::Number(18.0)));
    assert_eq!(rows[0].get("discontinued"), Some(&Value::Boolean(false)));
    assert_eq!(
        rows[2].get("productName"),
        Some(&Value::from("Chef Anton's Gumbo Mix, 36 boxes"))
    );
    assert_eq!(rows[3].get("unitPrice"), Some(&Value::Null));
}

/// Test: Tab-delimited files are detected.
#[tokio::test]
async fn test_fetch_detects_tabs() {
    let dir = fixture();
    let rows = CsvDirectory::new(dir.path()).fetch_table("categories").await.unwrap();
    assert_eq!(rows[2].get("categoryName"), Some(&Value::from("Seafood")));
}

/// Test: Missing files and unsafe names are unknown tables.
#[tokio::test]
async fn test_fetch_unknown_table() {
    let dir = fixture();
    let source = CsvDirectory::new(dir.path());

    assert!(source.fetch_table("missing").await.unwrap_err().is_unknown_table());
    assert!(source.fetch_table("../products").await.unwrap_err().is_unknown_table());
}

/// Test: Rows wider than the header are malformed.
#[tokio::test]
async fn test_fetch_malformed() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.csv", "a,b\n1,2\n1,2,3\n");

    let err = CsvDirectory::new(dir.path()).fetch_table("bad").await.unwrap_err();
    assert!(matches!(err, SourceError::Malformed { line: 3, .. }));
}

// =============================================================================
// ENGINE OVER CSV
// =============================================================================

/// Test: Queries over CSV tables behave like any other source.
#[tokio::test]
async fn test_engine_over_csv() {
    let dir = fixture();
    let engine = QueryEngine::from_source(CsvDirectory::new(dir.path()));

    let rows = engine
        .execute("SELECT productName FROM products WHERE unitPrice > 18.5 ORDER BY unitPrice DESC")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("productName"), Some(&Value::from("Chang")));

    let rows = engine
        .execute("SELECT categoryID, COUNT(*), AVG(unitPrice) FROM products GROUP BY categoryID")
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("AVG(unitPrice)"), Some(&Value::Number(18.5)));
    assert_eq!(rows[2].get("AVG(unitPrice)"), Some(&Value::Null));

    assert_eq!(
        engine.get_schema("products").await,
        vec!["productID", "productName", "categoryID", "unitPrice", "discontinued"]
    );
}

/// Test: Header-only and unreadable tables are not found.
#[tokio::test]
async fn test_engine_empty_and_malformed_tables() {
    let dir = fixture();
    write(dir.path(), "broken.csv", "a\n\"never closed\n");
    let engine = QueryEngine::from_source(CsvDirectory::new(dir.path()));

    let err = engine.execute("empty").await.unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::TableNotFound);

    let err = engine.execute("SELECT * FROM broken").await.unwrap_err();
    assert_eq!(err.code(), QueryErrorCode::TableNotFound);
    assert!(err.message().contains("unterminated"));
}

/// Test: Config builds a source honoring a fixed delimiter.
#[tokio::test]
async fn test_config_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "t.csv", "a;b\n1;x,y\n");

    let mut config = EngineConfig::new(dir.path().to_string_lossy());
    config.delimiter = Some(';');

    let rows = config.csv_source().fetch_table("t").await.unwrap();
    assert_eq!(rows[0].get("b"), Some(&Value::from("x,y")));
}
