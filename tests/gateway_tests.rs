use sqlpilot::db::{CellValue, Gateway, PlanOutcome, TableSnapshot};
use sqlpilot::error::SqlPilotError;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "sqlpilot-gateway-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    path
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

#[tokio::test]
async fn bootstrap_seeds_once_and_is_idempotent() {
    let db_path = temp_db_path("bootstrap");
    let gateway = Gateway::new(&db_path);

    assert!(gateway.bootstrap().await.expect("first bootstrap"));
    assert!(db_path.exists());
    assert!(!gateway.bootstrap().await.expect("second bootstrap"));

    let users = gateway
        .run_query("SELECT * FROM users ORDER BY id")
        .await
        .expect("query users");
    assert_eq!(users.columns, vec!["id", "name"]);
    assert_eq!(
        users.rows,
        vec![
            vec![CellValue::Integer(1), text("Anna")],
            vec![CellValue::Integer(2), text("Jan")],
            vec![CellValue::Integer(3), text("Ewa")],
        ]
    );

    let orders = gateway
        .run_query("SELECT id, customer_id, total FROM orders ORDER BY id")
        .await
        .expect("query orders");
    assert_eq!(
        orders.rows,
        vec![
            vec![
                CellValue::Integer(1),
                CellValue::Integer(1),
                CellValue::Real(100.0)
            ],
            vec![
                CellValue::Integer(2),
                CellValue::Integer(2),
                CellValue::Real(50.0)
            ],
            vec![
                CellValue::Integer(3),
                CellValue::Integer(1),
                CellValue::Real(75.0)
            ],
        ]
    );

    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn run_query_keeps_columns_for_empty_results_and_propagates_errors() {
    let db_path = temp_db_path("query");
    let gateway = Gateway::new(&db_path);
    gateway.bootstrap().await.expect("bootstrap");

    let empty = gateway
        .run_query("SELECT name FROM users WHERE id = 42")
        .await
        .expect("empty query");
    assert_eq!(empty.columns, vec!["name"]);
    assert!(empty.rows.is_empty());

    let mixed = gateway
        .run_query("SELECT NULL AS n, x'0102' AS b, 1.5 AS r")
        .await
        .expect("mixed query");
    assert_eq!(
        mixed.rows,
        vec![vec![
            CellValue::Null,
            CellValue::Blob(vec![1, 2]),
            CellValue::Real(1.5)
        ]]
    );

    assert!(gateway.run_query("SELECT * FROM missing_table").await.is_err());
    assert!(gateway.run_query("SELEC oops").await.is_err());

    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn explain_plan_soft_fails_on_invalid_sql() {
    let db_path = temp_db_path("explain");
    let gateway = Gateway::new(&db_path);
    gateway.bootstrap().await.expect("bootstrap");

    match gateway
        .explain_plan("SELECT * FROM orders WHERE customer_id = 1")
        .await
    {
        PlanOutcome::Steps(report) => {
            assert!(!report.steps.is_empty());
            assert!(report.to_string().contains("orders"));
        }
        PlanOutcome::Failed(message) => panic!("unexpected EXPLAIN failure: {message}"),
    }

    match gateway.explain_plan("SELECT FROM WHERE").await {
        PlanOutcome::Failed(message) => {
            assert!(message.starts_with("EXPLAIN QUERY PLAN failed: "));
        }
        PlanOutcome::Steps(report) => panic!("expected failure, got {report:?}"),
    }

    assert!(gateway.explain_plan("SELECT * FROM nope").await.is_failed());

    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn replace_table_drops_removed_rows() {
    let db_path = temp_db_path("replace");
    let gateway = Gateway::new(&db_path);
    gateway.bootstrap().await.expect("bootstrap");

    let mut users = gateway
        .run_query("SELECT * FROM users ORDER BY id")
        .await
        .expect("read users");
    users.rows.remove(1);

    gateway
        .replace_table("users", &users)
        .await
        .expect("replace users");

    let after = gateway
        .run_query("SELECT * FROM users ORDER BY id")
        .await
        .expect("read back");
    assert_eq!(after.columns, vec!["id", "name"]);
    assert_eq!(
        after.rows,
        vec![
            vec![CellValue::Integer(1), text("Anna")],
            vec![CellValue::Integer(3), text("Ewa")],
        ]
    );

    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn replace_table_accepts_incompatible_values_and_rejects_ragged_rows() {
    let db_path = temp_db_path("replace-types");
    let gateway = Gateway::new(&db_path);
    gateway.bootstrap().await.expect("bootstrap");

    // A text value in a numeric column is written as-is; the column becomes TEXT.
    let orders = TableSnapshot::new(
        vec!["id".into(), "customer_id".into(), "total".into()],
        vec![
            vec![CellValue::Integer(1), CellValue::Integer(1), text("lots")],
            vec![CellValue::Integer(2), CellValue::Null, CellValue::Real(9.5)],
        ],
    );
    gateway
        .replace_table("orders", &orders)
        .await
        .expect("replace orders");
    let back = gateway
        .run_query("SELECT * FROM orders ORDER BY id")
        .await
        .expect("read orders");
    assert_eq!(back.rows[0][2], text("lots"));
    assert_eq!(back.rows[1][1], CellValue::Null);

    let ragged = TableSnapshot::new(
        vec!["id".into(), "name".into()],
        vec![vec![CellValue::Integer(1)]],
    );
    assert!(gateway.replace_table("users", &ragged).await.is_err());
    let users = gateway
        .run_query("SELECT COUNT(*) AS n FROM users")
        .await
        .expect("count users");
    assert_eq!(users.rows, vec![vec![CellValue::Integer(3)]]);

    fs::remove_file(&db_path).await.unwrap();
}

async fn row_counts(gateway: &Gateway) -> (CellValue, CellValue) {
    let counts = gateway
        .run_query("SELECT (SELECT COUNT(*) FROM users), (SELECT COUNT(*) FROM orders)")
        .await
        .expect("count rows");
    (counts.rows[0][0].clone(), counts.rows[0][1].clone())
}

#[tokio::test]
async fn explain_never_runs_trailing_statements() {
    let db_path = temp_db_path("explain-multi");
    let gateway = Gateway::new(&db_path);
    gateway.bootstrap().await.expect("bootstrap");
    let seeded = (CellValue::Integer(3), CellValue::Integer(3));

    for sql in [
        "SELECT 1; DELETE FROM orders",
        "SELECT * FROM users; DROP TABLE users",
        "SELECT 1; DELETE FROM orders;",
    ] {
        match gateway.explain_plan(sql).await {
            PlanOutcome::Failed(message) => {
                assert!(message.starts_with("EXPLAIN QUERY PLAN failed: "), "{message}");
            }
            PlanOutcome::Steps(report) => panic!("{sql:?} produced a plan: {report:?}"),
        }
        assert_eq!(row_counts(&gateway).await, seeded, "after {sql:?}");
    }

    // One trailing terminator is fine.
    assert!(!gateway.explain_plan("SELECT * FROM orders;").await.is_failed());
    assert!(!gateway.explain_plan("DELETE FROM orders").await.is_failed());
    assert_eq!(row_counts(&gateway).await, seeded);

    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn run_query_is_read_only() {
    let db_path = temp_db_path("query-read-only");
    let gateway = Gateway::new(&db_path);
    gateway.bootstrap().await.expect("bootstrap");
    let seeded = (CellValue::Integer(3), CellValue::Integer(3));

    assert!(gateway.run_query("DELETE FROM orders").await.is_err());
    assert!(gateway.run_query("DROP TABLE users").await.is_err());
    assert!(matches!(
        gateway.run_query("SELECT 1; DELETE FROM orders").await,
        Err(SqlPilotError::MultipleStatements)
    ));
    assert_eq!(row_counts(&gateway).await, seeded);

    let one = gateway
        .run_query("SELECT name FROM users WHERE id = 1;")
        .await
        .expect("terminated query");
    assert_eq!(one.rows, vec![vec![text("Anna")]]);

    fs::remove_file(&db_path).await.unwrap();
}
