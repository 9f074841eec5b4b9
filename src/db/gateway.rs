use crate::db::models::{CellValue, PlanOutcome, PlanReport, TableSnapshot};
use crate::db::schema::SQLITE_SEED;
use crate::error::SqlPilotError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Executor, Row, Statement, TypeInfo, ValueRef};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Owns the path of the SQLite store. Every operation opens its own connection and closes it
/// before returning; no connection outlives a call.
#[derive(Debug, Clone)]
pub struct Gateway {
    path: PathBuf,
}

impl Gateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create and seed the store if the file does not exist. Returns `true` when it seeded.
    ///
    /// Idempotence is decided by file existence only; an existing file is never inspected.
    pub async fn bootstrap(&self) -> Result<bool, SqlPilotError> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "Database file present; skipping seed");
            return Ok(false);
        }

        self.create_with_seed(SQLITE_SEED).await?;
        info!(path = %self.path.display(), "Database created with seed schema");
        Ok(true)
    }

    /// Create the file and apply `seed`. A failed seed removes the file again, so the next
    /// bootstrap retries instead of skipping an empty store.
    async fn create_with_seed(&self, seed: &str) -> Result<(), SqlPilotError> {
        let mut conn = self.connect(Access::Create).await?;
        let res = apply_seed(&mut conn, seed).await;
        let closed = conn.close().await.map_err(SqlPilotError::from);

        if let Err(e) = res.and(closed) {
            if let Err(rm) = tokio::fs::remove_file(&self.path).await {
                warn!(path = %self.path.display(), error = %rm, "Could not remove unseeded database file");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Execute a read query and materialize every row.
    ///
    /// The connection is read-only and only one statement is accepted (a single trailing `;` is
    /// allowed).
    pub async fn run_query(&self, sql: &str) -> Result<TableSnapshot, SqlPilotError> {
        let sql = single_statement(sql)?;
        let mut conn = self.connect(Access::ReadOnly).await?;
        let res = fetch_snapshot(&mut conn, sql).await;
        conn.close().await?;

        let snapshot = res?;
        debug!(
            columns = snapshot.columns.len(),
            rows = snapshot.rows.len(),
            "Query materialized"
        );
        Ok(snapshot)
    }

    /// Run `EXPLAIN QUERY PLAN` for `sql` on a read-only connection. Any failure, including a
    /// second statement after the first, comes back as `PlanOutcome::Failed`.
    pub async fn explain_plan(&self, sql: &str) -> PlanOutcome {
        match self.try_explain(sql).await {
            Ok(report) => PlanOutcome::Steps(report),
            Err(e) => {
                debug!(error = %e, "EXPLAIN QUERY PLAN failed");
                PlanOutcome::Failed(format!("EXPLAIN QUERY PLAN failed: {e}"))
            }
        }
    }

    async fn try_explain(&self, sql: &str) -> Result<PlanReport, SqlPilotError> {
        let sql = single_statement(sql)?;
        let mut conn = self.connect(Access::ReadOnly).await?;
        let explain = format!("EXPLAIN QUERY PLAN {sql}");
        let res = fetch_snapshot(&mut conn, &explain).await;
        conn.close().await?;
        Ok(PlanReport::from(res?))
    }

    /// Drop `name` and recreate it holding exactly `snapshot`.
    ///
    /// Column types are inferred from the values; the previous definition (keys, declared types)
    /// is not consulted.
    pub async fn replace_table(
        &self,
        name: &str,
        snapshot: &TableSnapshot,
    ) -> Result<(), SqlPilotError> {
        let table = quote_identifier(name)?;
        if snapshot.columns.is_empty() {
            return Err(SqlPilotError::MalformedSnapshot(
                "table needs at least one column".to_string(),
            ));
        }
        if let Some((row, width)) = snapshot.ragged_row() {
            return Err(SqlPilotError::MalformedSnapshot(format!(
                "row {} has {width} values, expected {}",
                row + 1,
                snapshot.columns.len()
            )));
        }
        let columns = snapshot
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Result<Vec<_>, _>>()?;

        let definitions = columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} {}", infer_column_type(snapshot, i)))
            .collect::<Vec<_>>()
            .join(", ");
        let create = format!("CREATE TABLE {table} ({definitions})");
        let insert = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );

        let mut conn = self.connect(Access::ReadWrite).await?;
        let res = write_table(&mut conn, &table, &create, &insert, &snapshot.rows).await;
        conn.close().await?;
        res?;

        info!(
            table = %name,
            columns = snapshot.columns.len(),
            rows = snapshot.rows.len(),
            "Table replaced"
        );
        Ok(())
    }

    async fn connect(&self, access: Access) -> Result<SqliteConnection, SqlPilotError> {
        let opts = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(access == Access::Create)
            .read_only(access == Access::ReadOnly)
            .busy_timeout(Duration::from_secs(5));
        Ok(SqliteConnection::connect_with(&opts).await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    ReadOnly,
    ReadWrite,
    Create,
}

/// `sql` without its trailing `;`, if it holds exactly one statement.
///
/// Semicolons inside string literals, quoted identifiers and comments do not count. After the
/// first top-level `;` only whitespace and comments may follow.
fn single_statement(sql: &str) -> Result<&str, SqlPilotError> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        i = match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => end_of(bytes, i + 1, &[quote]),
            b'[' => end_of(bytes, i + 1, b"]"),
            b'-' if bytes.get(i + 1) == Some(&b'-') => end_of(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => end_of(bytes, i + 2, b"*/"),
            b';' => {
                return if only_trivia(&sql[i + 1..]) {
                    Ok(&sql[..i])
                } else {
                    Err(SqlPilotError::MultipleStatements)
                };
            }
            _ => i + 1,
        };
    }
    Ok(sql)
}

/// Index just past the next `close` at or after `from`, or the end of input.
fn end_of(bytes: &[u8], from: usize, close: &[u8]) -> usize {
    bytes[from..]
        .windows(close.len())
        .position(|w| w == close)
        .map_or(bytes.len(), |pos| from + pos + close.len())
}

fn only_trivia(mut rest: &str) -> bool {
    loop {
        rest = rest.trim_start();
        if let Some(comment) = rest.strip_prefix("--") {
            rest = comment.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = comment.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return rest.is_empty();
        }
    }
}

/// Quote `name` as an SQLite identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> Result<String, SqlPilotError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(SqlPilotError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

async fn apply_seed(conn: &mut SqliteConnection, seed: &str) -> Result<(), SqlPilotError> {
    let mut tx = conn.begin().await?;
    for stmt in seed.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn fetch_snapshot(
    conn: &mut SqliteConnection,
    sql: &str,
) -> Result<TableSnapshot, SqlPilotError> {
    let stmt = (&mut *conn).prepare(sql).await?;
    let columns = stmt
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect::<Vec<_>>();
    let rows = stmt.query().fetch_all(&mut *conn).await?;

    let rows = rows
        .iter()
        .map(|row| decode_row(row, columns.len()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TableSnapshot::new(columns, rows))
}

fn decode_row(row: &SqliteRow, width: usize) -> Result<Vec<CellValue>, sqlx::Error> {
    (0..width).map(|i| decode_cell(row, i)).collect()
}

fn decode_cell(row: &SqliteRow, index: usize) -> Result<CellValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => CellValue::Integer(row.try_get::<i64, _>(index)?),
        "REAL" | "NUMERIC" => CellValue::Real(row.try_get::<f64, _>(index)?),
        "BLOB" => CellValue::Blob(row.try_get::<Vec<u8>, _>(index)?),
        _ => CellValue::Text(row.try_get::<String, _>(index)?),
    };
    Ok(value)
}

async fn write_table(
    conn: &mut SqliteConnection,
    table: &str,
    create: &str,
    insert: &str,
    rows: &[Vec<CellValue>],
) -> Result<(), SqlPilotError> {
    let mut tx = conn.begin().await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
        .execute(&mut *tx)
        .await?;
    sqlx::query(create).execute(&mut *tx).await?;

    for row in rows {
        let mut query = sqlx::query(insert);
        for cell in row {
            query = match cell {
                CellValue::Null => query.bind(None::<String>),
                CellValue::Integer(i) => query.bind(*i),
                CellValue::Real(r) => query.bind(*r),
                CellValue::Text(s) => query.bind(s.clone()),
                CellValue::Blob(b) => query.bind(b.clone()),
            };
        }
        query.execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Declared type for column `index`: nulls are ignored, numeric columns stay numeric,
/// anything mixed with text becomes `TEXT`.
fn infer_column_type(snapshot: &TableSnapshot, index: usize) -> &'static str {
    let mut saw_integer = false;
    let mut saw_real = false;
    let mut saw_text = false;
    let mut saw_blob = false;

    for cell in snapshot.rows.iter().filter_map(|row| row.get(index)) {
        match cell {
            CellValue::Null => {}
            CellValue::Integer(_) => saw_integer = true,
            CellValue::Real(_) => saw_real = true,
            CellValue::Text(_) => saw_text = true,
            CellValue::Blob(_) => saw_blob = true,
        }
    }

    match (saw_integer, saw_real, saw_text, saw_blob) {
        (true, false, false, false) => "INTEGER",
        (_, true, false, false) => "REAL",
        (false, false, false, true) => "BLOB",
        _ => "TEXT",
    }
}
