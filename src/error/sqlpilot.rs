use thiserror::Error as ThisError;

use super::optimizer::OptimizerError;

/// Hard failures surfaced to the user by the session orchestrator.
///
/// EXPLAIN failures never show up here: the gateway turns them into
/// `PlanOutcome::Failed` text instead.
#[derive(Debug, ThisError)]
pub enum SqlPilotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Optimizer(#[from] OptimizerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table name: {0:?}")]
    InvalidIdentifier(String),

    #[error("Malformed table data: {0}")]
    MalformedSnapshot(String),

    #[error("Only one SQL statement can be run at a time")]
    MultipleStatements,

    #[error("Enter an SQL query first")]
    EmptyQuery,

    #[error("Nothing to save; optimize a query first")]
    NothingToSave,

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Row {row} is out of range (table has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Unknown column {column:?} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("No history entry #{0}")]
    HistoryEntryNotFound(usize),
}

impl SqlPilotError {
    /// Validation problems are shown as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SqlPilotError::EmptyQuery
                | SqlPilotError::NothingToSave
                | SqlPilotError::HistoryEntryNotFound(_)
        )
    }
}
