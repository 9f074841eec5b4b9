use crate::db::{CellValue, Gateway, TableSnapshot, quote_identifier};
use crate::error::SqlPilotError;
use crate::optimizer::{Optimizer, parse_completion};
use crate::session::context::{Comparison, SessionContext, SessionPhase};
use crate::session::report::write_report;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Drives the gateway and the optimizer for one session's actions.
///
/// All session state lives in the `SessionContext` passed to each call.
pub struct Orchestrator<O> {
    gateway: Gateway,
    optimizer: O,
    report_path: PathBuf,
}

impl<O: Optimizer> Orchestrator<O> {
    pub fn new(gateway: Gateway, optimizer: O, report_path: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            optimizer,
            report_path: report_path.into(),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Optimize `query` and compare plans.
    ///
    /// Blank input is rejected without touching the session. On success the query joins the
    /// history and the session moves to `Comparing`; on failure it falls back to `Idle` with the
    /// history untouched.
    pub async fn submit(
        &self,
        ctx: &mut SessionContext,
        query: &str,
    ) -> Result<Comparison, SqlPilotError> {
        if query.trim().is_empty() {
            return Err(SqlPilotError::EmptyQuery);
        }

        ctx.phase = SessionPhase::Submitting;
        let completion = match self.optimizer.optimize(query).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(error = %e, "Optimization request failed");
                ctx.phase = SessionPhase::Idle;
                return Err(e.into());
            }
        };
        ctx.push_history(query);

        let parsed = parse_completion(&completion);
        let original_plan = self.gateway.explain_plan(query).await;
        let optimized_plan = self.gateway.explain_plan(&parsed.optimized_sql).await;
        info!(
            original_plan_failed = original_plan.is_failed(),
            optimized_plan_failed = optimized_plan.is_failed(),
            has_comment = !parsed.comment.is_empty(),
            "Plans compared"
        );

        let comparison = Comparison {
            original_sql: query.to_string(),
            optimized_sql: parsed.optimized_sql,
            comment: parsed.comment,
            original_plan,
            optimized_plan,
        };
        ctx.phase = SessionPhase::Comparing(comparison.clone());
        Ok(comparison)
    }

    /// Write the current comparison to the report file (overwriting it).
    pub async fn save_report(&self, ctx: &SessionContext) -> Result<&Path, SqlPilotError> {
        let comparison = ctx.comparison().ok_or(SqlPilotError::NothingToSave)?;
        write_report(&self.report_path, comparison).await?;
        info!(path = %self.report_path.display(), "Report written");
        Ok(&self.report_path)
    }

    /// Load `table` into an editable draft, or return the draft already open.
    pub async fn open_table<'c>(
        &self,
        ctx: &'c mut SessionContext,
        table: &str,
    ) -> Result<&'c TableSnapshot, SqlPilotError> {
        if !ctx.drafts.contains_key(table) {
            let sql = format!("SELECT * FROM {}", quote_identifier(table)?);
            let snapshot = self.gateway.run_query(&sql).await?;
            ctx.drafts.insert(table.to_string(), snapshot);
        }
        ctx.drafts
            .get(table)
            .ok_or_else(|| SqlPilotError::UnknownTable(table.to_string()))
    }

    /// Persist the draft of `table`, replacing the stored table, then close the draft.
    pub async fn save_table(
        &self,
        ctx: &mut SessionContext,
        table: &str,
    ) -> Result<usize, SqlPilotError> {
        let draft = ctx
            .drafts
            .get(table)
            .ok_or_else(|| SqlPilotError::UnknownTable(table.to_string()))?;
        self.gateway.replace_table(table, draft).await?;
        let rows = draft.rows.len();
        ctx.drafts.remove(table);
        Ok(rows)
    }
}

/// Draft edits. Row numbers are 1-based as displayed.
impl SessionContext {
    pub fn set_cell(
        &mut self,
        table: &str,
        row: usize,
        column: &str,
        value: CellValue,
    ) -> Result<(), SqlPilotError> {
        let draft = self.draft_mut(table)?;
        let col = draft
            .column_index(column)
            .ok_or_else(|| SqlPilotError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            })?;
        let len = draft.rows.len();
        let cells = row
            .checked_sub(1)
            .and_then(|i| draft.rows.get_mut(i))
            .ok_or(SqlPilotError::RowOutOfRange { row, len })?;
        cells[col] = value;
        Ok(())
    }

    /// Append a row; missing trailing values are filled with NULL.
    pub fn append_row(
        &mut self,
        table: &str,
        mut values: Vec<CellValue>,
    ) -> Result<usize, SqlPilotError> {
        let draft = self.draft_mut(table)?;
        let width = draft.columns.len();
        if values.len() > width {
            return Err(SqlPilotError::MalformedSnapshot(format!(
                "{} values given, table {table} has {width} columns",
                values.len()
            )));
        }
        values.resize(width, CellValue::Null);
        draft.rows.push(values);
        Ok(draft.rows.len())
    }

    pub fn delete_row(&mut self, table: &str, row: usize) -> Result<(), SqlPilotError> {
        let draft = self.draft_mut(table)?;
        let len = draft.rows.len();
        if row == 0 || row > len {
            return Err(SqlPilotError::RowOutOfRange { row, len });
        }
        draft.rows.remove(row - 1);
        Ok(())
    }

    pub fn discard_draft(&mut self, table: &str) -> bool {
        self.drafts.remove(table).is_some()
    }

    fn draft_mut(&mut self, table: &str) -> Result<&mut TableSnapshot, SqlPilotError> {
        self.drafts
            .get_mut(table)
            .ok_or_else(|| SqlPilotError::UnknownTable(table.to_string()))
    }
}
