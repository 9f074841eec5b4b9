use crate::db::{PlanOutcome, TableSnapshot};
use crate::error::SqlPilotError;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// How many history entries the history view shows.
pub const HISTORY_DISPLAY_LIMIT: usize = 10;

/// A submitted query. Never mutated after it enters the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub sql: String,
    pub submitted_at: DateTime<Utc>,
}

/// Everything one submit produced, kept for rendering and `.save`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub original_sql: String,
    pub optimized_sql: String,
    pub comment: String,
    pub original_plan: PlanOutcome,
    pub optimized_plan: PlanOutcome,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    Comparing(Comparison),
}

/// Per-session mutable state. Only the orchestrator and the console loop that owns the session
/// touch it; nothing here is shared across sessions.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// The live input buffer (what the user is currently composing).
    pub input: String,
    pub(crate) history: Vec<QueryRecord>,
    pub(crate) restore: Option<String>,
    pub(crate) phase: SessionPhase,
    pub(crate) drafts: BTreeMap<String, TableSnapshot>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn comparison(&self) -> Option<&Comparison> {
        match &self.phase {
            SessionPhase::Comparing(comparison) => Some(comparison),
            _ => None,
        }
    }

    /// Every submission of this session, oldest first.
    pub fn history(&self) -> &[QueryRecord] {
        &self.history
    }

    /// At most `HISTORY_DISPLAY_LIMIT` records, most recent first.
    pub fn recent_history(&self) -> impl Iterator<Item = &QueryRecord> {
        self.history.iter().rev().take(HISTORY_DISPLAY_LIMIT)
    }

    pub(crate) fn push_history(&mut self, sql: &str) {
        self.history.push(QueryRecord {
            sql: sql.to_string(),
            submitted_at: Utc::now(),
        });
    }

    /// Queue entry `position` (1-based, as numbered by `recent_history`) for restore.
    /// A pending restore that was not applied yet is replaced.
    pub fn request_restore(&mut self, position: usize) -> Result<&str, SqlPilotError> {
        let sql = position
            .checked_sub(1)
            .and_then(|index| self.recent_history().nth(index))
            .map(|record| record.sql.clone())
            .ok_or(SqlPilotError::HistoryEntryNotFound(position))?;
        Ok(self.restore.insert(sql).as_str())
    }

    pub fn pending_restore(&self) -> Option<&str> {
        self.restore.as_deref()
    }

    /// Move a pending restore into the input buffer and clear it. Returns whether one was applied.
    pub fn apply_pending_restore(&mut self) -> bool {
        match self.restore.take() {
            Some(sql) => {
                self.input = sql;
                true
            }
            None => false,
        }
    }

    pub fn push_input_line(&mut self, line: &str) {
        if !self.input.is_empty() {
            self.input.push('\n');
        }
        self.input.push_str(line);
    }

    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn draft(&self, table: &str) -> Option<&TableSnapshot> {
        self.drafts.get(table)
    }

    pub fn open_drafts(&self) -> impl Iterator<Item = &str> {
        self.drafts.keys().map(String::as_str)
    }
}
