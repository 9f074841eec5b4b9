use std::fmt;

/// One dynamically typed SQLite value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Interpret user-typed text: `NULL`, integer and float literals, otherwise text.
    ///
    /// Matching single or double quotes around the input force text and are stripped.
    pub fn parse_input(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.len() >= 2 {
            let quoted = (raw.starts_with('\'') && raw.ends_with('\''))
                || (raw.starts_with('"') && raw.ends_with('"'));
            if quoted {
                return CellValue::Text(raw[1..raw.len() - 1].to_string());
            }
        }
        if raw.eq_ignore_ascii_case("null") {
            return CellValue::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>()
            && f.is_finite()
        {
            return CellValue::Real(f);
        }
        CellValue::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Real(r) => {
                if r.fract() == 0.0 && r.abs() < 1e15 {
                    write!(f, "{r:.1}")
                } else {
                    write!(f, "{r}")
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

/// Full row set of one query result or table, with column labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSnapshot {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableSnapshot {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// First row whose width differs from the column count, as `(row index, width)`.
    pub fn ragged_row(&self) -> Option<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.columns.len())
            .map(|(i, row)| (i, row.len()))
    }
}

/// One planner step; the cells are whatever the engine reports (id, parent, notused, detail).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub cells: Vec<CellValue>,
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}

/// Ordered planner output for a single query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanReport {
    pub steps: Vec<PlanStep>,
}

impl From<TableSnapshot> for PlanReport {
    fn from(snapshot: TableSnapshot) -> Self {
        Self {
            steps: snapshot
                .rows
                .into_iter()
                .map(|cells| PlanStep { cells })
                .collect(),
        }
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Result of an EXPLAIN request. Failures are carried as display text, never as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Steps(PlanReport),
    Failed(String),
}

impl PlanOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PlanOutcome::Failed(_))
    }

    pub fn report(&self) -> Option<&PlanReport> {
        match self {
            PlanOutcome::Steps(report) => Some(report),
            PlanOutcome::Failed(_) => None,
        }
    }
}

impl fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanOutcome::Steps(report) => write!(f, "{report}"),
            PlanOutcome::Failed(message) => f.write_str(message),
        }
    }
}
