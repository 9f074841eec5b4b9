use crate::db::TableSnapshot;
use crate::session::{Comparison, QueryRecord};
use std::fmt::Write as _;

const MAX_CELL_WIDTH: usize = 40;
const HISTORY_PREVIEW_CHARS: usize = 60;

/// Bordered table with a leading 1-based row number column.
pub fn render_table(snapshot: &TableSnapshot) -> String {
    if snapshot.columns.is_empty() {
        return "(no columns)\n".to_string();
    }

    let mut header = vec!["#".to_string()];
    header.extend(snapshot.columns.iter().cloned());
    let body = snapshot
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![(i + 1).to_string()];
            cells.extend(row.iter().map(ToString::to_string));
            cells
        })
        .collect::<Vec<_>>();

    let widths = header
        .iter()
        .enumerate()
        .map(|(i, title)| {
            body.iter()
                .filter_map(|cells| cells.get(i))
                .chain(std::iter::once(title))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect::<Vec<_>>();

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    push_row(&mut out, &header, &widths);
    out.push_str(&border);
    for cells in &body {
        push_row(&mut out, cells, &widths);
    }
    out.push_str(&border);
    let _ = writeln!(out, "({} rows)", snapshot.rows.len());
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (i, &width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        let cell = truncate(&cell.replace('\n', " "), width);
        let _ = write!(out, " {cell:<width$} |");
    }
    out.push('\n');
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut = text.chars().take(keep).collect::<String>();
    cut.push_str("...");
    cut
}

fn push_section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "== {title} ==");
    for line in body.lines() {
        let _ = writeln!(out, "    {line}");
    }
    out.push('\n');
}

/// Optimized SQL, the model's comment and both plans.
pub fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    push_section(&mut out, "Optimized query", &comparison.optimized_sql);
    if !comparison.comment.is_empty() {
        push_section(&mut out, "Comment", &comparison.comment);
    }
    push_section(
        &mut out,
        "Original EXPLAIN QUERY PLAN",
        &comparison.original_plan.to_string(),
    );
    push_section(
        &mut out,
        "Optimized EXPLAIN QUERY PLAN",
        &comparison.optimized_plan.to_string(),
    );
    out
}

/// Numbered history lines, matching the numbers `.reuse` accepts.
pub fn render_history<'a>(records: impl Iterator<Item = &'a QueryRecord>) -> String {
    let mut out = String::new();
    for (i, record) in records.enumerate() {
        let flat = record.sql.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = writeln!(
            out,
            "{:>2}. [{}] {}",
            i + 1,
            record.submitted_at.format("%H:%M:%S"),
            truncate(&flat, HISTORY_PREVIEW_CHARS)
        );
    }
    if out.is_empty() {
        out.push_str("No queries in this session yet.\n");
    }
    out
}
