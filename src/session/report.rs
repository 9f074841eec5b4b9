use crate::session::context::Comparison;
use std::path::Path;

/// Fixed four-section text report for one comparison.
pub fn format_report(comparison: &Comparison) -> String {
    format!(
        "ORIGINAL QUERY:\n{}\n\nEXPLAIN PLAN:\n{}\n\nOPTIMIZED QUERY:\n{}\n\nOPTIMIZED EXPLAIN:\n{}\n",
        comparison.original_sql,
        comparison.original_plan,
        comparison.optimized_sql,
        comparison.optimized_plan,
    )
}

/// Overwrite `path` with the report.
pub async fn write_report(path: &Path, comparison: &Comparison) -> std::io::Result<()> {
    tokio::fs::write(path, format_report(comparison)).await
}
