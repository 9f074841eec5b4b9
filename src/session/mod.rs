//! Session orchestration: per-session context, the submit/compare/save flow, table drafts and
//! the exported report.

pub mod context;
pub mod orchestrator;
pub mod report;

pub use context::{Comparison, HISTORY_DISPLAY_LIMIT, QueryRecord, SessionContext, SessionPhase};
pub use orchestrator::Orchestrator;
pub use report::{format_report, write_report};
