use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BasicConfig {
    /// Path of the SQLite file backing the demo tables. Created and seeded when missing.
    /// TOML: `basic.database_path`. Default: `demo.db`.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Where `.save` writes the plan comparison report (overwritten on every save).
    /// TOML: `basic.report_path`. Default: `explain_result.txt`.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `warn`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            report_path: default_report_path(),
            loglevel: default_loglevel(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("demo.db")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("explain_result.txt")
}

fn default_loglevel() -> String {
    "warn".to_string()
}
