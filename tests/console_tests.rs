use async_trait::async_trait;
use sqlpilot::console::{CONTINUATION_PROMPT, Console, Flow, PROMPT};
use sqlpilot::db::{CellValue, Gateway};
use sqlpilot::error::OptimizerError;
use sqlpilot::optimizer::Optimizer;
use sqlpilot::session::{Orchestrator, SessionPhase};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

fn temp_path(tag: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "sqlpilot-console-{tag}-{}-{}.{ext}",
        std::process::id(),
        nanos
    ));
    path
}

/// Answers with a fixed rewrite until `down` is set, then fails like an overloaded upstream.
#[derive(Clone, Default)]
struct SwitchableOptimizer {
    down: Arc<AtomicBool>,
}

#[async_trait]
impl Optimizer for SwitchableOptimizer {
    async fn optimize(&self, original_sql: &str) -> Result<String, OptimizerError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(OptimizerError::UpstreamFallback {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "overloaded".to_string(),
            });
        }
        Ok(format!("```sql\n{original_sql}\n```\nAlready minimal."))
    }
}

struct Harness {
    console: Console<SwitchableOptimizer>,
    gateway: Gateway,
    down: Arc<AtomicBool>,
    db_path: PathBuf,
    report_path: PathBuf,
}

impl Harness {
    async fn new(tag: &str) -> Self {
        let db_path = temp_path(tag, "sqlite");
        let report_path = temp_path(tag, "txt");
        let gateway = Gateway::new(&db_path);
        gateway.bootstrap().await.expect("bootstrap");

        let optimizer = SwitchableOptimizer::default();
        let down = optimizer.down.clone();
        let console = Console::new(Orchestrator::new(
            gateway.clone(),
            optimizer,
            &report_path,
        ));
        Self {
            console,
            gateway,
            down,
            db_path,
            report_path,
        }
    }

    async fn feed(&mut self, lines: &[&str]) {
        for line in lines {
            assert_eq!(self.console.handle_line(line).await, Flow::Continue, "{line}");
        }
    }

    async fn cleanup(self) {
        fs::remove_file(&self.db_path).await.unwrap();
        if self.report_path.exists() {
            fs::remove_file(&self.report_path).await.unwrap();
        }
    }
}

#[tokio::test]
async fn terminated_line_submits_the_buffer() {
    let mut h = Harness::new("submit").await;

    h.feed(&["SELECT *"]).await;
    assert_eq!(h.console.context().input, "SELECT *");
    assert_eq!(h.console.context().phase(), &SessionPhase::Idle);

    h.feed(&["FROM orders WHERE customer_id = 1;"]).await;
    let ctx = h.console.context();
    assert!(ctx.input.is_empty());
    let comparison = ctx.comparison().expect("comparison after submit");
    assert_eq!(
        comparison.original_sql,
        "SELECT *\nFROM orders WHERE customer_id = 1"
    );
    assert_eq!(comparison.comment, "Already minimal.");
    assert!(!comparison.original_plan.is_failed());
    assert_eq!(ctx.history().len(), 1);

    h.feed(&[".save"]).await;
    let report = fs::read_to_string(&h.report_path).await.expect("report");
    assert!(report.starts_with("ORIGINAL QUERY:\nSELECT *\nFROM orders WHERE customer_id = 1\n"));

    h.cleanup().await;
}

#[tokio::test]
async fn failed_submit_keeps_the_typed_text() {
    let mut h = Harness::new("failure").await;
    h.down.store(true, Ordering::SeqCst);

    h.feed(&["SELECT name", "FROM users;"]).await;
    let ctx = h.console.context();
    assert_eq!(ctx.input, "SELECT name\nFROM users");
    assert!(ctx.history().is_empty());
    assert_eq!(ctx.phase(), &SessionPhase::Idle);

    h.down.store(false, Ordering::SeqCst);
    h.feed(&[".submit"]).await;
    let ctx = h.console.context();
    assert!(ctx.input.is_empty());
    assert_eq!(ctx.history().len(), 1);
    assert!(ctx.comparison().is_some());

    // Blank submits are a warning and leave everything as it was.
    h.feed(&[".submit"]).await;
    assert_eq!(h.console.context().history().len(), 1);

    h.cleanup().await;
}

#[tokio::test]
async fn reuse_lands_in_the_buffer_on_the_next_pass() {
    let mut h = Harness::new("reuse").await;
    h.feed(&["SELECT 1;", "SELECT 2;"]).await;
    assert_eq!(h.console.next_prompt(), PROMPT);

    h.feed(&[".reuse 2"]).await;
    assert!(h.console.context().input.is_empty());
    assert_eq!(h.console.context().pending_restore(), Some("SELECT 1"));

    assert_eq!(h.console.next_prompt(), CONTINUATION_PROMPT);
    assert_eq!(h.console.context().input, "SELECT 1");
    assert_eq!(h.console.context().pending_restore(), None);

    // Single shot: clearing the buffer is not undone by a later pass.
    h.feed(&[".clear"]).await;
    assert_eq!(h.console.next_prompt(), PROMPT);
    assert!(h.console.context().input.is_empty());

    h.feed(&[".reuse 3"]).await;
    assert_eq!(h.console.context().pending_restore(), None);

    h.cleanup().await;
}

#[tokio::test]
async fn table_edits_are_committed_through_commands() {
    let mut h = Harness::new("editor").await;

    h.feed(&[
        ".show users",
        ".set users 1 name Anna Nowak",
        ".del users 2",
        ".add users 9, 'Olek'",
    ])
    .await;
    let draft = h.console.context().draft("users").expect("open draft");
    assert_eq!(draft.rows.len(), 3);

    let before = h
        .gateway
        .run_query("SELECT COUNT(*) FROM users")
        .await
        .expect("count");
    assert_eq!(before.rows, vec![vec![CellValue::Integer(3)]]);

    h.feed(&[".commit users"]).await;
    assert!(h.console.context().draft("users").is_none());

    let after = h
        .gateway
        .run_query("SELECT id, name FROM users ORDER BY id")
        .await
        .expect("read back");
    assert_eq!(
        after.rows,
        vec![
            vec![
                CellValue::Integer(1),
                CellValue::Text("Anna Nowak".to_string())
            ],
            vec![CellValue::Integer(3), CellValue::Text("Ewa".to_string())],
            vec![CellValue::Integer(9), CellValue::Text("Olek".to_string())],
        ]
    );

    // Edits against a reverted draft start again from the stored table.
    h.feed(&[".del orders 1", ".revert orders", ".show orders"]).await;
    assert_eq!(
        h.console.context().draft("orders").expect("orders draft").rows.len(),
        3
    );

    h.cleanup().await;
}

#[tokio::test]
async fn quit_and_bad_commands() {
    let mut h = Harness::new("quit").await;

    h.feed(&[".frobnicate", ".reuse x", ".set users", "   "]).await;
    assert!(h.console.context().input.is_empty());
    assert_eq!(h.console.handle_line(".quit").await, Flow::Exit);

    h.cleanup().await;
}
