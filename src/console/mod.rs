//! Line-oriented interactive surface: optimize & compare, table editor and history.

pub mod commands;
pub mod render;

use crate::db::EDITABLE_TABLES;
use crate::error::SqlPilotError;
use crate::optimizer::Optimizer;
use crate::session::{Orchestrator, SessionContext};
use commands::{Command, HELP, parse_line};
use render::{render_comparison, render_history, render_table};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use tracing::{debug, warn};

pub const PROMPT: &str = "sqlpilot> ";
pub const CONTINUATION_PROMPT: &str = "      -> ";

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// One interactive session: the orchestrator plus the session's own context.
pub struct Console<O> {
    orchestrator: Orchestrator<O>,
    ctx: SessionContext,
}

impl<O: Optimizer> Console<O> {
    pub fn new(orchestrator: Orchestrator<O>) -> Self {
        Self {
            orchestrator,
            ctx: SessionContext::new(),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Read-eval loop until `.quit` or end of input.
    pub async fn run(&mut self) -> Result<(), ReadlineError> {
        let mut rl = DefaultEditor::with_config(Config::default())?;

        println!("sqlpilot v{}", env!("CARGO_PKG_VERSION"));
        println!("Type SQL ending with ';' to optimize it, '.help' for commands, '.quit' to exit");
        println!(
            "Database: {}",
            self.orchestrator.gateway().path().display()
        );

        loop {
            let prompt = self.next_prompt();
            match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty()
                        && let Err(e) = rl.add_history_entry(line.as_str())
                    {
                        debug!(error = %e, "Could not add line to editor history");
                    }
                    if self.handle_line(&line).await == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    self.ctx.clear_input();
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "Readline failed");
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Start a loop pass: apply any pending history restore, then pick the prompt.
    pub fn next_prompt(&mut self) -> &'static str {
        if self.ctx.apply_pending_restore() {
            println!("Restored into the input buffer (.submit to run it, .clear to drop it):");
            println!("{}", self.ctx.input);
        }

        if self.ctx.input.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        }
    }

    /// Parse and run one line, printing results and failures.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        let cmd = match parse_line(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return Flow::Continue,
            Err(usage) => {
                println!("warning: {usage}");
                return Flow::Continue;
            }
        };

        match self.execute(cmd).await {
            Ok(flow) => flow,
            Err(e) => {
                if e.is_warning() {
                    println!("warning: {e}");
                } else {
                    println!("error: {e}");
                }
                Flow::Continue
            }
        }
    }

    async fn execute(&mut self, cmd: Command) -> Result<Flow, SqlPilotError> {
        match cmd {
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Exit),
            Command::Sql { text, terminated } => {
                self.ctx.push_input_line(&text);
                if terminated {
                    self.submit().await?;
                }
            }
            Command::Submit => self.submit().await?,
            Command::Clear => self.ctx.clear_input(),
            Command::ShowInput => {
                if self.ctx.input.is_empty() {
                    println!("(input buffer is empty)");
                } else {
                    println!("{}", self.ctx.input);
                }
            }
            Command::SaveReport => {
                let path = self.orchestrator.save_report(&self.ctx).await?;
                println!("Saved to {}", path.display());
            }
            Command::History => print!("{}", render_history(self.ctx.recent_history())),
            Command::Reuse(position) => {
                self.ctx.request_restore(position)?;
            }
            Command::Tables => {
                for table in EDITABLE_TABLES {
                    let snapshot = self.orchestrator.open_table(&mut self.ctx, table).await?;
                    println!("Table: {table}");
                    print!("{}", render_table(snapshot));
                }
            }
            Command::Show(table) => {
                let snapshot = self.orchestrator.open_table(&mut self.ctx, &table).await?;
                print!("{}", render_table(snapshot));
            }
            Command::Set {
                table,
                row,
                column,
                value,
            } => {
                self.orchestrator.open_table(&mut self.ctx, &table).await?;
                self.ctx.set_cell(&table, row, &column, value)?;
                println!("Draft of {table} updated; .commit {table} to save it");
            }
            Command::Add { table, values } => {
                self.orchestrator.open_table(&mut self.ctx, &table).await?;
                let row = self.ctx.append_row(&table, values)?;
                println!("Row {row} added to the draft of {table}");
            }
            Command::Delete { table, row } => {
                self.orchestrator.open_table(&mut self.ctx, &table).await?;
                self.ctx.delete_row(&table, row)?;
                println!("Row {row} removed from the draft of {table}");
            }
            Command::Commit(table) => {
                let rows = self.orchestrator.save_table(&mut self.ctx, &table).await?;
                println!("Saved changes to table {table} ({rows} rows)");
            }
            Command::Revert(table) => {
                if self.ctx.discard_draft(&table) {
                    println!("Draft of {table} discarded");
                } else {
                    println!("No open draft for {table}");
                }
            }
        }
        Ok(Flow::Continue)
    }

    async fn submit(&mut self) -> Result<(), SqlPilotError> {
        let query = self.ctx.take_input();
        if !query.trim().is_empty() {
            println!("Optimizing...");
        }
        match self.orchestrator.submit(&mut self.ctx, &query).await {
            Ok(comparison) => {
                print!("{}", render_comparison(&comparison));
                Ok(())
            }
            Err(e) => {
                if !matches!(e, SqlPilotError::EmptyQuery) {
                    // Keep the text so a failed request can be resubmitted.
                    self.ctx.input = query;
                }
                Err(e)
            }
        }
    }
}
