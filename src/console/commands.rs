use crate::db::CellValue;
use std::fmt;

/// One line of console input, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    /// Submit the buffer as it is (possibly blank).
    Submit,
    Clear,
    ShowInput,
    SaveReport,
    History,
    Reuse(usize),
    Tables,
    Show(String),
    Set {
        table: String,
        row: usize,
        column: String,
        value: CellValue,
    },
    Add {
        table: String,
        values: Vec<CellValue>,
    },
    Delete {
        table: String,
        row: usize,
    },
    Commit(String),
    Revert(String),
    /// A plain SQL line for the input buffer. `terminated` is set when it ended with `;`.
    Sql { text: String, terminated: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub &'static str);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "usage: {}", self.0)
    }
}

impl std::error::Error for UsageError {}

pub const HELP: &str = "\
Optimize & compare:
  <sql>...;                 type SQL (multi-line); a trailing ';' submits it
  .submit                   submit the current input buffer
  .input                    show the input buffer
  .clear                    clear the input buffer
  .save                     write the last comparison to the report file
History:
  .history                  show the 10 most recent queries
  .reuse N                  put history entry N back into the input buffer
Table editor:
  .tables                   show the users and orders tables
  .show TABLE               show one table (opens an editable draft)
  .set TABLE ROW COLUMN VALUE
                            change one cell (NULL, numbers, 'quoted text')
  .add TABLE v1, v2, ...    append a row
  .del TABLE ROW            delete a row
  .commit TABLE             replace the stored table with the draft
  .revert TABLE             drop the draft
Other:
  .help                     this text
  .quit                     exit";

/// Parse one input line. Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Command>, UsageError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !trimmed.starts_with('.') {
        let (text, terminated) = match line.trim_end().strip_suffix(';') {
            Some(text) => (text.to_string(), true),
            None => (line.trim_end().to_string(), false),
        };
        return Ok(Some(Command::Sql { text, terminated }));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    let cmd = match name {
        ".help" | ".h" => Command::Help,
        ".quit" | ".exit" | ".q" => Command::Quit,
        ".submit" => Command::Submit,
        ".clear" => Command::Clear,
        ".input" => Command::ShowInput,
        ".save" => Command::SaveReport,
        ".history" => Command::History,
        ".reuse" => Command::Reuse(parse_number(rest).ok_or(UsageError(".reuse N"))?),
        ".tables" => Command::Tables,
        ".show" => Command::Show(single_word(rest).ok_or(UsageError(".show TABLE"))?),
        ".set" => parse_set(rest).ok_or(UsageError(".set TABLE ROW COLUMN VALUE"))?,
        ".add" => parse_add(rest).ok_or(UsageError(".add TABLE v1, v2, ..."))?,
        ".del" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next().and_then(parse_number), parts.next()) {
                (Some(table), Some(row), None) => Command::Delete {
                    table: table.to_string(),
                    row,
                },
                _ => return Err(UsageError(".del TABLE ROW")),
            }
        }
        ".commit" => Command::Commit(single_word(rest).ok_or(UsageError(".commit TABLE"))?),
        ".revert" => Command::Revert(single_word(rest).ok_or(UsageError(".revert TABLE"))?),
        _ => return Err(UsageError(".help lists the available commands")),
    };
    Ok(Some(cmd))
}

fn parse_number(s: &str) -> Option<usize> {
    s.trim().parse().ok()
}

fn single_word(s: &str) -> Option<String> {
    let mut parts = s.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(word), None) => Some(word.to_string()),
        _ => None,
    }
}

/// `.set TABLE ROW COLUMN VALUE`; the value is the rest of the line and may contain spaces.
fn parse_set(rest: &str) -> Option<Command> {
    let (table, rest) = rest.split_once(char::is_whitespace)?;
    let (row, rest) = rest.trim_start().split_once(char::is_whitespace)?;
    let (column, value) = rest.trim_start().split_once(char::is_whitespace)?;
    Some(Command::Set {
        table: table.to_string(),
        row: parse_number(row)?,
        column: column.to_string(),
        value: CellValue::parse_input(value),
    })
}

fn parse_add(rest: &str) -> Option<Command> {
    let (table, values) = rest.split_once(char::is_whitespace)?;
    let values = values
        .split(',')
        .map(CellValue::parse_input)
        .collect::<Vec<_>>();
    Some(Command::Add {
        table: table.to_string(),
        values,
    })
}
