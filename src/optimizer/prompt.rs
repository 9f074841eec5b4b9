use sqlpilot_schema::ChatMessage;

pub const SYSTEM_INSTRUCTION: &str =
    "You are an SQL expert who optimizes queries for performance and readability in SQLite.";

/// User turn asking for a rewrite of `original_sql` plus a short justification.
pub fn build_user_prompt(original_sql: &str) -> String {
    format!(
        "Optimize the following SQL query (SQLite). Return the optimized version in a ```sql \
         code block and a short comment explaining why it is better.\n\
         Do not change what the query returns.\n\
         \n\
         SQL:\n\
         {original_sql}\n"
    )
}

pub fn build_messages(original_sql: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::user(build_user_prompt(original_sql)),
    ]
}
