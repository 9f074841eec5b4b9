//! Remote query rewriting: prompt construction, the chat-completion client and the
//! completion parser.

pub mod api;
pub mod client;
pub mod parser;
pub mod prompt;

pub use client::{OpenaiChatClient, Optimizer};
pub use parser::{OptimizationResult, parse_completion};
pub use prompt::{SYSTEM_INSTRUCTION, build_messages, build_user_prompt};
