mod chat_error;
mod chat_request;
mod chat_response;

pub use chat_error::{OpenaiErrorBody, OpenaiErrorObject};
pub use chat_request::{ChatCompletionRequest, ChatMessage, ChatRole};
pub use chat_response::{ChatChoice, ChatChoiceMessage, ChatCompletionResponse, ChatUsage};
