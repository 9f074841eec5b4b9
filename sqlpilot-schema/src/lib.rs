pub mod openai;

pub use openai::{
    ChatChoice, ChatChoiceMessage, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ChatRole, ChatUsage, OpenaiErrorBody, OpenaiErrorObject,
};
