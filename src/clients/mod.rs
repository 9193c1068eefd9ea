pub mod openai_provider;
pub mod provider;
pub mod scripted;

pub use openai_provider::OpenAiProvider;
pub use provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, ModelTier, ResponseFormat,
};
pub use scripted::ScriptedProvider;
