pub mod llm_client;
pub mod scripted;

pub use llm_client::{CompletionBackend, CompletionRequest, LlmClient, ResponseSchema};
pub use scripted::ScriptedBackend;
