//! Queryflow LLM - provider trait and Azure OpenAI client

pub mod azure;
pub mod provider;
pub mod types;

pub use azure::AzureOpenAiProvider;
pub use provider::{LlmError, LlmProvider, LlmResult};
pub use types::{ChatMessage, ChatRequest};
