//! webtools-llm — Ollama client and the prompt templates used by the AI tools.

pub mod backend;
pub mod prompts;

pub use backend::{
    ChatMessage, ChatRequest, GenerateOptions, GenerateRequest, LlmBackend, LlmError, ModelInfo,
    OllamaBackend,
};
