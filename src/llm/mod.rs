//! LLM call-outs. Currently just the Gemini image-editing client.

pub mod gemini;

pub use gemini::{GeminiClient, GeneratedContent, LlmError};
