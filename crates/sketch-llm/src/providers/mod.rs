//! Diagram providers

pub mod openai;

pub use openai::OpenAIProvider;
