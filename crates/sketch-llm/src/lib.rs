//! sketch-llm - Turns a natural-language prompt into Mermaid markup
//!
//! [`DiagramGenerator`] picks between the offline [`MockGenerator`] (no API key stored) and a
//! [`DiagramProvider`] talking to an OpenAI-compatible chat completion endpoint.

pub mod error;
pub mod extract;
pub mod mock;
pub mod openai_compat;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod types;

pub use error::{GenerationError, Result};
pub use extract::extract_diagram;
pub use mock::{default_rules, fallback_diagram, MockGenerator, MockRule};
pub use pipeline::DiagramGenerator;
pub use provider::DiagramProvider;
pub use providers::OpenAIProvider;
pub use types::{ChatMessage, Role};
