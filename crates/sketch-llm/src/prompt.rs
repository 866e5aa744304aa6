//! Fixed instructions sent with every remote request.

use crate::types::ChatMessage;

pub const SYSTEM_INSTRUCTION: &str = "You are a diagram expert specializing in creating Mermaid syntax diagrams. \
When given a request, respond ONLY with valid Mermaid syntax code surrounded by backticks like this: `mermaid code here`. \
Do not include any explanations, markdown code blocks, or anything else outside the backticks. \
Ensure the diagram is clean, well-organized, and correctly formatted.";

/// System instruction followed by the user's prompt, verbatim.
pub fn build_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::user(format!(
            "Create a Mermaid diagram based on this description: {}",
            prompt
        )),
    ]
}
