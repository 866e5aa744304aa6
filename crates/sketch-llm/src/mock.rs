//! Offline diagram generation used while no API key is stored.
//!
//! The prompt is matched against an ordered list of rules; the first match wins and its fixed
//! diagram is returned. Prompts matching nothing get [`fallback_diagram`].

use std::fmt;
use std::time::Duration;

/// Artificial latency so callers can exercise their loading state.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(1500);

/// How many prompt characters the fallback diagram embeds.
const FALLBACK_LABEL_CHARS: usize = 20;

pub const FLOWCHART_DIAGRAM: &str = "flowchart TD
    A[Start] --> B{Is it raining?}
    B -->|Yes| C[Take umbrella]
    B -->|No| D[Enjoy the sun]
    C --> E[Go outside]
    D --> E
    E --> F[End]";

pub const SEQUENCE_DIAGRAM: &str = "sequenceDiagram
    participant User
    participant System
    participant Database

    User->>System: Request data
    System->>Database: Query data
    Database-->>System: Return results
    System-->>User: Display results";

pub const CLASS_DIAGRAM: &str = "classDiagram
    class Animal {
      +name: string
      +age: int
      +makeSound(): void
    }
    class Dog {
      +breed: string
      +fetch(): void
    }
    class Cat {
      +color: string
      +climb(): void
    }
    Animal <|-- Dog
    Animal <|-- Cat";

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A predicate over the lower-cased prompt paired with the diagram it yields.
pub struct MockRule {
    label: String,
    predicate: Predicate,
    diagram: String,
}

impl MockRule {
    pub fn new(
        label: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
        diagram: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
            diagram: diagram.into(),
        }
    }

    /// Rule matching prompts that contain `keyword`, ignoring case.
    pub fn keyword(keyword: &str, diagram: impl Into<String>) -> Self {
        let needle = keyword.to_lowercase();
        Self::new(keyword, move |prompt| prompt.contains(&needle), diagram)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn diagram(&self) -> &str {
        &self.diagram
    }

    /// `prompt` must already be lower-cased.
    pub fn matches(&self, prompt: &str) -> bool {
        (self.predicate)(prompt)
    }
}

impl fmt::Debug for MockRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRule")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Flowchart, then sequence, then class.
pub fn default_rules() -> Vec<MockRule> {
    vec![
        MockRule::keyword("flowchart", FLOWCHART_DIAGRAM),
        MockRule::keyword("sequence", SEQUENCE_DIAGRAM),
        MockRule::keyword("class", CLASS_DIAGRAM),
    ]
}

/// Generic graph whose first node is labelled with the start of the prompt.
pub fn fallback_diagram(prompt: &str) -> String {
    let label: String = prompt.chars().take(FALLBACK_LABEL_CHARS).collect();
    format!(
        "graph TD\n    A[{}...] --> B[Generated]\n    B --> C[Diagram]\n    C --> D[Example]",
        label
    )
}

#[derive(Debug)]
pub struct MockGenerator {
    rules: Vec<MockRule>,
    delay: Duration,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            delay: DEFAULT_MOCK_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_rules(mut self, rules: Vec<MockRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pick the diagram for `prompt` without waiting.
    pub fn classify(&self, prompt: &str) -> String {
        let lowered = prompt.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| {
                tracing::debug!("Mock rule '{}' matched", rule.label());
                rule.diagram().to_string()
            })
            .unwrap_or_else(|| fallback_diagram(prompt))
    }

    /// Wait for the configured delay, then classify.
    pub async fn generate(&self, prompt: &str) -> String {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.classify(prompt)
    }
}
