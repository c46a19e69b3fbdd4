//! Title refinement through an external text-generation service
//!
//! The refiner asks the service for a more academic phrasing of the topic.
//! Failures never reach the caller: the topic simply stays as it was.

mod gemini;
pub mod mock;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use gemini::{GeminiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use mock::MockGenerator;

/// A service that turns a prompt into a short piece of text
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Instruction sent to the generation service
pub fn refine_prompt(subject: &str, topic: &str) -> String {
    format!(
        "I am writing an assignment for the subject \"{}\". \
         The current topic is \"{}\". \
         Please provide a more professional, academic, and catchy assignment title \
         (one short line). \
         Only return the title, nothing else.",
        subject, topic
    )
}

/// Normalize a raw suggestion
///
/// Trims surrounding whitespace, then drops one leading and one trailing
/// double quote when present. Returns `None` when nothing is left.
pub fn clean_suggestion(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Rewrites a topic into a more academic title
#[derive(Debug, Clone)]
pub struct TitleRefiner {
    generator: Arc<dyn TextGenerator>,
}

impl TitleRefiner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask for a suggestion, surfacing every failure
    pub async fn suggest(&self, subject: &str, topic: &str) -> Result<String> {
        let prompt = refine_prompt(subject, topic);
        let raw = self.generator.generate(&prompt).await?;
        clean_suggestion(&raw).ok_or(Error::EmptySuggestion)
    }

    /// The refined topic, or `topic` unchanged when anything goes wrong
    pub async fn refine(&self, subject: &str, topic: &str) -> String {
        match self.suggest(subject, topic).await {
            Ok(refined) => {
                debug!(from = topic, to = %refined, "refined topic");
                refined
            }
            Err(e) => {
                warn!("Title refinement failed, keeping current topic: {}", e);
                topic.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_subject_and_topic() {
        let prompt = refine_prompt("Data Systems", "AI");
        assert!(prompt.contains("\"Data Systems\""));
        assert!(prompt.contains("\"AI\""));
        assert!(prompt.contains("Only return the title"));
    }

    #[test]
    fn test_clean_suggestion_strips_quotes_and_whitespace() {
        assert_eq!(
            clean_suggestion("  \"Foundations of Intelligent Systems\"\n"),
            Some("Foundations of Intelligent Systems".to_string())
        );
        assert_eq!(clean_suggestion("Plain Title"), Some("Plain Title".to_string()));
        assert_eq!(clean_suggestion("\"Dangling"), Some("Dangling".to_string()));
        // Only one quote is removed from each end
        assert_eq!(clean_suggestion("\"\"Nested\"\""), Some("\"Nested\"".to_string()));
    }

    #[test]
    fn test_clean_suggestion_rejects_empty() {
        assert_eq!(clean_suggestion("   "), None);
        assert_eq!(clean_suggestion("\"\""), None);
    }

    #[tokio::test]
    async fn test_refine_uses_cleaned_suggestion() {
        let refiner = TitleRefiner::new(Arc::new(MockGenerator::replying(
            "\"Foundations of Intelligent Systems\"",
        )));
        let topic = refiner.refine("Artificial Intelligence", "AI").await;
        assert_eq!(topic, "Foundations of Intelligent Systems");
    }

    #[tokio::test]
    async fn test_refine_keeps_topic_on_failure() {
        let refiner = TitleRefiner::new(Arc::new(MockGenerator::failing()));
        assert_eq!(refiner.refine("Physics", "Optics").await, "Optics");

        let refiner = TitleRefiner::new(Arc::new(MockGenerator::replying("  ")));
        assert_eq!(refiner.refine("Physics", "Optics").await, "Optics");
    }

    #[tokio::test]
    async fn test_suggest_surfaces_errors() {
        let refiner = TitleRefiner::new(Arc::new(MockGenerator::replying("")));
        assert!(matches!(
            refiner.suggest("Physics", "Optics").await,
            Err(Error::EmptySuggestion)
        ));
    }
}
