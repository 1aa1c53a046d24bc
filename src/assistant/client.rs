//! Document classification and naming on top of an [`Assistant`].

use chrono::NaiveDate;

use super::{prompts, Assistant};
use crate::taxonomy::{strip_quotes, Classification};

/// Asks the assistant about a document. Failures are logged and reported as
/// `None`; they never propagate.
pub struct DocumentAssistant {
    assistant: Box<dyn Assistant>,
}

impl DocumentAssistant {
    pub fn new(assistant: Box<dyn Assistant>) -> Self {
        Self { assistant }
    }

    async fn ask(&self, purpose: &str, prompt: &str) -> Option<String> {
        match self.assistant.ask(prompt).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                tracing::error!("  [ASSISTANT] ERROR: {} request failed: {}", purpose, e);
                None
            }
        }
    }

    /// Classify a document by its extracted text
    pub async fn classify(&self, text: &str) -> Option<Classification> {
        tracing::info!("  [CLASSIFY] Requesting category...");
        let answer = self.ask("classification", &prompts::build_classify_prompt(text)).await?;

        let classification = Classification::parse(&answer);
        match &classification {
            Some(c) => tracing::info!("  [CLASSIFY] Category: {}", c),
            None => tracing::warn!("  [CLASSIFY] Could not parse response '{}'", answer),
        }
        classification
    }

    /// Ask for a `YYYY-MM-DD - Description` name. `fallback_date` is offered
    /// for documents that carry no date of their own. The returned name has
    /// quotes stripped but is otherwise as the assistant wrote it.
    pub async fn generate_filename(&self, text: &str, fallback_date: NaiveDate) -> Option<String> {
        tracing::info!("  [NAME] Requesting filename...");
        let answer = self
            .ask("filename", &prompts::build_filename_prompt(text, fallback_date))
            .await?;

        let name = answer
            .lines()
            .map(strip_quotes)
            .find(|line| !line.is_empty())
            .map(str::to_string);
        match &name {
            Some(n) => tracing::info!("  [NAME] Suggested: {}", n),
            None => tracing::warn!("  [NAME] Assistant returned no usable filename"),
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::AssistantError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Returns a fixed answer and records the prompts it was sent
    struct Canned {
        answer: Result<&'static str, ()>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Assistant for Canned {
        async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.map(str::to_string).map_err(|_| AssistantError::Empty)
        }
    }

    fn client(answer: Result<&'static str, ()>) -> (DocumentAssistant, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let assistant = Canned {
            answer,
            prompts: prompts.clone(),
        };
        (DocumentAssistant::new(Box::new(assistant)), prompts)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    #[tokio::test]
    async fn test_classify_parses_longest_prefix() {
        let (client, prompts) = client(Ok("Financial/Bills/Electric"));

        let c = client.classify("Electric bill for January").await.unwrap();

        assert_eq!(c.category, "Financial/Bills");
        assert_eq!(c.subcategory.as_deref(), Some("Electric"));
        assert!(prompts.lock().unwrap()[0].contains("Electric bill for January"));
    }

    #[tokio::test]
    async fn test_classify_quoted_response() {
        let (client, _) = client(Ok("  'Financial/Cards/Sams Club'  "));

        let c = client.classify("statement").await.unwrap();

        assert_eq!(c.category, "Financial/Cards");
        assert_eq!(c.subcategory.as_deref(), Some("Sams Club"));
    }

    #[tokio::test]
    async fn test_classify_failure_is_none() {
        let (client, _) = client(Err(()));
        assert!(client.classify("anything").await.is_none());
    }

    #[tokio::test]
    async fn test_generate_filename_strips_quotes() {
        let (client, prompts) = client(Ok("\"2025-01-15 - Electric Bill January\""));

        let name = client.generate_filename("bill", date()).await;

        assert_eq!(name.as_deref(), Some("2025-01-15 - Electric Bill January"));
        assert!(prompts.lock().unwrap()[0].contains("2025-01-02"));
    }

    #[tokio::test]
    async fn test_generate_filename_failure_is_none() {
        let (client, _) = client(Err(()));
        assert!(client.generate_filename("bill", date()).await.is_none());
    }
}
