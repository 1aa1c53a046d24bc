//! Threshold-gated sequence of extraction strategies.

use super::{viable_len, ExtractionResult, ExtractionStrategy, PdfSource, StageOutcome, MIN_VIABLE_CHARS};

/// Runs strategies in order until one produces enough text.
///
/// Each stage starts from scratch: when a later stage runs, the earlier
/// stage's short output is discarded. If no stage is accepted, the last
/// stage's text is returned as-is. A [`StageOutcome::Halt`] ends the cascade
/// with an empty result.
pub struct Cascade {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Cascade {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    fn accepts(&self, text: &str) -> bool {
        viable_len(text) >= MIN_VIABLE_CHARS
    }

    pub async fn run(&self, source: &PdfSource) -> ExtractionResult {
        let mut last = ExtractionResult::empty();

        for strategy in &self.strategies {
            tracing::info!("  [EXTRACT] Trying {}...", strategy.name());

            match strategy.extract(source).await {
                StageOutcome::Text(text) => {
                    let accepted = self.accepts(&text);
                    tracing::info!(
                        "  [EXTRACT] {} extracted {} characters{}",
                        strategy.name(),
                        viable_len(&text),
                        if accepted { "" } else { " (too little, continuing)" }
                    );
                    last = ExtractionResult {
                        text: text.trim().to_string(),
                        strategy: Some(strategy.name()),
                    };
                    if accepted {
                        return last;
                    }
                }
                StageOutcome::Halt => {
                    tracing::error!("  [EXTRACT] {} failed, giving up on this document", strategy.name());
                    return ExtractionResult::empty();
                }
            }
        }

        last
    }
}
