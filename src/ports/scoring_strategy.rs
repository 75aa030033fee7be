//! Scoring strategy port.
//!
//! Seam between the engine and the classification rubric. The default
//! implementation is the deterministic keyword rubric; the port exists so a
//! model-backed scorer can replace it without touching conversation flow.

use crate::domain::classifier::{Assessment, ClassificationInput, KeywordRubric, StressLevel};

pub trait ScoringStrategy: Send + Sync {
    /// Produces a full risk/sentiment assessment for one borrower message
    /// in context.
    fn assess(&self, input: &ClassificationInput) -> Assessment;

    /// Cheap single-message stress read used to annotate the message log.
    fn quick_sentiment(&self, content: &str) -> Option<StressLevel>;

    /// True when the message explicitly asks for a repayment plan.
    fn detect_plan_request(&self, content: &str) -> bool;

    /// Rubric identifier embedded in generated insights.
    fn version(&self) -> &'static str;
}

impl ScoringStrategy for KeywordRubric {
    fn assess(&self, input: &ClassificationInput) -> Assessment {
        KeywordRubric::assess(self, input)
    }

    fn quick_sentiment(&self, content: &str) -> Option<StressLevel> {
        KeywordRubric::quick_sentiment(self, content)
    }

    fn detect_plan_request(&self, content: &str) -> bool {
        KeywordRubric::detect_plan_request(self, content)
    }

    fn version(&self) -> &'static str {
        crate::domain::classifier::RUBRIC_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_strategy_is_object_safe() {
        fn _accepts_dyn(_strategy: &dyn ScoringStrategy) {}
    }

    #[test]
    fn keyword_rubric_implements_the_port() {
        let strategy: Box<dyn ScoringStrategy> = Box::new(KeywordRubric::new());
        assert!(strategy.detect_plan_request("can I get an emi plan?"));
        assert_eq!(strategy.version(), crate::domain::classifier::RUBRIC_VERSION);
    }
}
