//! Classifier output types.

use serde::{Deserialize, Serialize};

use crate::domain::borrower::RiskTier;

/// Ordered stress level read from a borrower's messages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

impl StressLevel {
    /// Numeric contribution of this level to the sentiment-trend score.
    pub fn trend_score(&self) -> u32 {
        match self {
            StressLevel::Low => 25,
            StressLevel::Moderate => 55,
            StressLevel::High => 85,
            StressLevel::Critical => 95,
        }
    }
}

/// Willingness-to-pay label derived from the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Willingness {
    /// Explicit commitment to pay.
    WillPay,
    /// Temporary setback, expects to pay.
    LikelyToPay,
    /// Under pressure, outcome uncertain.
    Struggling,
    /// Explicit refusal or stated inability.
    Refusal,
}

/// Short primary-issue tag for the manager dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryIssue {
    JobLoss,
    MedicalEmergency,
    TransportIssue,
    FamilyEmergency,
    CashFlowProblem,
    HarassmentPressure,
    FinancialCrisis,
    TemporarySetback,
    GeneralDifficulty,
}

impl PrimaryIssue {
    /// Display label as shown to recovery managers.
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryIssue::JobLoss => "Job Loss",
            PrimaryIssue::MedicalEmergency => "Medical Emergency",
            PrimaryIssue::TransportIssue => "Transport Issue",
            PrimaryIssue::FamilyEmergency => "Family Emergency",
            PrimaryIssue::CashFlowProblem => "Cash Flow Problem",
            PrimaryIssue::HarassmentPressure => "Harassment/Pressure",
            PrimaryIssue::FinancialCrisis => "Financial Crisis",
            PrimaryIssue::TemporarySetback => "Temporary Setback",
            PrimaryIssue::GeneralDifficulty => "General Financial Difficulty",
        }
    }
}

impl std::fmt::Display for PrimaryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything the rubric needs to score one inbound message.
///
/// Built by the application layer from the latest message plus the borrower
/// snapshot and the stress labels of recent history.
#[derive(Debug, Clone)]
pub struct ClassificationInput {
    pub content: String,
    pub overdue_days: u32,
    pub is_overdue: bool,
    pub loan_amount: u64,
    pub outstanding_balance: u64,
    pub emi_amount: u64,
    /// Stress labels of the borrower's recent messages, newest last.
    pub recent_stress: Vec<StressLevel>,
}

/// Deterministic classification result for one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_tier: RiskTier,
    pub stress: StressLevel,
    pub willingness: Willingness,
    pub primary_issue: PrimaryIssue,
    /// Free-text narrative insight, includes the rubric version.
    pub insight: String,
    /// Weighted composite score, 0..=100.
    pub composite_score: u32,
    /// True when a crisis phrase forced the tier to Critical.
    pub crisis: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stress_levels_order_ascending() {
        assert!(StressLevel::Low < StressLevel::Moderate);
        assert!(StressLevel::High < StressLevel::Critical);
    }

    #[test]
    fn trend_scores_increase_with_stress() {
        assert!(StressLevel::Low.trend_score() < StressLevel::Moderate.trend_score());
        assert!(StressLevel::High.trend_score() < StressLevel::Critical.trend_score());
    }

    #[test]
    fn primary_issue_labels_are_human_readable() {
        assert_eq!(PrimaryIssue::JobLoss.label(), "Job Loss");
        assert_eq!(
            PrimaryIssue::GeneralDifficulty.to_string(),
            "General Financial Difficulty"
        );
    }
}
