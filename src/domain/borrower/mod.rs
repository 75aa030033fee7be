//! Borrower snapshot and the risk/plan fields the engine is allowed to write.
//!
//! The borrower record lives in an external store; the engine reads loan
//! facts from it and writes back exactly three things: the risk tier, the
//! plan-acceptance status, and the behavioral profile produced by the
//! classifier. Everything else is owned by the external system.

use serde::{Deserialize, Serialize};

use crate::domain::classifier::{StressLevel, Willingness};
use crate::domain::foundation::{BorrowerId, ManagerId, Timestamp};

/// Ordered borrower default-risk classification.
///
/// Ordering matters: `Normal < Moderate < High < Critical`. The tier is not
/// monotonic over time — a crisis signal forces it to `Critical` regardless
/// of the prior value, and later assessments may lower it again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    #[default]
    Normal,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    /// Display label matching the external store's convention.
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Normal => "NORMAL_RISK",
            RiskTier::Moderate => "MODERATE_RISK",
            RiskTier::High => "HIGH_RISK",
            RiskTier::Critical => "CRITICAL_RISK",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Plan-acceptance status mirrored onto the borrower record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// No plan has been offered yet.
    #[default]
    None,
    /// A recommendation is awaiting the borrower's decision.
    Pending,
    /// The borrower accepted a restructured plan.
    Accepted,
    /// The borrower rejected the latest plan.
    Rejected,
}

/// Classifier output persisted against the borrower for manager dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    pub stress: StressLevel,
    pub primary_issue: String,
    pub willingness: Willingness,
    /// Free-text narrative produced by the rubric.
    pub insight: String,
    pub analyzed_at: Timestamp,
}

/// Read snapshot of a borrower's loan facts.
///
/// Monetary amounts are whole currency units. `emi_amount` may be zero for
/// imported records that never had an installment computed; the plan
/// generator falls back to a tenure-based estimate in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Borrower {
    pub id: BorrowerId,
    pub name: String,
    /// Destination for outbound messages; absent numbers make the borrower
    /// unreachable and outreach reports a per-item failure.
    pub phone_number: Option<String>,
    pub assigned_manager: Option<ManagerId>,
    pub loan_amount: u64,
    pub outstanding_balance: u64,
    pub emi_amount: u64,
    pub remaining_tenure_months: u16,
    pub overdue_days: u32,
    pub is_overdue: bool,
    pub risk_tier: RiskTier,
    pub plan_status: PlanStatus,
    pub behavioral_profile: Option<BehavioralProfile>,
}

impl Borrower {
    /// Current installment, falling back to a twelve-month split of the
    /// outstanding balance when no EMI was ever recorded.
    pub fn effective_emi(&self) -> u64 {
        if self.emi_amount > 0 {
            self.emi_amount
        } else {
            (self.outstanding_balance / 12).max(1)
        }
    }

    /// True when the borrower qualifies for an outreach batch at the given
    /// threshold: overdue long enough and not already on an accepted plan.
    pub fn eligible_for_outreach(&self, min_overdue_days: u32) -> bool {
        self.is_overdue
            && self.overdue_days >= min_overdue_days
            && self.plan_status != PlanStatus::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(overdue_days: u32, plan_status: PlanStatus) -> Borrower {
        Borrower {
            id: BorrowerId::new(),
            name: "Asha Verma".to_string(),
            phone_number: Some("9876543210".to_string()),
            assigned_manager: Some(ManagerId::new()),
            loan_amount: 240_000,
            outstanding_balance: 180_000,
            emi_amount: 8_000,
            remaining_tenure_months: 24,
            overdue_days,
            is_overdue: overdue_days > 0,
            risk_tier: RiskTier::Normal,
            plan_status,
            behavioral_profile: None,
        }
    }

    #[test]
    fn risk_tier_ordering_is_ascending() {
        assert!(RiskTier::Normal < RiskTier::Moderate);
        assert!(RiskTier::Moderate < RiskTier::High);
        assert!(RiskTier::High < RiskTier::Critical);
    }

    #[test]
    fn risk_tier_labels_match_store_convention() {
        assert_eq!(RiskTier::Critical.label(), "CRITICAL_RISK");
        assert_eq!(RiskTier::Normal.to_string(), "NORMAL_RISK");
    }

    #[test]
    fn effective_emi_prefers_recorded_amount() {
        let b = sample(10, PlanStatus::None);
        assert_eq!(b.effective_emi(), 8_000);
    }

    #[test]
    fn effective_emi_falls_back_to_balance_split() {
        let mut b = sample(10, PlanStatus::None);
        b.emi_amount = 0;
        assert_eq!(b.effective_emi(), 15_000);
    }

    #[test]
    fn outreach_eligibility_respects_threshold() {
        let b = sample(6, PlanStatus::None);
        assert!(!b.eligible_for_outreach(7));
        assert!(b.eligible_for_outreach(6));
    }

    #[test]
    fn accepted_plan_excludes_from_outreach() {
        let b = sample(30, PlanStatus::Accepted);
        assert!(!b.eligible_for_outreach(7));
    }
}
