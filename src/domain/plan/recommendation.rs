//! Repayment recommendation entity and its lifecycle.
//!
//! One recommendation instance carries one set of plan terms. The primary
//! recommendation holds Plan A and retains Plan B as its auto-revision
//! fallback; the auto-revised successor holds Plan B and retains a verbatim
//! copy of Plan A so an explicit restore can reproduce it exactly.

use serde::{Deserialize, Serialize};

use crate::domain::borrower::RiskTier;
use crate::domain::foundation::{
    BorrowerId, DomainError, ErrorCode, ManagerId, RecommendationId, StateMachine, Timestamp,
};

use super::PlanTerms;

/// Lifecycle status of one recommendation instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    /// Generated but not yet sent to the borrower.
    #[default]
    Draft,
    /// Sent, awaiting the borrower's decision.
    Pending,
    /// Borrower accepted; terminal for this instance.
    Accepted,
    /// Borrower rejected; terminal except for restore bookkeeping.
    Rejected,
    /// Replaced by a restored prior plan; terminal.
    Superseded,
}

impl StateMachine for RecommendationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RecommendationStatus::*;
        matches!(
            (self, target),
            (Draft, Pending)
                | (Pending, Accepted)
                | (Pending, Rejected)
                | (Pending, Superseded)
                // A rejected auto-revision can still be restored over.
                | (Rejected, Superseded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RecommendationStatus::*;
        match self {
            Draft => vec![Pending],
            Pending => vec![Accepted, Rejected, Superseded],
            Rejected => vec![Superseded],
            Accepted => vec![],
            Superseded => vec![],
        }
    }
}

/// Which path produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanOrigin {
    /// First offer for this negotiation round (Plan A terms).
    Primary,
    /// Generated automatically after a primary rejection (Plan B terms).
    AutoRevised,
}

impl PlanOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            PlanOrigin::Primary => "primary",
            PlanOrigin::AutoRevised => "auto-revised",
        }
    }
}

/// A repayment restructuring proposal for one borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    id: RecommendationId,
    borrower_id: BorrowerId,
    manager_id: ManagerId,
    /// Risk tier at generation time.
    risk_tier: RiskTier,
    terms: PlanTerms,
    status: RecommendationStatus,
    origin: PlanOrigin,
    /// Plan B terms, retained on primary recommendations for auto-revision.
    fallback_terms: Option<PlanTerms>,
    /// Verbatim Plan A terms, retained on auto-revised recommendations so
    /// restore can reproduce them exactly.
    prior_terms: Option<PlanTerms>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Recommendation {
    /// Creates a draft primary recommendation from a generated plan pair.
    pub fn primary(
        borrower_id: BorrowerId,
        manager_id: ManagerId,
        risk_tier: RiskTier,
        plan_a: PlanTerms,
        plan_b: PlanTerms,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: RecommendationId::new(),
            borrower_id,
            manager_id,
            risk_tier,
            terms: plan_a,
            status: RecommendationStatus::Draft,
            origin: PlanOrigin::Primary,
            fallback_terms: Some(plan_b),
            prior_terms: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a recommendation from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RecommendationId,
        borrower_id: BorrowerId,
        manager_id: ManagerId,
        risk_tier: RiskTier,
        terms: PlanTerms,
        status: RecommendationStatus,
        origin: PlanOrigin,
        fallback_terms: Option<PlanTerms>,
        prior_terms: Option<PlanTerms>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            borrower_id,
            manager_id,
            risk_tier,
            terms,
            status,
            origin,
            fallback_terms,
            prior_terms,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Marks the recommendation as sent to the borrower.
    pub fn send(&mut self) -> Result<(), DomainError> {
        self.transition(RecommendationStatus::Pending)
    }

    /// Accepts this recommendation; terminal.
    pub fn accept(&mut self) -> Result<(), DomainError> {
        self.transition(RecommendationStatus::Accepted)
    }

    /// Rejects this recommendation; terminal for the instance.
    pub fn reject(&mut self) -> Result<(), DomainError> {
        self.transition(RecommendationStatus::Rejected)
    }

    /// Marks this recommendation as superseded by a restore.
    pub fn supersede(&mut self) -> Result<(), DomainError> {
        self.transition(RecommendationStatus::Superseded)
    }

    /// Produces the auto-revised Pending successor after a primary rejection.
    ///
    /// The successor carries the retained Plan B terms and keeps a verbatim
    /// copy of this recommendation's Plan A terms for restore.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if this recommendation is not a rejected
    ///   primary, or no fallback terms were retained
    pub fn auto_revise(&self) -> Result<Recommendation, DomainError> {
        if self.origin != PlanOrigin::Primary || self.status != RecommendationStatus::Rejected {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Only a rejected primary recommendation can be auto-revised",
            ));
        }
        let fallback = self.fallback_terms.ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                "No fallback plan retained for auto-revision",
            )
        })?;

        let now = Timestamp::now();
        Ok(Recommendation {
            id: RecommendationId::new(),
            borrower_id: self.borrower_id,
            manager_id: self.manager_id,
            risk_tier: self.risk_tier,
            terms: fallback,
            status: RecommendationStatus::Pending,
            origin: PlanOrigin::AutoRevised,
            fallback_terms: None,
            prior_terms: Some(self.terms),
            created_at: now,
            updated_at: now,
        })
    }

    /// Produces the restored Pending recommendation from retained Plan A
    /// terms. Call on the auto-revised instance being restored over.
    ///
    /// # Errors
    ///
    /// - `NothingToRestore` if no prior plan terms were retained
    pub fn restored(&self) -> Result<Recommendation, DomainError> {
        let prior = self.prior_terms.ok_or_else(|| {
            DomainError::new(
                ErrorCode::NothingToRestore,
                "No prior plan retained to restore",
            )
        })?;

        let now = Timestamp::now();
        Ok(Recommendation {
            id: RecommendationId::new(),
            borrower_id: self.borrower_id,
            manager_id: self.manager_id,
            risk_tier: self.risk_tier,
            terms: prior,
            status: RecommendationStatus::Pending,
            origin: PlanOrigin::Primary,
            // Keep the revised terms around in case the restored plan is
            // rejected again.
            fallback_terms: Some(self.terms),
            prior_terms: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn transition(&mut self, target: RecommendationStatus) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &RecommendationId {
        &self.id
    }

    pub fn borrower_id(&self) -> &BorrowerId {
        &self.borrower_id
    }

    pub fn manager_id(&self) -> &ManagerId {
        &self.manager_id
    }

    pub fn risk_tier(&self) -> RiskTier {
        self.risk_tier
    }

    pub fn terms(&self) -> &PlanTerms {
        &self.terms
    }

    pub fn status(&self) -> RecommendationStatus {
        self.status
    }

    pub fn origin(&self) -> PlanOrigin {
        self.origin
    }

    pub fn fallback_terms(&self) -> Option<&PlanTerms> {
        self.fallback_terms.as_ref()
    }

    pub fn prior_terms(&self) -> Option<&PlanTerms> {
        self.prior_terms.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == RecommendationStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(emi: u64, tenure: u16, grace: u16) -> PlanTerms {
        PlanTerms {
            suggested_emi: emi,
            extended_tenure_months: tenure,
            grace_period_days: grace,
            interest_waiver_pct: 2,
        }
    }

    fn primary() -> Recommendation {
        Recommendation::primary(
            BorrowerId::new(),
            ManagerId::new(),
            RiskTier::High,
            terms(5_200, 9, 21),
            terms(4_400, 15, 30),
        )
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn draft_sends_to_pending() {
            let mut rec = primary();
            rec.send().unwrap();
            assert_eq!(rec.status(), RecommendationStatus::Pending);
        }

        #[test]
        fn pending_accepts() {
            let mut rec = primary();
            rec.send().unwrap();
            rec.accept().unwrap();
            assert_eq!(rec.status(), RecommendationStatus::Accepted);
        }

        #[test]
        fn draft_cannot_be_accepted_directly() {
            let mut rec = primary();
            let err = rec.accept().unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }

        #[test]
        fn accepted_is_terminal() {
            let mut rec = primary();
            rec.send().unwrap();
            rec.accept().unwrap();
            assert!(rec.reject().is_err());
            assert!(rec.status().is_terminal());
        }
    }

    mod auto_revision {
        use super::*;

        #[test]
        fn rejected_primary_auto_revises_to_plan_b() {
            let mut rec = primary();
            rec.send().unwrap();
            rec.reject().unwrap();

            let revised = rec.auto_revise().unwrap();
            assert_eq!(revised.origin(), PlanOrigin::AutoRevised);
            assert!(revised.is_pending());
            assert_eq!(revised.terms(), &terms(4_400, 15, 30));
            assert_eq!(revised.prior_terms(), Some(&terms(5_200, 9, 21)));
        }

        #[test]
        fn pending_primary_cannot_auto_revise() {
            let mut rec = primary();
            rec.send().unwrap();
            assert!(rec.auto_revise().is_err());
        }

        #[test]
        fn auto_revised_does_not_revise_further() {
            let mut rec = primary();
            rec.send().unwrap();
            rec.reject().unwrap();
            let mut revised = rec.auto_revise().unwrap();
            revised.reject().unwrap();
            assert!(revised.auto_revise().is_err());
        }
    }

    mod restore {
        use super::*;

        #[test]
        fn restore_reproduces_plan_a_exactly() {
            let mut rec = primary();
            rec.send().unwrap();
            rec.reject().unwrap();
            let revised = rec.auto_revise().unwrap();

            let restored = revised.restored().unwrap();
            assert_eq!(restored.terms(), rec.terms());
            assert_eq!(restored.origin(), PlanOrigin::Primary);
            assert!(restored.is_pending());
        }

        #[test]
        fn restore_without_retained_prior_fails_not_found() {
            let rec = primary();
            let err = rec.restored().unwrap_err();
            assert_eq!(err.code, ErrorCode::NothingToRestore);
        }

        #[test]
        fn rejected_auto_revision_can_be_superseded() {
            let mut rec = primary();
            rec.send().unwrap();
            rec.reject().unwrap();
            let mut revised = rec.auto_revise().unwrap();
            revised.reject().unwrap();
            assert!(revised.supersede().is_ok());
        }
    }
}
