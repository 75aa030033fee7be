//! Borrower store port.
//!
//! The borrower record lives in an external system. The engine reads loan
//! facts and writes back only the risk tier, the plan-acceptance status, and
//! the behavioral profile; it never owns the borrower lifecycle.

use async_trait::async_trait;

use crate::domain::borrower::{BehavioralProfile, Borrower, PlanStatus, RiskTier};
use crate::domain::foundation::{BorrowerId, DomainError};

/// Read/write access to the external borrower store.
#[async_trait]
pub trait BorrowerStore: Send + Sync {
    /// Fetches a borrower snapshot.
    ///
    /// Returns `None` if the borrower does not exist.
    async fn find(&self, id: &BorrowerId) -> Result<Option<Borrower>, DomainError>;

    /// Lists borrowers eligible for outreach: overdue at least
    /// `min_overdue_days` and not on an accepted plan, most-overdue first,
    /// capped at `limit`.
    async fn list_overdue(
        &self,
        min_overdue_days: u32,
        limit: usize,
    ) -> Result<Vec<Borrower>, DomainError>;

    /// Writes the borrower's risk tier.
    async fn update_risk_tier(
        &self,
        id: &BorrowerId,
        tier: RiskTier,
    ) -> Result<(), DomainError>;

    /// Writes the borrower's plan-acceptance status.
    async fn update_plan_status(
        &self,
        id: &BorrowerId,
        status: PlanStatus,
    ) -> Result<(), DomainError>;

    /// Writes the behavioral profile produced by the classifier.
    async fn update_behavioral_profile(
        &self,
        id: &BorrowerId,
        profile: BehavioralProfile,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrower_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn BorrowerStore) {}
    }
}
