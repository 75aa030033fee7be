//! In-memory borrower store for testing.
//!
//! # Panics
//!
//! Methods may panic if internal locks are poisoned. Acceptable for test
//! code; not for production use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::borrower::{BehavioralProfile, Borrower, PlanStatus, RiskTier};
use crate::domain::foundation::{BorrowerId, DomainError};
use crate::ports::BorrowerStore;

pub struct InMemoryBorrowerStore {
    borrowers: RwLock<HashMap<BorrowerId, Borrower>>,
}

impl InMemoryBorrowerStore {
    pub fn new() -> Self {
        Self {
            borrowers: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Seeds a borrower record.
    pub fn insert(&self, borrower: Borrower) {
        self.borrowers
            .write()
            .expect("InMemoryBorrowerStore: lock poisoned")
            .insert(borrower.id, borrower);
    }

    /// Returns the current snapshot of a borrower (for test assertions).
    pub fn get(&self, id: &BorrowerId) -> Option<Borrower> {
        self.borrowers
            .read()
            .expect("InMemoryBorrowerStore: lock poisoned")
            .get(id)
            .cloned()
    }
}

impl Default for InMemoryBorrowerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BorrowerStore for InMemoryBorrowerStore {
    async fn find(&self, id: &BorrowerId) -> Result<Option<Borrower>, DomainError> {
        Ok(self.get(id))
    }

    async fn list_overdue(
        &self,
        min_overdue_days: u32,
        limit: usize,
    ) -> Result<Vec<Borrower>, DomainError> {
        let mut eligible: Vec<Borrower> = self
            .borrowers
            .read()
            .expect("InMemoryBorrowerStore: lock poisoned")
            .values()
            .filter(|b| b.eligible_for_outreach(min_overdue_days))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| b.overdue_days.cmp(&a.overdue_days));
        eligible.truncate(limit);
        Ok(eligible)
    }

    async fn update_risk_tier(
        &self,
        id: &BorrowerId,
        tier: RiskTier,
    ) -> Result<(), DomainError> {
        let mut borrowers = self
            .borrowers
            .write()
            .expect("InMemoryBorrowerStore: lock poisoned");
        let borrower = borrowers
            .get_mut(id)
            .ok_or_else(|| DomainError::borrower_not_found(id))?;
        borrower.risk_tier = tier;
        Ok(())
    }

    async fn update_plan_status(
        &self,
        id: &BorrowerId,
        status: PlanStatus,
    ) -> Result<(), DomainError> {
        let mut borrowers = self
            .borrowers
            .write()
            .expect("InMemoryBorrowerStore: lock poisoned");
        let borrower = borrowers
            .get_mut(id)
            .ok_or_else(|| DomainError::borrower_not_found(id))?;
        borrower.plan_status = status;
        Ok(())
    }

    async fn update_behavioral_profile(
        &self,
        id: &BorrowerId,
        profile: BehavioralProfile,
    ) -> Result<(), DomainError> {
        let mut borrowers = self
            .borrowers
            .write()
            .expect("InMemoryBorrowerStore: lock poisoned");
        let borrower = borrowers
            .get_mut(id)
            .ok_or_else(|| DomainError::borrower_not_found(id))?;
        borrower.behavioral_profile = Some(profile);
        Ok(())
    }
}
