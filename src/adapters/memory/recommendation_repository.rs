//! In-memory recommendation repository for testing.
//!
//! # Panics
//!
//! Methods may panic if internal locks are poisoned. Acceptable for test
//! code; not for production use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{BorrowerId, DomainError, RecommendationId};
use crate::domain::plan::Recommendation;
use crate::ports::RecommendationRepository;

pub struct InMemoryRecommendationRepository {
    recommendations: RwLock<HashMap<RecommendationId, Recommendation>>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self {
            recommendations: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Returns every recommendation for a borrower, oldest first (for test
    /// assertions).
    pub fn history_for(&self, borrower_id: &BorrowerId) -> Vec<Recommendation> {
        let mut history: Vec<Recommendation> = self
            .recommendations
            .read()
            .expect("InMemoryRecommendationRepository: lock poisoned")
            .values()
            .filter(|r| r.borrower_id() == borrower_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            a.created_at()
                .as_datetime()
                .cmp(&b.created_at().as_datetime())
        });
        history
    }
}

impl Default for InMemoryRecommendationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecommendationRepository for InMemoryRecommendationRepository {
    async fn save(&self, recommendation: Recommendation) -> Result<(), DomainError> {
        self.recommendations
            .write()
            .expect("InMemoryRecommendationRepository: lock poisoned")
            .insert(*recommendation.id(), recommendation);
        Ok(())
    }

    async fn update(&self, recommendation: Recommendation) -> Result<(), DomainError> {
        let mut recommendations = self
            .recommendations
            .write()
            .expect("InMemoryRecommendationRepository: lock poisoned");
        if !recommendations.contains_key(recommendation.id()) {
            return Err(DomainError::recommendation_not_found(recommendation.id()));
        }
        recommendations.insert(*recommendation.id(), recommendation);
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &RecommendationId,
    ) -> Result<Option<Recommendation>, DomainError> {
        Ok(self
            .recommendations
            .read()
            .expect("InMemoryRecommendationRepository: lock poisoned")
            .get(id)
            .cloned())
    }

    async fn find_pending_by_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Recommendation>, DomainError> {
        Ok(self
            .recommendations
            .read()
            .expect("InMemoryRecommendationRepository: lock poisoned")
            .values()
            .find(|r| r.borrower_id() == borrower_id && r.is_pending())
            .cloned())
    }

    async fn latest_for_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Recommendation>, DomainError> {
        Ok(self.history_for(borrower_id).pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::borrower::RiskTier;
    use crate::domain::foundation::ManagerId;
    use crate::domain::plan::PlanTerms;

    fn terms(emi: u64) -> PlanTerms {
        PlanTerms {
            suggested_emi: emi,
            extended_tenure_months: 9,
            grace_period_days: 21,
            interest_waiver_pct: 0,
        }
    }

    fn draft(borrower: BorrowerId) -> Recommendation {
        Recommendation::primary(
            borrower,
            ManagerId::new(),
            RiskTier::High,
            terms(5_200),
            terms(4_400),
        )
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = InMemoryRecommendationRepository::new();
        let rec = draft(BorrowerId::new());
        let id = *rec.id();
        repo.save(rec).await.unwrap();

        assert!(repo.find_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn find_pending_ignores_drafts_and_terminal_statuses() {
        let repo = InMemoryRecommendationRepository::new();
        let borrower = BorrowerId::new();
        repo.save(draft(borrower)).await.unwrap();
        assert!(repo
            .find_pending_by_borrower(&borrower)
            .await
            .unwrap()
            .is_none());

        let mut sent = draft(borrower);
        sent.send().unwrap();
        let sent_id = *sent.id();
        repo.save(sent).await.unwrap();
        let pending = repo
            .find_pending_by_borrower(&borrower)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.id(), &sent_id);
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let repo = InMemoryRecommendationRepository::new();
        let err = repo.update(draft(BorrowerId::new())).await.unwrap_err();
        assert!(err.code.is_not_found());
    }

    #[tokio::test]
    async fn latest_returns_most_recently_created() {
        let repo = InMemoryRecommendationRepository::new();
        let borrower = BorrowerId::new();
        let first = draft(borrower);
        repo.save(first.clone()).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = draft(borrower);
        let second_id = *second.id();
        repo.save(second).await.unwrap();

        let latest = repo.latest_for_borrower(&borrower).await.unwrap().unwrap();
        assert_eq!(latest.id(), &second_id);
    }
}
