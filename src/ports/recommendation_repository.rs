//! Recommendation repository port.

use async_trait::async_trait;

use crate::domain::foundation::{BorrowerId, DomainError, RecommendationId};
use crate::domain::plan::Recommendation;

#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Persists a new recommendation.
    async fn save(&self, recommendation: Recommendation) -> Result<(), DomainError>;

    /// Persists changes to an existing recommendation.
    ///
    /// # Errors
    ///
    /// - `RecommendationNotFound` if the recommendation does not exist
    async fn update(&self, recommendation: Recommendation) -> Result<(), DomainError>;

    /// Finds a recommendation by id.
    async fn find_by_id(
        &self,
        id: &RecommendationId,
    ) -> Result<Option<Recommendation>, DomainError>;

    /// Finds the borrower's pending recommendation, if any. At most one
    /// recommendation is pending per borrower at a time.
    async fn find_pending_by_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Recommendation>, DomainError>;

    /// Returns the borrower's most recently created recommendation in any
    /// status.
    async fn latest_for_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Recommendation>, DomainError>;
}
