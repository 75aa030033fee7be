//! Recommendation lifecycle: generate, send, decide, revise, restore.
//!
//! Decisions drive the negotiation protocol: a rejected primary plan is
//! immediately auto-revised to the retained fallback terms and re-offered; a
//! rejected auto-revision ends automatic negotiation and hands the case to a
//! human. An explicit restore supersedes the current offer and reproduces
//! the original terms exactly.

use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::domain::borrower::{Borrower, PlanStatus};
use crate::domain::conversation::{templates, Conversation, ConversationPhase};
use crate::domain::foundation::{
    BorrowerId, DomainError, ErrorCode, ManagerId, Notification, RecommendationId,
};
use crate::domain::plan::{PlanGenerator, PlanOrigin, Recommendation};
use crate::ports::{
    BorrowerStore, ConversationRepository, NotificationSink, RecommendationRepository,
};

use crate::application::locks::BorrowerLocks;
use crate::application::outbound::Outbound;

// ─────────────────────────────────────────────────────────────────────────
// Generate
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GenerateRecommendationCommand {
    pub borrower_id: BorrowerId,
    /// Manager requesting the draft; falls back to the borrower's assigned
    /// manager.
    pub requested_by: Option<ManagerId>,
}

pub struct GenerateRecommendationHandler {
    borrowers: Arc<dyn BorrowerStore>,
    recommendations: Arc<dyn RecommendationRepository>,
    plan_generator: PlanGenerator,
    default_manager: ManagerId,
}

impl GenerateRecommendationHandler {
    pub fn new(
        borrowers: Arc<dyn BorrowerStore>,
        recommendations: Arc<dyn RecommendationRepository>,
        plan_generator: PlanGenerator,
        default_manager: ManagerId,
    ) -> Self {
        Self {
            borrowers,
            recommendations,
            plan_generator,
            default_manager,
        }
    }

    /// Drafts a primary recommendation from the borrower's current risk
    /// tier without sending anything.
    ///
    /// # Errors
    ///
    /// - `BorrowerNotFound`
    /// - `PendingRecommendationExists` if one is already awaiting a decision
    pub async fn handle(
        &self,
        cmd: GenerateRecommendationCommand,
    ) -> Result<Recommendation, DomainError> {
        let borrower = self
            .borrowers
            .find(&cmd.borrower_id)
            .await?
            .ok_or_else(|| DomainError::borrower_not_found(&cmd.borrower_id))?;

        if self
            .recommendations
            .find_pending_by_borrower(&borrower.id)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::PendingRecommendationExists,
                format!("Borrower {} already has a pending recommendation", borrower.id),
            ));
        }

        let pair = self.plan_generator.generate(
            borrower.effective_emi(),
            borrower.overdue_days,
            borrower.risk_tier,
        );
        let manager = cmd
            .requested_by
            .or(borrower.assigned_manager)
            .unwrap_or(self.default_manager);
        let recommendation = Recommendation::primary(
            borrower.id,
            manager,
            borrower.risk_tier,
            pair.plan_a,
            pair.plan_b,
        );
        self.recommendations.save(recommendation.clone()).await?;
        info!(
            borrower_id = %borrower.id,
            recommendation_id = %recommendation.id(),
            tier = %borrower.risk_tier,
            "recommendation drafted"
        );
        Ok(recommendation)
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Send
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SendRecommendationCommand {
    pub recommendation_id: RecommendationId,
}

pub struct SendRecommendationHandler {
    borrowers: Arc<dyn BorrowerStore>,
    conversations: Arc<dyn ConversationRepository>,
    recommendations: Arc<dyn RecommendationRepository>,
    outbound: Arc<Outbound>,
    locks: Arc<BorrowerLocks>,
}

impl SendRecommendationHandler {
    pub fn new(
        borrowers: Arc<dyn BorrowerStore>,
        conversations: Arc<dyn ConversationRepository>,
        recommendations: Arc<dyn RecommendationRepository>,
        outbound: Arc<Outbound>,
        locks: Arc<BorrowerLocks>,
    ) -> Self {
        Self {
            borrowers,
            conversations,
            recommendations,
            outbound,
            locks,
        }
    }

    /// Sends a drafted recommendation to the borrower and moves the
    /// conversation to `PlanSuggested`.
    ///
    /// # Errors
    ///
    /// - `PendingRecommendationExists` if another offer is already awaiting
    ///   a decision; drafts can pile up, pending offers cannot
    pub async fn handle(
        &self,
        cmd: SendRecommendationCommand,
    ) -> Result<Recommendation, DomainError> {
        let mut recommendation = self
            .recommendations
            .find_by_id(&cmd.recommendation_id)
            .await?
            .ok_or_else(|| DomainError::recommendation_not_found(&cmd.recommendation_id))?;

        let _guard = self.locks.acquire(recommendation.borrower_id()).await;

        let borrower = self
            .borrowers
            .find(recommendation.borrower_id())
            .await?
            .ok_or_else(|| DomainError::borrower_not_found(recommendation.borrower_id()))?;

        if self
            .recommendations
            .find_pending_by_borrower(&borrower.id)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::PendingRecommendationExists,
                format!("Borrower {} already has a pending recommendation", borrower.id),
            ));
        }

        recommendation.send()?;

        let content = templates::plan_proposal(&borrower.name, recommendation.terms());
        let message = self
            .outbound
            .send_automated(
                &borrower,
                *recommendation.manager_id(),
                content,
                ConversationPhase::PlanSuggested,
                None,
            )
            .await?;

        self.recommendations.update(recommendation.clone()).await?;
        self.borrowers
            .update_plan_status(&borrower.id, PlanStatus::Pending)
            .await?;
        suggest_in_conversation(&self.conversations, &borrower, *message.id()).await?;

        info!(
            recommendation_id = %recommendation.id(),
            borrower_id = %borrower.id,
            "recommendation sent"
        );
        Ok(recommendation)
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Decide (accept / reject with auto-revision)
// ─────────────────────────────────────────────────────────────────────────

/// Borrower's decision on a pending recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
pub struct DecideRecommendationCommand {
    pub recommendation_id: RecommendationId,
    pub decision: PlanDecision,
}

#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// The decided recommendation in its final status.
    pub recommendation: Recommendation,
    /// Auto-revised successor offer, present only after a primary
    /// rejection.
    pub successor: Option<Recommendation>,
}

pub struct DecideRecommendationHandler {
    borrowers: Arc<dyn BorrowerStore>,
    conversations: Arc<dyn ConversationRepository>,
    recommendations: Arc<dyn RecommendationRepository>,
    outbound: Arc<Outbound>,
    notifications: Arc<dyn NotificationSink>,
    locks: Arc<BorrowerLocks>,
}

impl DecideRecommendationHandler {
    pub fn new(
        borrowers: Arc<dyn BorrowerStore>,
        conversations: Arc<dyn ConversationRepository>,
        recommendations: Arc<dyn RecommendationRepository>,
        outbound: Arc<Outbound>,
        notifications: Arc<dyn NotificationSink>,
        locks: Arc<BorrowerLocks>,
    ) -> Self {
        Self {
            borrowers,
            conversations,
            recommendations,
            outbound,
            notifications,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: DecideRecommendationCommand,
    ) -> Result<DecisionOutcome, DomainError> {
        let mut recommendation = self
            .recommendations
            .find_by_id(&cmd.recommendation_id)
            .await?
            .ok_or_else(|| DomainError::recommendation_not_found(&cmd.recommendation_id))?;

        let _guard = self.locks.acquire(recommendation.borrower_id()).await;

        let borrower = self
            .borrowers
            .find(recommendation.borrower_id())
            .await?
            .ok_or_else(|| DomainError::borrower_not_found(recommendation.borrower_id()))?;

        match cmd.decision {
            PlanDecision::Accept => self.accept(&borrower, &mut recommendation).await,
            PlanDecision::Reject => self.reject(&borrower, &mut recommendation).await,
        }
    }

    async fn accept(
        &self,
        borrower: &Borrower,
        recommendation: &mut Recommendation,
    ) -> Result<DecisionOutcome, DomainError> {
        recommendation.accept()?;
        self.recommendations.update(recommendation.clone()).await?;
        self.borrowers
            .update_plan_status(&borrower.id, PlanStatus::Accepted)
            .await?;

        let content = templates::acceptance_confirmation(recommendation.terms());
        let message = self
            .outbound
            .send_automated(
                borrower,
                *recommendation.manager_id(),
                content,
                ConversationPhase::PlanAccepted,
                None,
            )
            .await?;

        if let Some(mut conversation) = self
            .conversations
            .find_active_by_borrower(&borrower.id)
            .await?
        {
            if conversation.phase() == ConversationPhase::PlanSuggested {
                conversation.advance(ConversationPhase::PlanAccepted)?;
            }
            conversation.record_message(*message.id());
            self.conversations.update(conversation).await?;
        }

        self.notifications
            .notify(
                recommendation.manager_id(),
                Notification::new(
                    "Plan Accepted",
                    format!("{} accepted the restructured payment plan", borrower.name),
                    json!({
                        "borrower_id": borrower.id.to_string(),
                        "recommendation_id": recommendation.id().to_string(),
                        "suggested_emi": recommendation.terms().suggested_emi,
                    }),
                ),
            )
            .await?;

        info!(recommendation_id = %recommendation.id(), "plan accepted");
        Ok(DecisionOutcome {
            recommendation: recommendation.clone(),
            successor: None,
        })
    }

    async fn reject(
        &self,
        borrower: &Borrower,
        recommendation: &mut Recommendation,
    ) -> Result<DecisionOutcome, DomainError> {
        recommendation.reject()?;
        self.recommendations.update(recommendation.clone()).await?;
        self.borrowers
            .update_plan_status(&borrower.id, PlanStatus::Rejected)
            .await?;

        let decline = self
            .outbound
            .send_automated(
                borrower,
                *recommendation.manager_id(),
                templates::rejection_notice(),
                ConversationPhase::PlanRejected,
                None,
            )
            .await?;
        if let Some(mut conversation) = self
            .conversations
            .find_active_by_borrower(&borrower.id)
            .await?
        {
            if conversation.phase() == ConversationPhase::PlanSuggested {
                conversation.advance(ConversationPhase::PlanRejected)?;
            }
            conversation.record_message(*decline.id());
            self.conversations.update(conversation).await?;
        }

        if recommendation.origin() == PlanOrigin::AutoRevised {
            // Automatic negotiation is exhausted; a human takes over.
            self.notifications
                .notify(
                    recommendation.manager_id(),
                    Notification::new(
                        "Negotiation Exhausted",
                        format!(
                            "{} declined the revised plan as well. Manual follow-up required.",
                            borrower.name
                        ),
                        json!({
                            "borrower_id": borrower.id.to_string(),
                            "recommendation_id": recommendation.id().to_string(),
                        }),
                    ),
                )
                .await?;
            info!(recommendation_id = %recommendation.id(), "revised plan rejected, negotiation exhausted");
            return Ok(DecisionOutcome {
                recommendation: recommendation.clone(),
                successor: None,
            });
        }

        // Primary rejection: immediately counter with the retained fallback.
        let successor = recommendation.auto_revise()?;
        self.recommendations.save(successor.clone()).await?;
        self.borrowers
            .update_plan_status(&borrower.id, PlanStatus::Pending)
            .await?;

        let content = templates::revised_plan_offer(&borrower.name, successor.terms());
        let message = self
            .outbound
            .send_automated(
                borrower,
                *successor.manager_id(),
                content,
                ConversationPhase::PlanSuggested,
                None,
            )
            .await?;
        suggest_in_conversation(&self.conversations, borrower, *message.id()).await?;

        info!(
            rejected = %recommendation.id(),
            successor = %successor.id(),
            "primary plan rejected, auto-revised offer sent"
        );
        Ok(DecisionOutcome {
            recommendation: recommendation.clone(),
            successor: Some(successor),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Restore
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RestoreRecommendationCommand {
    pub borrower_id: BorrowerId,
}

pub struct RestoreRecommendationHandler {
    borrowers: Arc<dyn BorrowerStore>,
    conversations: Arc<dyn ConversationRepository>,
    recommendations: Arc<dyn RecommendationRepository>,
    outbound: Arc<Outbound>,
    locks: Arc<BorrowerLocks>,
}

impl RestoreRecommendationHandler {
    pub fn new(
        borrowers: Arc<dyn BorrowerStore>,
        conversations: Arc<dyn ConversationRepository>,
        recommendations: Arc<dyn RecommendationRepository>,
        outbound: Arc<Outbound>,
        locks: Arc<BorrowerLocks>,
    ) -> Self {
        Self {
            borrowers,
            conversations,
            recommendations,
            outbound,
            locks,
        }
    }

    /// Supersedes the borrower's current (auto-revised) offer and re-offers
    /// the retained original terms verbatim.
    ///
    /// # Errors
    ///
    /// - `NothingToRestore` when no recommendation with retained prior
    ///   terms exists
    pub async fn handle(
        &self,
        cmd: RestoreRecommendationCommand,
    ) -> Result<Recommendation, DomainError> {
        let _guard = self.locks.acquire(&cmd.borrower_id).await;

        let borrower = self
            .borrowers
            .find(&cmd.borrower_id)
            .await?
            .ok_or_else(|| DomainError::borrower_not_found(&cmd.borrower_id))?;

        let mut current = self
            .recommendations
            .latest_for_borrower(&borrower.id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::NothingToRestore,
                    format!("Borrower {} has no recommendation to restore", borrower.id),
                )
            })?;

        let restored = current.restored()?;
        current.supersede()?;
        self.recommendations.update(current).await?;
        self.recommendations.save(restored.clone()).await?;
        self.borrowers
            .update_plan_status(&borrower.id, PlanStatus::Pending)
            .await?;

        let content = templates::plan_proposal(&borrower.name, restored.terms());
        let message = self
            .outbound
            .send_automated(
                &borrower,
                *restored.manager_id(),
                content,
                ConversationPhase::PlanSuggested,
                None,
            )
            .await?;
        suggest_in_conversation(&self.conversations, &borrower, *message.id()).await?;

        info!(
            borrower_id = %borrower.id,
            restored = %restored.id(),
            "original plan restored"
        );
        Ok(restored)
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Query
// ─────────────────────────────────────────────────────────────────────────

pub struct LatestRecommendationHandler {
    recommendations: Arc<dyn RecommendationRepository>,
}

impl LatestRecommendationHandler {
    pub fn new(recommendations: Arc<dyn RecommendationRepository>) -> Self {
        Self { recommendations }
    }

    pub async fn handle(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Recommendation>, DomainError> {
        self.recommendations.latest_for_borrower(borrower_id).await
    }
}

/// Moves (or creates) the borrower's conversation into `PlanSuggested` and
/// records the offer message.
async fn suggest_in_conversation(
    conversations: &Arc<dyn ConversationRepository>,
    borrower: &Borrower,
    message_id: crate::domain::foundation::MessageId,
) -> Result<(), DomainError> {
    match conversations.find_active_by_borrower(&borrower.id).await? {
        Some(mut conversation) => {
            if conversation.phase() != ConversationPhase::PlanSuggested {
                conversation.advance(ConversationPhase::PlanSuggested)?;
            }
            conversation.record_message(message_id);
            conversations.update(conversation).await
        }
        None => {
            let mut conversation = Conversation::start(borrower.id);
            conversation.advance(ConversationPhase::PlanSuggested)?;
            conversation.record_message(message_id);
            conversations.save(conversation).await
        }
    }
}
