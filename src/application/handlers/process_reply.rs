//! Inbound reply processing: the heart of the negotiation loop.
//!
//! One borrower reply comes in; under the borrower's lock the engine logs
//! it, classifies it, mirrors the assessment onto the borrower record,
//! escalates crisis signals, and decides whether to answer with relief
//! plans or a plain acknowledgment. A failure while composing the response
//! falls back to a generic message so the borrower never sees internal
//! error detail.

use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::domain::borrower::{BehavioralProfile, Borrower, PlanStatus, RiskTier};
use crate::domain::classifier::{Assessment, ClassificationInput, StressLevel, Willingness};
use crate::domain::conversation::{templates, Conversation, ConversationPhase, Message};
use crate::domain::foundation::{
    BorrowerId, DomainError, ManagerId, MessageId, Notification, Timestamp,
};
use crate::domain::plan::{PlanGenerator, PlanPair, Recommendation};
use crate::ports::{
    BorrowerStore, ConversationRepository, MessageLog, NotificationSink,
    RecommendationRepository, ScoringStrategy,
};

use crate::application::locks::BorrowerLocks;
use crate::application::outbound::Outbound;

#[derive(Debug, Clone)]
pub struct ProcessReplyCommand {
    pub borrower_id: BorrowerId,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub assessment: Assessment,
    pub crisis_escalated: bool,
    pub plans_offered: bool,
    /// Id of the automated response message, when one went out.
    pub response_message_id: Option<MessageId>,
    /// True when composing the real response failed and the generic
    /// fallback was sent instead.
    pub fell_back: bool,
}

pub struct ProcessReplyHandler {
    borrowers: Arc<dyn BorrowerStore>,
    conversations: Arc<dyn ConversationRepository>,
    recommendations: Arc<dyn RecommendationRepository>,
    messages: Arc<dyn MessageLog>,
    outbound: Arc<Outbound>,
    notifications: Arc<dyn NotificationSink>,
    scoring: Arc<dyn ScoringStrategy>,
    plan_generator: PlanGenerator,
    locks: Arc<BorrowerLocks>,
    config: EngineConfig,
    default_manager: ManagerId,
}

impl ProcessReplyHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        borrowers: Arc<dyn BorrowerStore>,
        conversations: Arc<dyn ConversationRepository>,
        recommendations: Arc<dyn RecommendationRepository>,
        messages: Arc<dyn MessageLog>,
        outbound: Arc<Outbound>,
        notifications: Arc<dyn NotificationSink>,
        scoring: Arc<dyn ScoringStrategy>,
        plan_generator: PlanGenerator,
        locks: Arc<BorrowerLocks>,
        config: EngineConfig,
        default_manager: ManagerId,
    ) -> Self {
        Self {
            borrowers,
            conversations,
            recommendations,
            messages,
            outbound,
            notifications,
            scoring,
            plan_generator,
            locks,
            config,
            default_manager,
        }
    }

    pub async fn handle(&self, cmd: ProcessReplyCommand) -> Result<ReplyOutcome, DomainError> {
        let _guard = self.locks.acquire(&cmd.borrower_id).await;

        let borrower = self
            .borrowers
            .find(&cmd.borrower_id)
            .await?
            .ok_or_else(|| DomainError::borrower_not_found(&cmd.borrower_id))?;
        let manager = borrower.assigned_manager.unwrap_or(self.default_manager);

        // Ensure there is an active conversation to anchor the exchange.
        let mut conversation = match self
            .conversations
            .find_active_by_borrower(&borrower.id)
            .await?
        {
            Some(conversation) => conversation,
            None => {
                let conversation = Conversation::start(borrower.id);
                self.conversations.save(conversation.clone()).await?;
                conversation
            }
        };

        // Log the inbound message with a quick stress annotation.
        let sentiment = self.scoring.quick_sentiment(&cmd.content);
        let inbound = Message::from_borrower(
            borrower.id,
            manager,
            cmd.content.clone(),
            sentiment,
            conversation.phase(),
        )?;
        self.messages.append(inbound.clone()).await?;
        conversation.record_message(*inbound.id());
        self.conversations.update(conversation.clone()).await?;

        // Classify with recent history as trend context.
        let recent_stress = self.recent_stress(&borrower.id).await?;
        let assessment = self.scoring.assess(&ClassificationInput {
            content: cmd.content.clone(),
            overdue_days: borrower.overdue_days,
            is_overdue: borrower.is_overdue,
            loan_amount: borrower.loan_amount,
            outstanding_balance: borrower.outstanding_balance,
            emi_amount: borrower.emi_amount,
            recent_stress,
        });
        info!(
            borrower_id = %borrower.id,
            tier = %assessment.risk_tier,
            score = assessment.composite_score,
            crisis = assessment.crisis,
            "reply classified"
        );

        self.sync_borrower(&borrower, &assessment).await?;

        let crisis_escalated = assessment.crisis;
        if crisis_escalated {
            self.escalate_crisis(&borrower, manager, &assessment, &mut conversation)
                .await?;
        }

        match self
            .respond(&borrower, manager, &cmd.content, &assessment, &mut conversation)
            .await
        {
            Ok((plans_offered, response_message_id)) => Ok(ReplyOutcome {
                assessment,
                crisis_escalated,
                plans_offered,
                response_message_id,
                fell_back: false,
            }),
            Err(err) => {
                error!(borrower_id = %borrower.id, error = %err, "response composition failed, sending fallback");
                let fallback_id = self
                    .send_fallback(&borrower, manager, &mut conversation)
                    .await;
                Ok(ReplyOutcome {
                    assessment,
                    crisis_escalated,
                    plans_offered: false,
                    response_message_id: fallback_id,
                    fell_back: true,
                })
            }
        }
    }

    /// Stress labels of the borrower's recent messages, oldest first.
    async fn recent_stress(&self, borrower_id: &BorrowerId) -> Result<Vec<StressLevel>, DomainError> {
        Ok(self
            .messages
            .tail(borrower_id, self.config.recent_messages_window)
            .await?
            .iter()
            .filter(|m| m.is_from_borrower())
            .filter_map(|m| m.sentiment())
            .collect())
    }

    /// Mirrors the assessment onto the external borrower record.
    async fn sync_borrower(
        &self,
        borrower: &Borrower,
        assessment: &Assessment,
    ) -> Result<(), DomainError> {
        self.borrowers
            .update_risk_tier(&borrower.id, assessment.risk_tier)
            .await?;
        self.borrowers
            .update_behavioral_profile(
                &borrower.id,
                BehavioralProfile {
                    stress: assessment.stress,
                    primary_issue: assessment.primary_issue.label().to_string(),
                    willingness: assessment.willingness,
                    insight: assessment.insight.clone(),
                    analyzed_at: Timestamp::now(),
                },
            )
            .await
    }

    async fn escalate_crisis(
        &self,
        borrower: &Borrower,
        manager: ManagerId,
        assessment: &Assessment,
        conversation: &mut Conversation,
    ) -> Result<(), DomainError> {
        warn!(borrower_id = %borrower.id, "crisis signal detected, escalating");
        conversation.apply_crisis_override()?;
        self.conversations.update(conversation.clone()).await?;
        self.notifications
            .notify(
                &manager,
                Notification::new(
                    "Crisis Escalation",
                    format!(
                        "{} sent a message flagged as a crisis ({}). Immediate review advised.",
                        borrower.name,
                        assessment.primary_issue.label()
                    ),
                    json!({
                        "borrower_id": borrower.id.to_string(),
                        "risk_tier": RiskTier::Critical.label(),
                        "composite_score": assessment.composite_score,
                    }),
                ),
            )
            .await
    }

    /// Chooses and sends the automated response. Returns whether plans went
    /// out and the response message id.
    async fn respond(
        &self,
        borrower: &Borrower,
        manager: ManagerId,
        content: &str,
        assessment: &Assessment,
        conversation: &mut Conversation,
    ) -> Result<(bool, Option<MessageId>), DomainError> {
        if self.should_offer_plans(borrower, content, assessment).await? {
            let message_id = self
                .offer_plans(borrower, manager, assessment, conversation)
                .await?;
            return Ok((true, Some(message_id)));
        }

        let content = templates::acknowledgment(&borrower.name, assessment);
        let message = self
            .outbound
            .send_automated(borrower, manager, content, conversation.phase(), None)
            .await?;
        conversation.record_message(*message.id());
        self.conversations.update(conversation.clone()).await?;
        Ok((false, Some(*message.id())))
    }

    /// Plans go out when the borrower asks for them, when distress warrants
    /// a proactive offer, or when a crisis forces one. Never while a
    /// recommendation is already pending, never after acceptance, and never
    /// inside the resend cooldown (crisis bypasses the cooldown).
    async fn should_offer_plans(
        &self,
        borrower: &Borrower,
        content: &str,
        assessment: &Assessment,
    ) -> Result<bool, DomainError> {
        if borrower.plan_status == PlanStatus::Accepted {
            return Ok(false);
        }
        if self
            .recommendations
            .find_pending_by_borrower(&borrower.id)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let requested = self.scoring.detect_plan_request(content);
        let distressed = assessment.stress >= StressLevel::High
            || assessment.willingness == Willingness::Struggling
            || (borrower.overdue_days >= self.config.plan_offer_overdue_days
                && assessment.stress >= StressLevel::Moderate);
        if !(assessment.crisis || requested || distressed) {
            return Ok(false);
        }
        if assessment.crisis {
            return Ok(true);
        }

        // Resend cooldown: look for the last automated plan offer.
        let recent = self
            .messages
            .tail(&borrower.id, self.config.recent_messages_window)
            .await?;
        let recently_offered = recent.iter().any(|m| {
            m.plans_offered().is_some()
                && Timestamp::now().hours_since(m.created_at())
                    < self.config.plan_resend_cooldown_hours
        });
        Ok(!recently_offered)
    }

    async fn offer_plans(
        &self,
        borrower: &Borrower,
        manager: ManagerId,
        assessment: &Assessment,
        conversation: &mut Conversation,
    ) -> Result<MessageId, DomainError> {
        let pair: PlanPair = self.plan_generator.generate(
            borrower.effective_emi(),
            borrower.overdue_days,
            assessment.risk_tier,
        );

        let mut recommendation = Recommendation::primary(
            borrower.id,
            manager,
            assessment.risk_tier,
            pair.plan_a,
            pair.plan_b,
        );
        recommendation.send()?;
        self.recommendations.save(recommendation).await?;
        self.borrowers
            .update_plan_status(&borrower.id, PlanStatus::Pending)
            .await?;

        let content = templates::plan_offer(&borrower.name, assessment, &pair);
        let message = self
            .outbound
            .send_automated(
                borrower,
                manager,
                content,
                ConversationPhase::PlanSuggested,
                Some(pair),
            )
            .await?;

        if conversation.phase() != ConversationPhase::PlanSuggested {
            conversation.advance(ConversationPhase::PlanSuggested)?;
        }
        conversation.record_message(*message.id());
        self.conversations.update(conversation.clone()).await?;
        Ok(*message.id())
    }

    /// Best-effort generic reply; never propagates its own failure.
    async fn send_fallback(
        &self,
        borrower: &Borrower,
        manager: ManagerId,
        conversation: &mut Conversation,
    ) -> Option<MessageId> {
        let content = templates::generic_fallback(&borrower.name);
        match self
            .outbound
            .send_automated(borrower, manager, content, conversation.phase(), None)
            .await
        {
            Ok(message) => {
                conversation.record_message(*message.id());
                if let Err(err) = self.conversations.update(conversation.clone()).await {
                    warn!(borrower_id = %borrower.id, error = %err, "failed to record fallback message");
                }
                Some(*message.id())
            }
            Err(err) => {
                warn!(borrower_id = %borrower.id, error = %err, "fallback message could not be sent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::adapters::memory::{
        InMemoryBorrowerStore, InMemoryConversationRepository, InMemoryMessageLog,
        InMemoryNotificationSink, InMemoryRecommendationRepository,
    };
    use crate::adapters::sms::DemoChannel;
    use crate::application::dispatcher::DeliveryDispatcher;
    use crate::domain::classifier::KeywordRubric;
    use crate::domain::plan::RecommendationStatus;

    struct Fixture {
        handler: ProcessReplyHandler,
        borrowers: Arc<InMemoryBorrowerStore>,
        conversations: Arc<InMemoryConversationRepository>,
        recommendations: Arc<InMemoryRecommendationRepository>,
        messages: Arc<InMemoryMessageLog>,
        notifications: Arc<InMemoryNotificationSink>,
        channel: Arc<DemoChannel>,
    }

    fn fixture() -> Fixture {
        let borrowers = Arc::new(InMemoryBorrowerStore::new());
        let conversations = Arc::new(InMemoryConversationRepository::new());
        let recommendations = Arc::new(InMemoryRecommendationRepository::new());
        let messages = Arc::new(InMemoryMessageLog::new());
        let notifications = Arc::new(InMemoryNotificationSink::new());
        let channel = Arc::new(DemoChannel::new());
        let dispatcher = Arc::new(DeliveryDispatcher::new(
            Arc::clone(&channel) as _,
            3,
            Duration::from_millis(1),
        ));
        let outbound = Arc::new(Outbound::new(Arc::clone(&messages) as _, dispatcher));
        let handler = ProcessReplyHandler::new(
            Arc::clone(&borrowers) as _,
            Arc::clone(&conversations) as _,
            Arc::clone(&recommendations) as _,
            Arc::clone(&messages) as _,
            outbound,
            Arc::clone(&notifications) as _,
            Arc::new(KeywordRubric::new()),
            PlanGenerator::with_defaults(),
            Arc::new(BorrowerLocks::new()),
            EngineConfig::default(),
            ManagerId::new(),
        );
        Fixture {
            handler,
            borrowers,
            conversations,
            recommendations,
            messages,
            notifications,
            channel,
        }
    }

    fn borrower(overdue_days: u32) -> Borrower {
        Borrower {
            id: BorrowerId::new(),
            name: "Suresh".to_string(),
            phone_number: Some("9876543210".to_string()),
            assigned_manager: Some(ManagerId::new()),
            loan_amount: 240_000,
            outstanding_balance: 180_000,
            emi_amount: 8_000,
            remaining_tenure_months: 24,
            overdue_days,
            is_overdue: overdue_days > 0,
            risk_tier: RiskTier::Normal,
            plan_status: PlanStatus::None,
            behavioral_profile: None,
        }
    }

    fn cmd(borrower_id: BorrowerId, content: &str) -> ProcessReplyCommand {
        ProcessReplyCommand {
            borrower_id,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_borrower_is_rejected() {
        let f = fixture();
        let err = f
            .handler
            .handle(cmd(BorrowerId::new(), "hello"))
            .await
            .unwrap_err();
        assert!(err.code.is_not_found());
    }

    #[tokio::test]
    async fn reply_is_logged_and_borrower_profile_updated() {
        let f = fixture();
        let b = borrower(20);
        let id = b.id;
        f.borrowers.insert(b);

        let outcome = f
            .handler
            .handle(cmd(id, "I lost my job last month"))
            .await
            .unwrap();

        assert!(!outcome.fell_back);
        let stored = f.borrowers.get(&id).unwrap();
        assert!(stored.behavioral_profile.is_some());
        assert!(stored.risk_tier >= RiskTier::Moderate);

        let history = f.messages.messages_for_borrower(&id).await.unwrap();
        assert!(history[0].is_from_borrower());
        assert!(history.len() >= 2);
    }

    #[tokio::test]
    async fn distressed_reply_gets_plan_offer_and_pending_recommendation() {
        let f = fixture();
        let b = borrower(30);
        let id = b.id;
        f.borrowers.insert(b);

        let outcome = f
            .handler
            .handle(cmd(id, "I lost my job and cannot manage the emi"))
            .await
            .unwrap();

        assert!(outcome.plans_offered);
        let pending = f
            .recommendations
            .find_pending_by_borrower(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.status(), RecommendationStatus::Pending);
        assert_eq!(f.borrowers.get(&id).unwrap().plan_status, PlanStatus::Pending);

        let conversation = f
            .conversations
            .find_active_by_borrower(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.phase(), ConversationPhase::PlanSuggested);

        // The offer message carries the plan payload.
        let history = f.messages.messages_for_borrower(&id).await.unwrap();
        assert!(history.iter().any(|m| m.plans_offered().is_some()));
    }

    #[tokio::test]
    async fn calm_reply_gets_acknowledgment_without_plans() {
        let f = fixture();
        let b = borrower(3);
        let id = b.id;
        f.borrowers.insert(b);

        let outcome = f
            .handler
            .handle(cmd(id, "Noted, I will check and get back to you"))
            .await
            .unwrap();

        assert!(!outcome.plans_offered);
        assert!(f
            .recommendations
            .find_pending_by_borrower(&id)
            .await
            .unwrap()
            .is_none());
        assert!(outcome.response_message_id.is_some());
    }

    #[tokio::test]
    async fn crisis_reply_escalates_and_notifies_manager() {
        let f = fixture();
        let b = borrower(10);
        let id = b.id;
        f.borrowers.insert(b);

        let outcome = f
            .handler
            .handle(cmd(id, "I was laid off and have no money left"))
            .await
            .unwrap();

        assert!(outcome.crisis_escalated);
        assert_eq!(outcome.assessment.risk_tier, RiskTier::Critical);
        assert_eq!(f.borrowers.get(&id).unwrap().risk_tier, RiskTier::Critical);
        assert_eq!(f.notifications.count_titled("Crisis"), 1);

        let conversation = f
            .conversations
            .find_active_by_borrower(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.phase(), ConversationPhase::PlanSuggested);
        assert!(outcome.plans_offered);
    }

    #[tokio::test]
    async fn crisis_overrides_even_an_accepted_phase() {
        let f = fixture();
        let b = borrower(10);
        let id = b.id;
        f.borrowers.insert(b);

        let mut conversation = Conversation::start(id);
        conversation.advance(ConversationPhase::PlanSuggested).unwrap();
        conversation.advance(ConversationPhase::PlanAccepted).unwrap();
        f.conversations.save(conversation).await.unwrap();

        f.handler
            .handle(cmd(id, "medical emergency at home, I cannot pay right now"))
            .await
            .unwrap();

        let conversation = f
            .conversations
            .find_active_by_borrower(&id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.phase(), ConversationPhase::PlanSuggested);
    }

    #[tokio::test]
    async fn no_second_offer_while_recommendation_is_pending() {
        let f = fixture();
        let b = borrower(30);
        let id = b.id;
        f.borrowers.insert(b);

        let first = f
            .handler
            .handle(cmd(id, "I lost my job and cannot manage the emi"))
            .await
            .unwrap();
        assert!(first.plans_offered);

        let second = f
            .handler
            .handle(cmd(id, "this is very difficult, I am struggling"))
            .await
            .unwrap();
        assert!(!second.plans_offered);
        assert_eq!(f.recommendations.history_for(&id).len(), 1);
    }

    #[tokio::test]
    async fn accepted_plan_suppresses_further_offers() {
        let f = fixture();
        let mut b = borrower(30);
        b.plan_status = PlanStatus::Accepted;
        let id = b.id;
        f.borrowers.insert(b);

        let outcome = f
            .handler
            .handle(cmd(id, "I lost my job and cannot manage the emi"))
            .await
            .unwrap();
        assert!(!outcome.plans_offered);
    }

    #[tokio::test]
    async fn reply_creates_conversation_when_none_is_active() {
        let f = fixture();
        let b = borrower(20);
        let id = b.id;
        f.borrowers.insert(b);

        f.handler.handle(cmd(id, "hello")).await.unwrap();

        assert!(f
            .conversations
            .find_active_by_borrower(&id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn messages_go_out_over_the_channel() {
        let f = fixture();
        let b = borrower(20);
        let id = b.id;
        f.borrowers.insert(b);

        f.handler
            .handle(cmd(id, "salary is delayed, give me some time"))
            .await
            .unwrap();

        assert!(f.channel.sent_count() >= 1);
    }
}
