//! Outreach cycle: contact every eligible overdue borrower.
//!
//! Pulls a bounded batch from the borrower store and works through it with a
//! fixed number of concurrent workers. Each borrower is handled under their
//! own lock, a conversation is only created once the initial message has
//! been accepted by the channel, and re-running a cycle never double-texts a
//! borrower inside the cooldown window.

use futures::stream::{self, StreamExt};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::borrower::Borrower;
use crate::domain::conversation::{templates, Conversation, ConversationPhase};
use crate::domain::foundation::{
    BorrowerId, DomainError, ErrorCode, ManagerId, Notification, Timestamp,
};
use crate::ports::{BorrowerStore, ConversationRepository, NotificationSink};

use crate::application::locks::BorrowerLocks;
use crate::application::outbound::Outbound;

/// Cooperative cancellation for a running cycle. Borrowers not yet picked
/// up are skipped; in-flight sends finish.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct StartOutreachCommand {
    /// Minimum overdue days for this cycle; `None` uses the configured
    /// default.
    pub min_overdue_days: Option<u32>,
    /// Batch size cap for this cycle; `None` uses the configured default.
    pub limit: Option<usize>,
    /// Manager who receives the end-of-cycle summary notification.
    pub summary_to: Option<ManagerId>,
    pub cancel: CancelFlag,
}

/// What happened to one borrower during the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutreachDisposition {
    /// New conversation started and the initial message went out.
    Contacted,
    /// Existing quiet conversation nudged with a follow-up.
    ReEngaged,
    /// Active conversation touched too recently; left alone.
    CooldownActive,
    /// No phone number on record.
    Unreachable,
    /// Another writer created the conversation first.
    AlreadyQueued,
    /// Cycle was cancelled before this borrower was picked up.
    Cancelled,
    /// Send or storage failure; the cycle continued.
    Failed { code: ErrorCode },
}

#[derive(Debug, Clone)]
pub struct OutreachOutcome {
    pub borrower_id: BorrowerId,
    pub disposition: OutreachDisposition,
}

#[derive(Debug, Clone)]
pub struct OutreachSummary {
    pub contacted: usize,
    pub re_engaged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub outcomes: Vec<OutreachOutcome>,
}

pub struct StartOutreachHandler {
    borrowers: Arc<dyn BorrowerStore>,
    conversations: Arc<dyn ConversationRepository>,
    outbound: Arc<Outbound>,
    notifications: Arc<dyn NotificationSink>,
    locks: Arc<BorrowerLocks>,
    config: EngineConfig,
    /// Identity automated messages are written under when the borrower has
    /// no assigned manager.
    default_manager: ManagerId,
}

impl StartOutreachHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        borrowers: Arc<dyn BorrowerStore>,
        conversations: Arc<dyn ConversationRepository>,
        outbound: Arc<Outbound>,
        notifications: Arc<dyn NotificationSink>,
        locks: Arc<BorrowerLocks>,
        config: EngineConfig,
        default_manager: ManagerId,
    ) -> Self {
        Self {
            borrowers,
            conversations,
            outbound,
            notifications,
            locks,
            config,
            default_manager,
        }
    }

    pub async fn handle(&self, cmd: StartOutreachCommand) -> Result<OutreachSummary, DomainError> {
        let min_overdue_days = cmd.min_overdue_days.unwrap_or(self.config.min_overdue_days);
        let limit = cmd.limit.unwrap_or(self.config.batch_limit);
        let batch = self.borrowers.list_overdue(min_overdue_days, limit).await?;
        info!(
            batch = batch.len(),
            min_overdue_days,
            limit,
            "outreach cycle started"
        );

        let outcomes: Vec<OutreachOutcome> = stream::iter(batch)
            .map(|borrower| self.engage(borrower, &cmd.cancel))
            .buffer_unordered(self.config.workers)
            .collect()
            .await;

        let summary = tally(outcomes);
        info!(
            contacted = summary.contacted,
            re_engaged = summary.re_engaged,
            skipped = summary.skipped,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "outreach cycle finished"
        );

        if let Some(manager) = cmd.summary_to {
            let notification = Notification::new(
                "Outreach Cycle Complete",
                format!(
                    "Contacted {} borrowers, re-engaged {}, skipped {}, {} failed",
                    summary.contacted, summary.re_engaged, summary.skipped, summary.failed
                ),
                json!({
                    "contacted": summary.contacted,
                    "re_engaged": summary.re_engaged,
                    "skipped": summary.skipped,
                    "failed": summary.failed,
                    "cancelled": summary.cancelled,
                }),
            );
            self.notifications.notify(&manager, notification).await?;
        }

        Ok(summary)
    }

    async fn engage(&self, borrower: Borrower, cancel: &CancelFlag) -> OutreachOutcome {
        let borrower_id = borrower.id;
        if cancel.is_cancelled() {
            return OutreachOutcome {
                borrower_id,
                disposition: OutreachDisposition::Cancelled,
            };
        }

        let _guard = self.locks.acquire(&borrower_id).await;
        let disposition = match self.engage_locked(&borrower).await {
            Ok(disposition) => disposition,
            Err(err) => {
                warn!(borrower_id = %borrower_id, error = %err, "outreach failed for borrower");
                OutreachDisposition::Failed { code: err.code }
            }
        };
        OutreachOutcome {
            borrower_id,
            disposition,
        }
    }

    async fn engage_locked(
        &self,
        borrower: &Borrower,
    ) -> Result<OutreachDisposition, DomainError> {
        if borrower.phone_number.is_none() {
            return Ok(OutreachDisposition::Unreachable);
        }
        let manager = borrower.assigned_manager.unwrap_or(self.default_manager);

        match self
            .conversations
            .find_active_by_borrower(&borrower.id)
            .await?
        {
            Some(mut conversation) => {
                let quiet_hours = Timestamp::now().hours_since(conversation.updated_at());
                if quiet_hours < self.config.reengage_cooldown_hours {
                    return Ok(OutreachDisposition::CooldownActive);
                }

                let content = templates::follow_up(&borrower.name, quiet_hours / 24);
                let message = self
                    .outbound
                    .send_automated(borrower, manager, content, conversation.phase(), None)
                    .await?;
                conversation.record_message(*message.id());
                self.conversations.update(conversation).await?;
                Ok(OutreachDisposition::ReEngaged)
            }
            None => {
                // Dispatch first: a borrower the gateway cannot reach must
                // not end up with a dangling conversation record.
                let content = templates::initial_outreach(borrower);
                let message = self
                    .outbound
                    .send_automated(
                        borrower,
                        manager,
                        content,
                        ConversationPhase::Initiated,
                        None,
                    )
                    .await?;

                let mut conversation = Conversation::start(borrower.id);
                conversation.record_message(*message.id());
                match self.conversations.save(conversation).await {
                    Ok(()) => Ok(OutreachDisposition::Contacted),
                    Err(err) if err.code == ErrorCode::DuplicateActiveConversation => {
                        Ok(OutreachDisposition::AlreadyQueued)
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }
}

fn tally(outcomes: Vec<OutreachOutcome>) -> OutreachSummary {
    let mut summary = OutreachSummary {
        contacted: 0,
        re_engaged: 0,
        skipped: 0,
        failed: 0,
        cancelled: 0,
        outcomes: Vec::new(),
    };
    for outcome in &outcomes {
        match outcome.disposition {
            OutreachDisposition::Contacted => summary.contacted += 1,
            OutreachDisposition::ReEngaged => summary.re_engaged += 1,
            OutreachDisposition::CooldownActive | OutreachDisposition::AlreadyQueued => {
                summary.skipped += 1
            }
            OutreachDisposition::Unreachable | OutreachDisposition::Failed { .. } => {
                summary.failed += 1
            }
            OutreachDisposition::Cancelled => summary.cancelled += 1,
        }
    }
    summary.outcomes = outcomes;
    summary
}
