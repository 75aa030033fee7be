//! Application handlers, one per engine operation.

pub mod conversations;
pub mod outreach;
pub mod process_reply;
pub mod recommendation;

pub use conversations::{
    ConversationView, DeleteConversationHandler, DeleteSummary, GetConversationHandler,
    ListConversationsHandler,
};
pub use outreach::{
    CancelFlag, OutreachDisposition, OutreachOutcome, OutreachSummary, StartOutreachCommand,
    StartOutreachHandler,
};
pub use process_reply::{ProcessReplyCommand, ProcessReplyHandler, ReplyOutcome};
pub use recommendation::{
    DecideRecommendationCommand, DecideRecommendationHandler, DecisionOutcome,
    GenerateRecommendationCommand, GenerateRecommendationHandler, LatestRecommendationHandler,
    PlanDecision, RestoreRecommendationCommand, RestoreRecommendationHandler,
    SendRecommendationCommand, SendRecommendationHandler,
};
