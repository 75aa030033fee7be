//! Ports: trait seams between the application core and the outside world.
//!
//! Adapters implement these; handlers depend only on the traits.

mod borrower_store;
mod conversation_repository;
mod message_log;
mod notification_sink;
mod outbound_channel;
mod recommendation_repository;
mod scoring_strategy;

pub use borrower_store::BorrowerStore;
pub use conversation_repository::ConversationRepository;
pub use message_log::MessageLog;
pub use notification_sink::NotificationSink;
pub use outbound_channel::{ChannelError, DispatchReceipt, OutboundChannel};
pub use recommendation_repository::RecommendationRepository;
pub use scoring_strategy::ScoringStrategy;
