//! In-memory adapters, used by tests and by the demo delivery mode.

mod borrower_store;
mod conversation_repository;
mod message_log;
mod notification_sink;
mod recommendation_repository;

pub use borrower_store::InMemoryBorrowerStore;
pub use conversation_repository::InMemoryConversationRepository;
pub use message_log::InMemoryMessageLog;
pub use notification_sink::InMemoryNotificationSink;
pub use recommendation_repository::InMemoryRecommendationRepository;
