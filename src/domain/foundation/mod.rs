//! Foundation types shared across the domain.
//!
//! Value objects (typed IDs, timestamps), the state machine trait, the
//! domain error taxonomy, and the notification envelope.

mod errors;
mod ids;
mod notification;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{
    AttemptId, BorrowerId, ConversationId, ManagerId, MessageId, RecommendationId,
};
pub use notification::Notification;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
