//! Conversation state machine, message entities, and borrower-facing copy.

mod conversation;
mod message;
mod phase;
pub mod templates;

pub use conversation::Conversation;
pub use message::{Message, Sender};
pub use phase::ConversationPhase;
