//! Strongly-typed identifier value objects.
//!
//! Every entity the engine touches gets its own uuid-backed ID type so that
//! a `BorrowerId` can never be passed where a `RecommendationId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(
    /// Unique identifier for a borrower record in the external store.
    BorrowerId
);

typed_id!(
    /// Unique identifier for a recovery manager.
    ///
    /// Automated messages are authored "as" a manager so that the borrower
    /// always sees a human counterpart.
    ManagerId
);

typed_id!(
    /// Unique identifier for a conversation.
    ConversationId
);

typed_id!(
    /// Unique identifier for a message in the message log.
    MessageId
);

typed_id!(
    /// Unique identifier for a repayment recommendation.
    RecommendationId
);

typed_id!(
    /// Unique identifier for an outbound delivery attempt.
    AttemptId
);
