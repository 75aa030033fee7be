//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
///
/// The scheduler reports these per borrower; everything else propagates them
/// to the caller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,

    // Not found errors
    BorrowerNotFound,
    ConversationNotFound,
    RecommendationNotFound,
    NothingToRestore,

    // Conflict errors
    DuplicateActiveConversation,
    PendingRecommendationExists,

    // State errors
    InvalidStateTransition,
    ConversationClosed,

    // Outbound gateway errors
    GatewayTransient,
    GatewayPermanent,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::BorrowerNotFound => "BORROWER_NOT_FOUND",
            ErrorCode::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            ErrorCode::RecommendationNotFound => "RECOMMENDATION_NOT_FOUND",
            ErrorCode::NothingToRestore => "NOTHING_TO_RESTORE",
            ErrorCode::DuplicateActiveConversation => "DUPLICATE_ACTIVE_CONVERSATION",
            ErrorCode::PendingRecommendationExists => "PENDING_RECOMMENDATION_EXISTS",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::ConversationClosed => "CONVERSATION_CLOSED",
            ErrorCode::GatewayTransient => "GATEWAY_TRANSIENT",
            ErrorCode::GatewayPermanent => "GATEWAY_PERMANENT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

impl ErrorCode {
    /// Returns true for the NotFound error class.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ErrorCode::BorrowerNotFound
                | ErrorCode::ConversationNotFound
                | ErrorCode::RecommendationNotFound
                | ErrorCode::NothingToRestore
        )
    }

    /// Returns true for the Conflict error class.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ErrorCode::DuplicateActiveConversation | ErrorCode::PendingRecommendationExists
        )
    }

    /// Returns true for gateway errors that warrant a retry.
    pub fn is_transient_gateway(&self) -> bool {
        matches!(self, ErrorCode::GatewayTransient)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            details: HashMap::new(),
        }
        .with_detail("field", field.into())
    }

    /// Creates a borrower-not-found error.
    pub fn borrower_not_found(borrower_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::BorrowerNotFound,
            format!("Borrower {} not found", borrower_id),
        )
    }

    /// Creates a recommendation-not-found error.
    pub fn recommendation_not_found(recommendation_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::RecommendationNotFound,
            format!("Recommendation {} not found", recommendation_id),
        )
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("content");
        assert_eq!(format!("{}", err), "Field 'content' cannot be empty");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ConversationNotFound, "Conversation not found");
        assert_eq!(
            format!("{}", err),
            "[CONVERSATION_NOT_FOUND] Conversation not found"
        );
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::GatewayPermanent, "Destination rejected")
            .with_detail("error_code", "21211")
            .with_detail("channel", "sms");

        assert_eq!(err.details.get("error_code"), Some(&"21211".to_string()));
        assert_eq!(err.details.get("channel"), Some(&"sms".to_string()));
    }

    #[test]
    fn not_found_class_covers_restore_with_nothing_retained() {
        assert!(ErrorCode::NothingToRestore.is_not_found());
        assert!(ErrorCode::RecommendationNotFound.is_not_found());
        assert!(!ErrorCode::GatewayTransient.is_not_found());
    }

    #[test]
    fn conflict_class_covers_duplicate_conversation_and_pending_plan() {
        assert!(ErrorCode::DuplicateActiveConversation.is_conflict());
        assert!(ErrorCode::PendingRecommendationExists.is_conflict());
        assert!(!ErrorCode::BorrowerNotFound.is_conflict());
    }

    #[test]
    fn only_transient_gateway_is_retryable() {
        assert!(ErrorCode::GatewayTransient.is_transient_gateway());
        assert!(!ErrorCode::GatewayPermanent.is_transient_gateway());
    }

    #[test]
    fn validation_error_converts_to_domain_error() {
        let err: DomainError = ValidationError::empty_field("content").into();
        assert_eq!(err.code, ErrorCode::EmptyField);
    }
}
