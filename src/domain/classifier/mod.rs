//! Risk/sentiment classification.
//!
//! The rubric is deterministic and versioned so that classification is
//! unit-testable in isolation and identical input always yields identical
//! output. It sits behind the [`ScoringStrategy`] port so alternative
//! rubrics can be swapped in without touching the state machine.
//!
//! [`ScoringStrategy`]: crate::ports::ScoringStrategy

mod assessment;
mod rubric;

pub use assessment::{
    Assessment, ClassificationInput, PrimaryIssue, StressLevel, Willingness,
};
pub use rubric::{KeywordRubric, RUBRIC_VERSION};
