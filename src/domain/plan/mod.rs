//! Repayment-plan generation and the recommendation lifecycle.

mod recommendation;
mod relief_table;

pub use recommendation::{PlanOrigin, Recommendation, RecommendationStatus};
pub use relief_table::{PlanGenerator, PlanPair, PlanTerms, ReliefBand, ReliefTable};
