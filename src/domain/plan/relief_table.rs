//! Relief table and the repayment-plan generator.
//!
//! The table fixes, per risk tier, how far the EMI drops and how much
//! tenure/grace each candidate plan grants. The numbers here are the single
//! source of truth for reduction bands; tests assert against them directly.

use serde::{Deserialize, Serialize};

use crate::domain::borrower::RiskTier;
use crate::domain::foundation::ValidationError;

/// Overdue-day count beyond which plans include a larger interest waiver.
const WAIVER_OVERDUE_THRESHOLD: u32 = 45;

/// Numeric terms of one candidate repayment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTerms {
    /// Restructured monthly installment, whole currency units.
    pub suggested_emi: u64,
    /// Months added to the remaining tenure.
    pub extended_tenure_months: u16,
    /// Days after the new due date before penalties resume.
    pub grace_period_days: u16,
    /// Interest waiver in percent.
    pub interest_waiver_pct: u8,
}

impl PlanTerms {
    /// True when `self` is at least as lenient as `other` on every dimension.
    pub fn at_least_as_lenient_as(&self, other: &PlanTerms) -> bool {
        self.suggested_emi <= other.suggested_emi
            && self.extended_tenure_months >= other.extended_tenure_months
            && self.grace_period_days >= other.grace_period_days
            && self.interest_waiver_pct >= other.interest_waiver_pct
    }
}

/// The two ordered candidate plans for one borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPair {
    /// "Flexible": smaller EMI reduction, shorter grace period.
    pub plan_a: PlanTerms,
    /// "Extended": deeper relief, never stricter than Plan A.
    pub plan_b: PlanTerms,
}

/// Relief parameters for one risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliefBand {
    /// Fraction of the current EMI retained by Plan A (e.g. 0.90 = 10% cut).
    pub emi_retention_a: f64,
    /// Fraction retained by Plan B; must not exceed `emi_retention_a`.
    pub emi_retention_b: f64,
    pub tenure_months_a: u16,
    pub tenure_months_b: u16,
    pub grace_days_a: u16,
    pub grace_days_b: u16,
}

/// Percentage-reduction table keyed by risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReliefTable {
    pub normal: ReliefBand,
    pub moderate: ReliefBand,
    pub high: ReliefBand,
    pub critical: ReliefBand,
}

impl Default for ReliefTable {
    fn default() -> Self {
        Self {
            normal: ReliefBand {
                emi_retention_a: 0.90,
                emi_retention_b: 0.80,
                tenure_months_a: 3,
                tenure_months_b: 6,
                grace_days_a: 7,
                grace_days_b: 14,
            },
            moderate: ReliefBand {
                emi_retention_a: 0.75,
                emi_retention_b: 0.65,
                tenure_months_a: 6,
                tenure_months_b: 9,
                grace_days_a: 14,
                grace_days_b: 21,
            },
            high: ReliefBand {
                emi_retention_a: 0.65,
                emi_retention_b: 0.55,
                tenure_months_a: 9,
                tenure_months_b: 15,
                grace_days_a: 21,
                grace_days_b: 30,
            },
            critical: ReliefBand {
                emi_retention_a: 0.58,
                emi_retention_b: 0.45,
                tenure_months_a: 12,
                tenure_months_b: 18,
                grace_days_a: 30,
                grace_days_b: 45,
            },
        }
    }
}

impl ReliefTable {
    /// Returns the band for a risk tier.
    pub fn band(&self, tier: RiskTier) -> &ReliefBand {
        match tier {
            RiskTier::Normal => &self.normal,
            RiskTier::Moderate => &self.moderate,
            RiskTier::High => &self.high,
            RiskTier::Critical => &self.critical,
        }
    }

    /// Validates every band: retentions within (0, 1], and Plan B at least
    /// as lenient as Plan A on every dimension.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (tier, band) in [
            (RiskTier::Normal, &self.normal),
            (RiskTier::Moderate, &self.moderate),
            (RiskTier::High, &self.high),
            (RiskTier::Critical, &self.critical),
        ] {
            if band.emi_retention_a <= 0.0 || band.emi_retention_a > 1.0 {
                return Err(ValidationError::invalid_format(
                    "emi_retention_a",
                    format!("{:?} retention must be within (0, 1]", tier),
                ));
            }
            if band.emi_retention_b <= 0.0 || band.emi_retention_b > band.emi_retention_a {
                return Err(ValidationError::invalid_format(
                    "emi_retention_b",
                    format!("{:?} Plan B retention must not exceed Plan A", tier),
                ));
            }
            if band.tenure_months_b < band.tenure_months_a
                || band.grace_days_b < band.grace_days_a
            {
                return Err(ValidationError::invalid_format(
                    "relief_band",
                    format!("{:?} Plan B must be at least as lenient as Plan A", tier),
                ));
            }
        }
        Ok(())
    }
}

/// Pure generator: loan parameters + risk tier in, two candidate plans out.
#[derive(Debug, Clone)]
pub struct PlanGenerator {
    table: ReliefTable,
}

impl PlanGenerator {
    /// Creates a generator over a validated relief table.
    pub fn new(table: ReliefTable) -> Result<Self, ValidationError> {
        table.validate()?;
        Ok(Self { table })
    }

    /// Generator over the default table.
    pub fn with_defaults() -> Self {
        Self {
            table: ReliefTable::default(),
        }
    }

    /// Returns the underlying table.
    pub fn table(&self) -> &ReliefTable {
        &self.table
    }

    /// Generates the Plan A / Plan B pair.
    ///
    /// `current_emi` is the borrower's effective installment; reductions are
    /// applied against it. The waiver grows once the loan is more than
    /// 45 days past due.
    pub fn generate(&self, current_emi: u64, overdue_days: u32, tier: RiskTier) -> PlanPair {
        let band = self.table.band(tier);
        let (waiver_a, waiver_b) = if overdue_days > WAIVER_OVERDUE_THRESHOLD {
            (2, 5)
        } else {
            (0, 2)
        };

        let plan_a = PlanTerms {
            suggested_emi: apply_retention(current_emi, band.emi_retention_a),
            extended_tenure_months: band.tenure_months_a,
            grace_period_days: band.grace_days_a,
            interest_waiver_pct: waiver_a,
        };
        let plan_b = PlanTerms {
            suggested_emi: apply_retention(current_emi, band.emi_retention_b),
            extended_tenure_months: band.tenure_months_b,
            grace_period_days: band.grace_days_b,
            interest_waiver_pct: waiver_b,
        };

        PlanPair { plan_a, plan_b }
    }
}

fn apply_retention(emi: u64, retention: f64) -> u64 {
    ((emi as f64 * retention).round() as u64).max(1)
}
