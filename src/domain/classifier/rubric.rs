//! Keyword scoring rubric.
//!
//! A fully specified, versioned rubric: identical input always yields an
//! identical [`Assessment`]. Two stages:
//!
//! 1. Crisis-signal detection. A hardship phrase (job loss, medical
//!    emergency, stated inability to pay) unconditionally forces the risk
//!    tier to `Critical`, regardless of the prior tier or the weighted score.
//! 2. A weighted composite of message severity, overdue-day pressure,
//!    financial indicators, and recent sentiment trend for everything else.
//!
//! Bump [`RUBRIC_VERSION`] whenever a lexicon or weight changes; the version
//! string is embedded in every generated insight.

use crate::domain::borrower::RiskTier;

use super::{Assessment, ClassificationInput, PrimaryIssue, StressLevel, Willingness};

/// Version tag embedded in every insight this rubric produces.
pub const RUBRIC_VERSION: &str = "keyword-rubric/3";

/// Composite weights. Must sum to 1.0.
const WEIGHT_MESSAGE: f64 = 0.45;
const WEIGHT_OVERDUE: f64 = 0.25;
const WEIGHT_FINANCIAL: f64 = 0.20;
const WEIGHT_TREND: f64 = 0.10;

/// Phrases that force `RiskTier::Critical` on sight.
const CRISIS_PHRASES: &[&str] = &[
    "lost my job",
    "loss my job",
    "lost his job",
    "no job",
    "unemployed",
    "laid off",
    "layoff",
    "fired",
    "medical emergency",
    "medical issue",
    "hospital",
    "surgery",
    "can't pay",
    "cant pay",
    "cannot pay",
    "unable to pay",
    "won't pay",
    "wont pay",
    "no money",
];

/// Stated inability or refusal to pay.
const REFUSAL_PHRASES: &[&str] = &[
    "can't pay",
    "cant pay",
    "cannot pay",
    "won't pay",
    "wont pay",
    "no money",
    "cannot afford",
];

/// Issue lexicon with per-issue severity, checked in declaration order.
/// The highest-severity matching issue wins.
const ISSUE_TABLE: &[(PrimaryIssue, u32, &[&str])] = &[
    (PrimaryIssue::FinancialCrisis, 95, REFUSAL_PHRASES),
    (
        PrimaryIssue::JobLoss,
        90,
        &["lost my job", "loss my job", "no job", "unemployed", "layoff", "laid off", "fired", "salary cut"],
    ),
    (
        PrimaryIssue::MedicalEmergency,
        85,
        &["medical", "hospital", "surgery", "sick", "emergency", "health"],
    ),
    (
        PrimaryIssue::FamilyEmergency,
        75,
        &["family", "death", "marriage", "divorce", "relative"],
    ),
    (
        PrimaryIssue::CashFlowProblem,
        70,
        &["short of money", "cash flow", "shortage", "delayed payment", "pending payment", "client payment"],
    ),
    (
        PrimaryIssue::HarassmentPressure,
        65,
        &["pressure", "stressed", "harassment", "threatened", "reminders", "scared"],
    ),
    (
        PrimaryIssue::TransportIssue,
        60,
        &["transport", "vehicle", "breakdown", "accident", "bike", "fuel"],
    ),
    (
        PrimaryIssue::TemporarySetback,
        55,
        &["temporary", "this month", "next month", "delayed salary", "salary delay", "waiting for salary", "next week", "this week"],
    ),
];

/// Baseline message severity when no issue keyword matches.
const BASELINE_SEVERITY: u32 = 30;

const WILLINGNESS_PHRASES: &[&str] = &[
    "want to pay",
    "will pay",
    "i'll pay",
    "i will pay",
    "plan to pay",
    "trying to",
    "working on it",
    "send link",
    "how to pay",
    "pay by",
    "payment by",
];

const TEMPORARY_PHRASES: &[&str] = &[
    "temporary",
    "this month",
    "next month",
    "soon",
    "waiting for",
    "delayed salary",
    "next week",
    "this week",
    "salary delay",
];

const PLAN_REQUEST_PHRASES: &[&str] = &[
    "show me the plans",
    "send plans",
    "send the plans",
    "what are the plans",
    "repayment plans",
    "repayment options",
    "emi plans",
    "show plans",
    "repeat plans",
    "share plans",
    "send me plans",
    "available plans",
    "what are my options",
    "what options",
];

/// Deterministic keyword rubric, the default scoring strategy.
///
/// Stateless; construct once and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRubric;

impl KeywordRubric {
    pub fn new() -> Self {
        Self
    }

    /// Scores one inbound message against the borrower's situation.
    pub fn assess(&self, input: &ClassificationInput) -> Assessment {
        let text = input.content.to_lowercase();

        let crisis = contains_any(&text, CRISIS_PHRASES);
        let (severity, primary_issue) = message_severity(&text);
        let shows_willingness = contains_any(&text, WILLINGNESS_PHRASES);
        let is_temporary = contains_any(&text, TEMPORARY_PHRASES);

        // Willingness softens a hard message but never erases an issue.
        let message_score = if shows_willingness && severity > 50 {
            severity - 15
        } else {
            severity
        };

        let composite = weighted_composite(
            message_score,
            overdue_pressure(input.overdue_days),
            financial_pressure(input),
            trend_score(&input.recent_stress),
        );

        let stress = if crisis {
            // Crisis floors stress at High; a saturated composite reads Critical.
            if composite >= 90 {
                StressLevel::Critical
            } else {
                StressLevel::High
            }
        } else {
            stress_from_score(composite)
        };

        let risk_tier = if crisis {
            RiskTier::Critical
        } else {
            tier_from_stress(stress)
        };

        let willingness = if shows_willingness {
            Willingness::WillPay
        } else if contains_any(&text, REFUSAL_PHRASES) {
            Willingness::Refusal
        } else if is_temporary {
            Willingness::LikelyToPay
        } else if input.is_overdue && composite > 70 {
            Willingness::Struggling
        } else {
            Willingness::LikelyToPay
        };

        let insight = format!(
            "{} (score {}/100): {} detected. Stress level: {:?}.{}",
            RUBRIC_VERSION,
            composite,
            primary_issue.label(),
            stress,
            if crisis { " Crisis signal present." } else { "" },
        );

        Assessment {
            risk_tier,
            stress,
            willingness,
            primary_issue,
            insight,
            composite_score: composite,
            crisis,
        }
    }

    /// True when the borrower is explicitly asking to (re)see the plans.
    pub fn detect_plan_request(&self, content: &str) -> bool {
        let text = content.to_lowercase();
        if contains_any(&text, PLAN_REQUEST_PHRASES) {
            return true;
        }
        // "plan" plus a request verb also counts ("can you show the plan again").
        text.contains("plan")
            && ["show", "send", "get", "view", "what", "again", "repeat"]
                .iter()
                .any(|verb| text.contains(verb))
    }

    /// Quick stress read for tagging an inbound message as it is appended,
    /// before the full assessment runs.
    pub fn quick_sentiment(&self, content: &str) -> Option<StressLevel> {
        let text = content.to_lowercase();
        if contains_any(&text, CRISIS_PHRASES) {
            return Some(StressLevel::High);
        }
        let (severity, _) = message_severity(&text);
        if severity >= 70 {
            Some(StressLevel::High)
        } else if severity >= 55 {
            Some(StressLevel::Moderate)
        } else if contains_any(&text, TEMPORARY_PHRASES)
            || contains_any(&text, WILLINGNESS_PHRASES)
        {
            Some(StressLevel::Low)
        } else {
            None
        }
    }
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn message_severity(text: &str) -> (u32, PrimaryIssue) {
    let mut best = (BASELINE_SEVERITY, PrimaryIssue::GeneralDifficulty);
    for (issue, severity, keywords) in ISSUE_TABLE {
        if *severity > best.0 && contains_any(text, keywords) {
            best = (*severity, *issue);
        }
    }
    best
}

fn overdue_pressure(overdue_days: u32) -> u32 {
    match overdue_days {
        0 => 20,
        1..=7 => 40,
        8..=30 => 55,
        31..=60 => 70,
        61..=90 => 85,
        _ => 95,
    }
}

fn financial_pressure(input: &ClassificationInput) -> u32 {
    let mut score: i64 = 40;

    if input.emi_amount > 0 && input.loan_amount > 0 {
        let emi_ratio = input.emi_amount as f64 / input.loan_amount as f64 * 100.0;
        if emi_ratio > 15.0 {
            score += 15;
        } else if emi_ratio > 10.0 {
            score += 10;
        } else if emi_ratio < 5.0 {
            score -= 10;
        }
    }

    if input.outstanding_balance > 0 && input.loan_amount > 0 {
        let balance_ratio = input.outstanding_balance as f64 / input.loan_amount as f64 * 100.0;
        if balance_ratio > 80.0 {
            score += 20;
        } else if balance_ratio > 50.0 {
            score += 10;
        } else if balance_ratio < 20.0 {
            score -= 15;
        }
    }

    if input.is_overdue {
        score += 15;
        if input.overdue_days > 90 {
            score += 25;
        } else if input.overdue_days > 60 {
            score += 15;
        } else if input.overdue_days > 30 {
            score += 10;
        }
    }

    score.clamp(0, 100) as u32
}

fn trend_score(recent: &[StressLevel]) -> u32 {
    if recent.is_empty() {
        return 40;
    }
    let sum: u32 = recent.iter().map(|s| s.trend_score()).sum();
    sum / recent.len() as u32
}

fn weighted_composite(message: u32, overdue: u32, financial: u32, trend: u32) -> u32 {
    let composite = message as f64 * WEIGHT_MESSAGE
        + overdue as f64 * WEIGHT_OVERDUE
        + financial as f64 * WEIGHT_FINANCIAL
        + trend as f64 * WEIGHT_TREND;
    (composite.round() as i64).clamp(0, 100) as u32
}

fn stress_from_score(score: u32) -> StressLevel {
    match score {
        90.. => StressLevel::Critical,
        70..=89 => StressLevel::High,
        40..=69 => StressLevel::Moderate,
        _ => StressLevel::Low,
    }
}

fn tier_from_stress(stress: StressLevel) -> RiskTier {
    match stress {
        StressLevel::Critical => RiskTier::Critical,
        StressLevel::High => RiskTier::High,
        StressLevel::Moderate => RiskTier::Moderate,
        StressLevel::Low => RiskTier::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(content: &str, overdue_days: u32) -> ClassificationInput {
        ClassificationInput {
            content: content.to_string(),
            overdue_days,
            is_overdue: overdue_days > 0,
            loan_amount: 240_000,
            outstanding_balance: 180_000,
            emi_amount: 8_000,
            recent_stress: vec![],
        }
    }

    mod crisis_override {
        use super::*;

        #[test]
        fn job_loss_forces_critical_tier() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("I lost my job last month", 5));
            assert!(a.crisis);
            assert_eq!(a.risk_tier, RiskTier::Critical);
            assert!(a.stress >= StressLevel::High);
        }

        #[test]
        fn medical_emergency_forces_critical_tier() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("there was a medical emergency in my family", 2));
            assert!(a.crisis);
            assert_eq!(a.risk_tier, RiskTier::Critical);
        }

        #[test]
        fn inability_to_pay_forces_critical_tier() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("I simply cannot pay this", 1));
            assert!(a.crisis);
            assert_eq!(a.risk_tier, RiskTier::Critical);
        }

        #[test]
        fn crisis_is_independent_of_overdue_days() {
            let rubric = KeywordRubric::new();
            let fresh = rubric.assess(&input("lost my job", 0));
            let chronic = rubric.assess(&input("lost my job", 120));
            assert_eq!(fresh.risk_tier, RiskTier::Critical);
            assert_eq!(chronic.risk_tier, RiskTier::Critical);
        }
    }

    mod weighted_scoring {
        use super::*;

        #[test]
        fn identical_input_yields_identical_output() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("salary delay, will pay next week", 12));
            let b = rubric.assess(&input("salary delay, will pay next week", 12));
            assert_eq!(a, b);
        }

        #[test]
        fn benign_message_scores_normal() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("thanks, noted", 0));
            assert!(!a.crisis);
            assert_eq!(a.risk_tier, RiskTier::Normal);
            assert_eq!(a.stress, StressLevel::Low);
        }

        #[test]
        fn chronic_overdue_raises_score() {
            let rubric = KeywordRubric::new();
            let fresh = rubric.assess(&input("facing some difficulty", 3));
            let chronic = rubric.assess(&input("facing some difficulty", 120));
            assert!(chronic.composite_score > fresh.composite_score);
        }

        #[test]
        fn stress_trend_feeds_into_score() {
            let rubric = KeywordRubric::new();
            let mut stressed = input("need a little time", 10);
            stressed.recent_stress = vec![StressLevel::High, StressLevel::High];
            let calm = input("need a little time", 10);
            assert!(
                rubric.assess(&stressed).composite_score
                    > rubric.assess(&calm).composite_score
            );
        }

        #[test]
        fn insight_carries_rubric_version() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("salary delay", 10));
            assert!(a.insight.contains(RUBRIC_VERSION));
        }
    }

    mod willingness {
        use super::*;

        #[test]
        fn explicit_commitment_reads_will_pay() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("I will pay by Friday", 10));
            assert_eq!(a.willingness, Willingness::WillPay);
        }

        #[test]
        fn refusal_reads_refusal() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("no money, nothing I can do", 10));
            assert_eq!(a.willingness, Willingness::Refusal);
        }

        #[test]
        fn temporary_setback_reads_likely_to_pay() {
            let rubric = KeywordRubric::new();
            let a = rubric.assess(&input("waiting for my delayed salary", 10));
            assert_eq!(a.willingness, Willingness::LikelyToPay);
        }
    }

    mod plan_request {
        use super::*;

        #[test]
        fn detects_direct_request() {
            let rubric = KeywordRubric::new();
            assert!(rubric.detect_plan_request("Please send the plans again"));
            assert!(rubric.detect_plan_request("what are my options"));
        }

        #[test]
        fn detects_plan_plus_verb() {
            let rubric = KeywordRubric::new();
            assert!(rubric.detect_plan_request("can you show that plan once more"));
        }

        #[test]
        fn ignores_unrelated_text() {
            let rubric = KeywordRubric::new();
            assert!(!rubric.detect_plan_request("I transferred the money yesterday"));
        }
    }

    mod quick_sentiment {
        use super::*;

        #[test]
        fn crisis_phrases_read_high() {
            let rubric = KeywordRubric::new();
            assert_eq!(
                rubric.quick_sentiment("I lost my job"),
                Some(StressLevel::High)
            );
        }

        #[test]
        fn temporary_phrases_read_low() {
            let rubric = KeywordRubric::new();
            assert_eq!(
                rubric.quick_sentiment("next week for sure"),
                Some(StressLevel::Low)
            );
        }

        #[test]
        fn unrecognized_text_reads_none() {
            let rubric = KeywordRubric::new();
            assert_eq!(rubric.quick_sentiment("ok"), None);
        }
    }
}
