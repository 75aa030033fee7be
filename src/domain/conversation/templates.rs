//! Borrower-facing message templates.
//!
//! All automated copy lives here so the tone is consistent and the rest of
//! the engine never builds user-visible strings inline. Internal error
//! detail must never reach the borrower; the only fallback is
//! [`generic_fallback`].

use crate::domain::borrower::Borrower;
use crate::domain::classifier::{Assessment, StressLevel};
use crate::domain::plan::{PlanPair, PlanTerms};

/// Initial outreach, templated by overdue severity.
pub fn initial_outreach(borrower: &Borrower) -> String {
    let name = &borrower.name;
    let days = borrower.overdue_days;

    if days > 60 {
        format!(
            "Dear {name}, your EMI payment of ₹{} is {days} days overdue. \
             We understand that sometimes circumstances can be challenging. \
             Please let us know if you're experiencing any difficulties, and \
             we'll work together to find a solution.",
            format_amount(borrower.effective_emi()),
        )
    } else if days > 30 {
        format!(
            "Hi {name}, we wanted to reach out regarding your EMI payment \
             which is {days} days past due. Is everything alright? We're \
             committed to helping our customers through difficult times. \
             Please share any concerns you may have."
        )
    } else {
        format!(
            "Hello {name}, we noticed your EMI payment is overdue by {days} \
             days. We hope everything is okay. If you're facing any \
             difficulties, we're here to help. Could you please let us know \
             if there's anything we can do to assist you?"
        )
    }
}

/// Empathetic preamble plus the two candidate plans.
pub fn plan_offer(name: &str, assessment: &Assessment, plans: &PlanPair) -> String {
    let empathy = match assessment.stress {
        StressLevel::High | StressLevel::Critical => format!(
            "I'm truly sorry to hear about the {} you're facing, {name}. \
             We understand how difficult this is. ",
            assessment.primary_issue.label().to_lowercase(),
        ),
        StressLevel::Moderate => format!(
            "I'm sorry to hear that you're dealing with {}, {name}. \
             Thank you for being honest with us. ",
            assessment.primary_issue.label().to_lowercase(),
        ),
        StressLevel::Low => {
            format!("Thank you for staying in touch, {name}. ")
        }
    };

    format!(
        "{empathy}Our priority is to support you through this. I've put \
         together two payment options to ease your burden:\n\n\
         Plan A - Balanced Support\n{}\n\n\
         Plan B - Comprehensive Relief\n{}\n\n\
         Both options are designed to reduce your monthly commitment. \
         Do either of these help your current situation?",
        render_terms(&plans.plan_a),
        render_terms(&plans.plan_b),
    )
}

/// Empathetic acknowledgment when no plans go out with the reply.
pub fn acknowledgment(name: &str, assessment: &Assessment) -> String {
    match assessment.stress {
        StressLevel::High | StressLevel::Critical => format!(
            "I'm very sorry to hear that you're going through such a \
             challenging time, {name}. Please know that we are committed to \
             finding a solution that works for you. Would you like to see \
             some flexible repayment options?"
        ),
        StressLevel::Moderate => format!(
            "Thank you for sharing your situation with us, {name}. We \
             understand that things can be difficult sometimes. Would you \
             like to explore flexible options like grace periods and \
             temporary EMI reductions?"
        ),
        StressLevel::Low => format!(
            "Thank you for the update, {name}. We appreciate your \
             transparency. Is there anything specific we can do to make \
             your upcoming payment easier?"
        ),
    }
}

/// Single-plan proposal used for manager-initiated sends and restores.
pub fn plan_proposal(name: &str, terms: &PlanTerms) -> String {
    format!(
        "Dear {name}, based on a review of your account we'd like to offer \
         you a restructured payment plan:\n{}\n\
         Would this work for your current situation? Reply to let us know.",
        render_terms(terms),
    )
}

/// Improved offer sent automatically after a declined plan.
pub fn revised_plan_offer(name: &str, terms: &PlanTerms) -> String {
    format!(
        "{name}, we hear you. We've taken another look at your account and \
         can extend a more comprehensive relief package:\n{}\n\
         This is the most flexible arrangement we can offer. Does this help?",
        render_terms(terms),
    )
}

/// Confirmation sent once a plan is accepted.
pub fn acceptance_confirmation(terms: &PlanTerms) -> String {
    format!(
        "PLAN ACCEPTED: Your restructured payment plan is confirmed.\n\
         - New EMI: ₹{}\n\
         - Extended Tenure: {} months\n\
         - Grace Period: {} days\n\
         Please ensure payments are made on time according to these new \
         terms. Your file has been updated.",
        format_amount(terms.suggested_emi),
        terms.extended_tenure_months,
        terms.grace_period_days,
    )
}

/// Notice recorded when a plan is declined.
pub fn rejection_notice() -> String {
    "PLAN DECLINED: You have declined the proposed restructuring. Our team \
     will review your account to provide an alternative solution."
        .to_string()
}

/// Re-engagement nudge for a quiet conversation.
pub fn follow_up(name: &str, days_since_last_message: i64) -> String {
    if days_since_last_message <= 3 {
        format!(
            "Hi {name}, I wanted to follow up on my previous message. We're \
             here to help you with your payment situation. Please let us \
             know if you have any questions or concerns."
        )
    } else if days_since_last_message <= 7 {
        format!(
            "Dear {name}, we haven't heard from you yet. We genuinely want \
             to help you resolve your overdue payment. Please reach out at \
             your earliest convenience."
        )
    } else {
        format!(
            "Hello {name}, this is a reminder about your overdue payment. \
             We've been trying to reach you to discuss flexible payment \
             options. Please contact us as soon as possible."
        )
    }
}

/// Generic acknowledgment used when processing fails internally. Never
/// embeds error detail.
pub fn generic_fallback(name: &str) -> String {
    format!(
        "Thank you for reaching out, {name}. We want to ensure your \
         repayment journey is as smooth as possible. A member of our team \
         will get back to you shortly."
    )
}

fn render_terms(terms: &PlanTerms) -> String {
    let mut lines = format!(
        "- Monthly EMI: ₹{}\n- Extended Tenure: {} months\n- Grace Period: {} days",
        format_amount(terms.suggested_emi),
        terms.extended_tenure_months,
        terms.grace_period_days,
    );
    if terms.interest_waiver_pct > 0 {
        lines.push_str(&format!(
            "\n- Interest Waiver: {}%",
            terms.interest_waiver_pct
        ));
    }
    lines
}

/// Groups digits with commas: 85000 -> "85,000".
fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::borrower::{PlanStatus, RiskTier};
    use crate::domain::classifier::{ClassificationInput, KeywordRubric};
    use crate::domain::foundation::BorrowerId;

    fn borrower(overdue_days: u32) -> Borrower {
        Borrower {
            id: BorrowerId::new(),
            name: "Suresh".to_string(),
            phone_number: Some("9876543210".to_string()),
            assigned_manager: None,
            loan_amount: 240_000,
            outstanding_balance: 180_000,
            emi_amount: 8_000,
            remaining_tenure_months: 24,
            overdue_days,
            is_overdue: overdue_days > 0,
            risk_tier: RiskTier::Normal,
            plan_status: PlanStatus::None,
            behavioral_profile: None,
        }
    }

    fn assessment(content: &str) -> Assessment {
        KeywordRubric::new().assess(&ClassificationInput {
            content: content.to_string(),
            overdue_days: 10,
            is_overdue: true,
            loan_amount: 240_000,
            outstanding_balance: 180_000,
            emi_amount: 8_000,
            recent_stress: vec![],
        })
    }

    #[test]
    fn initial_outreach_varies_with_severity() {
        let mild = initial_outreach(&borrower(10));
        let moderate = initial_outreach(&borrower(40));
        let severe = initial_outreach(&borrower(70));
        assert!(mild.contains("overdue by 10 days"));
        assert!(moderate.contains("40 days past due"));
        assert!(severe.contains("70 days overdue"));
    }

    #[test]
    fn plan_offer_lists_both_plans() {
        let a = assessment("I lost my job");
        let pair = PlanPair {
            plan_a: PlanTerms {
                suggested_emi: 5_200,
                extended_tenure_months: 9,
                grace_period_days: 21,
                interest_waiver_pct: 0,
            },
            plan_b: PlanTerms {
                suggested_emi: 4_400,
                extended_tenure_months: 15,
                grace_period_days: 30,
                interest_waiver_pct: 2,
            },
        };
        let text = plan_offer("Suresh", &a, &pair);
        assert!(text.contains("Plan A"));
        assert!(text.contains("Plan B"));
        assert!(text.contains("₹5,200"));
        assert!(text.contains("₹4,400"));
        assert!(text.contains("Interest Waiver: 2%"));
    }

    #[test]
    fn acknowledgment_is_empathetic_for_high_stress() {
        let a = assessment("medical emergency at home");
        let text = acknowledgment("Suresh", &a);
        assert!(text.contains("sorry"));
    }

    #[test]
    fn generic_fallback_contains_no_error_detail() {
        let text = generic_fallback("Suresh");
        assert!(!text.to_lowercase().contains("error"));
        assert!(!text.to_lowercase().contains("internal"));
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(85_000), "85,000");
        assert_eq!(format_amount(1_234_567), "1,234,567");
        assert_eq!(format_amount(999), "999");
    }
}
