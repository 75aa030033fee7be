//! Engine tuning knobs: outreach thresholds, batch sizing, cooldowns.

use serde::Deserialize;

use super::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Borrowers below this many overdue days are never contacted.
    pub min_overdue_days: u32,
    /// Maximum borrowers pulled per outreach cycle.
    pub batch_limit: usize,
    /// Concurrent outreach workers per cycle.
    pub workers: usize,
    /// Quiet hours before an active conversation is re-engaged.
    pub reengage_cooldown_hours: i64,
    /// Overdue days at or above which a reply triggers a proactive plan
    /// offer even without an explicit request.
    pub plan_offer_overdue_days: u32,
    /// Minimum hours between automated plan offers to one borrower.
    pub plan_resend_cooldown_hours: i64,
    /// How many recent messages feed the classification trend input.
    pub recent_messages_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_overdue_days: 7,
            batch_limit: 50,
            workers: 4,
            reengage_cooldown_hours: 24,
            plan_offer_overdue_days: 7,
            plan_resend_cooldown_hours: 2,
            recent_messages_window: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::invalid("engine.workers", "must be at least 1"));
        }
        if self.batch_limit == 0 {
            return Err(ConfigError::invalid(
                "engine.batch_limit",
                "must be at least 1",
            ));
        }
        if self.recent_messages_window == 0 {
            return Err(ConfigError::invalid(
                "engine.recent_messages_window",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let cfg = EngineConfig {
            workers: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
