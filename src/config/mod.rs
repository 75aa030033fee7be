//! Application configuration.
//!
//! Loaded from environment variables with the `LOAN_RECOVERY` prefix and
//! `__` section separator, e.g. `LOAN_RECOVERY__ENGINE__WORKERS=8` or
//! `LOAN_RECOVERY__SMS__ACCOUNT_SID=AC...`. A `.env` file is honored in
//! development via dotenvy.

mod engine;
mod error;
mod features;
mod sms;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use features::FeatureFlags;
pub use sms::SmsConfig;

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub sms: SmsConfig,
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Loads configuration from the environment (and `.env` if present).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let loaded = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("LOAN_RECOVERY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = loaded.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.sms.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch
    // them.
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_prefixed_env() {
        for (key, _) in std::env::vars() {
            if key.starts_with("LOAN_RECOVERY") {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn loads_defaults_from_empty_environment() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_prefixed_env();

        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.engine.min_overdue_days, 7);
        assert_eq!(cfg.engine.workers, 4);
        assert!(!cfg.sms.enabled);
        assert!(!cfg.features.force_demo_delivery);
    }

    #[test]
    fn environment_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_prefixed_env();
        std::env::set_var("LOAN_RECOVERY__ENGINE__WORKERS", "8");
        std::env::set_var("LOAN_RECOVERY__SMS__ENABLED", "true");
        std::env::set_var("LOAN_RECOVERY__FEATURES__FORCE_DEMO_DELIVERY", "true");

        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.engine.workers, 8);
        assert!(cfg.sms.enabled);
        assert!(cfg.features.force_demo_delivery);

        clear_prefixed_env();
    }

    #[test]
    fn invalid_values_fail_validation() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_prefixed_env();
        std::env::set_var("LOAN_RECOVERY__ENGINE__WORKERS", "0");

        assert!(AppConfig::load().is_err());

        clear_prefixed_env();
    }
}
