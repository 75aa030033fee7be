//! Feature flags.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Route all outbound delivery through the demo channel even when real
    /// gateway credentials are configured.
    pub force_demo_delivery: bool,
}
