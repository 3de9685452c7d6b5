use std::time::Duration;

// ============================================================================
// Runtime Configuration
// ============================================================================
//
// Two store-configurable values gate the endpoint: the feature switch and the
// cooldown window. The handler reads them per evaluation.
//
// ============================================================================

pub const ENV_FEATURE_ENABLED: &str = "ORDER_STATUS_UPDATE_ENABLED";
pub const ENV_COOLDOWN_SECS: &str = "ORDER_STATUS_COOLDOWN_SECS";

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Master switch; when off every request short-circuits with a
    /// feature-disabled response before any other work.
    pub enabled: bool,
    /// Cooldown window in seconds; zero disables the guard.
    pub cooldown_lifetime_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cooldown_lifetime_secs: 30,
        }
    }
}

impl ProcessingConfig {
    /// Build from environment variables, falling back to defaults for absent
    /// or malformed values.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var(ENV_FEATURE_ENABLED)
            .map(|raw| parse_enabled(&raw))
            .unwrap_or(defaults.enabled);

        let cooldown_lifetime_secs = std::env::var(ENV_COOLDOWN_SECS)
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(defaults.cooldown_lifetime_secs);

        Self {
            enabled,
            cooldown_lifetime_secs,
        }
    }

    pub fn cooldown_lifetime(&self) -> Duration {
        Duration::from_secs(self.cooldown_lifetime_secs)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

fn parse_enabled(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
