//! agent.market connection settings.
//!
//! All knobs live in the config file with explicit defaults; the API key is
//! injected by the caller at construction time, never read from the
//! environment inside a field initializer.

use serde::{Deserialize, Serialize};

/// agent.market instance parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMarketConfig {
    /// Service base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Credit ceiling per created instance, in service credits.
    #[serde(default = "default_max_credit_per_instance")]
    pub max_credit_per_instance: f64,

    /// Seconds a provider has to pick up the instance.
    #[serde(default = "default_instance_timeout_secs")]
    pub instance_timeout_secs: u64,

    /// Seconds before the reward generation window closes.
    #[serde(default = "default_gen_reward_timeout_secs")]
    pub gen_reward_timeout_secs: u64,

    /// Delay between transcript polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Hard cap on transcript polls per instance. Worst-case acquisition
    /// latency is max_polls * poll_interval.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    #[serde(default = "default_percentage_reward")]
    pub percentage_reward: f64,

    #[serde(default)]
    pub side_effect_free: bool,

    #[serde(default = "default_max_providers")]
    pub max_providers: u32,

    #[serde(default)]
    pub contest_mode: bool,
}

impl Default for AgentMarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_credit_per_instance: default_max_credit_per_instance(),
            instance_timeout_secs: default_instance_timeout_secs(),
            gen_reward_timeout_secs: default_gen_reward_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            percentage_reward: default_percentage_reward(),
            side_effect_free: false,
            max_providers: default_max_providers(),
            contest_mode: false,
        }
    }
}

fn default_base_url() -> String {
    "https://api.agent.market".to_string()
}
fn default_max_credit_per_instance() -> f64 {
    0.05
}
fn default_instance_timeout_secs() -> u64 {
    90
}
fn default_gen_reward_timeout_secs() -> u64 {
    48 * 3600
}
fn default_poll_interval_ms() -> u64 {
    5_000
}
fn default_max_polls() -> u32 {
    18
}
fn default_percentage_reward() -> f64 {
    0.5
}
fn default_max_providers() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentMarketConfig::default();
        assert_eq!(config.base_url, "https://api.agent.market");
        assert_eq!(config.max_polls, 18);
        assert_eq!(config.poll_interval_ms, 5_000);
        assert_eq!(config.gen_reward_timeout_secs, 172_800);
        assert!(!config.side_effect_free);
        assert!(!config.contest_mode);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AgentMarketConfig = toml::from_str("max_polls = 3\npoll_interval_ms = 100").unwrap();
        assert_eq!(config.max_polls, 3);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.base_url, "https://api.agent.market");
    }
}
