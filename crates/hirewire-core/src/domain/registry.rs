//! The immutable table mapping each profile to its rules.

use std::collections::HashMap;

use super::rate_limit::{RateLimitProfile, RateLimitProfileConfig, RateLimitRule, RateLimitScope};

use RateLimitScope::{Ip, Tenant, User};

/// Profile lookup table, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<RateLimitProfile, RateLimitProfileConfig>,
}

impl ProfileRegistry {
    /// The production table.
    pub fn standard() -> Self {
        Self::from_configs(standard_configs())
    }

    /// Build a registry from explicit configs. A READ entry is always present
    /// afterwards, since it backs every lookup miss.
    pub fn from_configs(configs: impl IntoIterator<Item = RateLimitProfileConfig>) -> Self {
        let mut profiles: HashMap<_, _> = configs
            .into_iter()
            .map(|config| (config.profile, config))
            .collect();

        profiles
            .entry(RateLimitProfile::Read)
            .or_insert_with(read_config);

        Self { profiles }
    }

    /// Configuration for `profile`, falling back to READ when it is not in the table.
    pub fn get_config(&self, profile: RateLimitProfile) -> &RateLimitProfileConfig {
        match self.profiles.get(&profile) {
            Some(config) => config,
            None => {
                tracing::debug!(profile = %profile, "Profile not configured, using READ");
                self.read()
            }
        }
    }

    /// Resolve a textual profile name; unknown names get the READ configuration.
    pub fn config_for_name(&self, name: &str) -> &RateLimitProfileConfig {
        match name.parse::<RateLimitProfile>() {
            Ok(profile) => self.get_config(profile),
            Err(e) => {
                tracing::debug!(error = %e, "Falling back to READ profile");
                self.read()
            }
        }
    }

    /// All configured profiles in declaration order.
    pub fn configs(&self) -> Vec<&RateLimitProfileConfig> {
        RateLimitProfile::ALL
            .iter()
            .filter_map(|profile| self.profiles.get(profile))
            .collect()
    }

    fn read(&self) -> &RateLimitProfileConfig {
        // from_configs guarantees the READ entry.
        &self.profiles[&RateLimitProfile::Read]
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn read_config() -> RateLimitProfileConfig {
    RateLimitProfileConfig::new(
        RateLimitProfile::Read,
        "Read endpoints: per user and per tenant",
        vec![
            RateLimitRule::fixed(300, 60, User),
            RateLimitRule::fixed(3000, 60, Tenant),
        ],
    )
}

fn standard_configs() -> Vec<RateLimitProfileConfig> {
    vec![
        RateLimitProfileConfig::new(
            RateLimitProfile::Auth,
            "Login and token endpoints, per client IP",
            vec![RateLimitRule::fixed(5, 60, Ip)],
        ),
        RateLimitProfileConfig::new(
            RateLimitProfile::AuthSensitive,
            "Password reset and MFA flows, per client IP",
            vec![RateLimitRule::fixed(3, 60, Ip)],
        ),
        read_config(),
        RateLimitProfileConfig::new(
            RateLimitProfile::Write,
            "Mutating endpoints: per user and per tenant",
            vec![
                RateLimitRule::fixed(60, 60, User),
                RateLimitRule::fixed(600, 60, Tenant),
            ],
        ),
        RateLimitProfileConfig::new(
            RateLimitProfile::Calendar,
            "Calendar sync and availability: per user and per tenant",
            vec![
                RateLimitRule::fixed(60, 60, User),
                RateLimitRule::fixed(300, 60, Tenant),
            ],
        ),
        RateLimitProfileConfig::new(
            RateLimitProfile::Bulk,
            "Bulk imports and mass updates, per tenant per hour",
            vec![RateLimitRule::fixed(5, 3600, Tenant)],
        ),
        RateLimitProfileConfig::new(
            RateLimitProfile::Report,
            "Report generation, per user",
            vec![RateLimitRule::fixed(20, 60, User)],
        ),
        RateLimitProfileConfig::new(
            RateLimitProfile::Webhook,
            "Inbound integration webhooks, per tenant",
            vec![RateLimitRule::fixed(1000, 60, Tenant)],
        ),
        RateLimitProfileConfig::new(RateLimitProfile::None, "Not rate limited", Vec::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples(config: &RateLimitProfileConfig) -> Vec<(u64, u64, RateLimitScope)> {
        config
            .rules
            .iter()
            .map(|r| (r.max, r.window_seconds, r.scope))
            .collect()
    }

    #[test]
    fn test_standard_table() {
        let registry = ProfileRegistry::standard();
        let get = |p| triples(registry.get_config(p));

        assert_eq!(get(RateLimitProfile::Auth), vec![(5, 60, Ip)]);
        assert_eq!(get(RateLimitProfile::AuthSensitive), vec![(3, 60, Ip)]);
        assert_eq!(get(RateLimitProfile::Read), vec![(300, 60, User), (3000, 60, Tenant)]);
        assert_eq!(get(RateLimitProfile::Write), vec![(60, 60, User), (600, 60, Tenant)]);
        assert_eq!(get(RateLimitProfile::Calendar), vec![(60, 60, User), (300, 60, Tenant)]);
        assert_eq!(get(RateLimitProfile::Bulk), vec![(5, 3600, Tenant)]);
        assert_eq!(get(RateLimitProfile::Report), vec![(20, 60, User)]);
        assert_eq!(get(RateLimitProfile::Webhook), vec![(1000, 60, Tenant)]);
        assert!(get(RateLimitProfile::None).is_empty());
        assert_eq!(registry.configs().len(), 9);
    }

    #[test]
    fn test_missing_profile_falls_back_to_read() {
        let registry = ProfileRegistry::from_configs(Vec::new());

        let config = registry.get_config(RateLimitProfile::Report);
        assert_eq!(config.profile, RateLimitProfile::Read);
        assert_eq!(config.rules.len(), 2);
    }

    #[test]
    fn test_unknown_name_falls_back_to_read() {
        let registry = ProfileRegistry::standard();

        assert_eq!(registry.config_for_name("bulk").profile, RateLimitProfile::Bulk);
        assert_eq!(registry.config_for_name("nope").profile, RateLimitProfile::Read);
        assert_eq!(registry.config_for_name("").profile, RateLimitProfile::Read);
    }

    #[test]
    fn test_custom_read_is_kept() {
        let custom = RateLimitProfileConfig::new(
            RateLimitProfile::Read,
            "tight",
            vec![RateLimitRule::fixed(1, 1, Ip)],
        );
        let registry = ProfileRegistry::from_configs(vec![custom.clone()]);

        assert_eq!(registry.get_config(RateLimitProfile::Webhook), &custom);
    }
}
