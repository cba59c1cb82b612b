pub mod resolve;

use serde::Deserialize;

/// Sentinel test name that excludes an entire target.
pub const FILTER_ALL: &str = "*";

/// One catalog entry excluding a sub-test (or a whole target) for a
/// platform/config combination.
///
/// An empty `config` means the rule applies under every configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterRule {
    pub target_name: String,
    #[serde(default)]
    pub config: String,
    pub test_name: String,
}

impl FilterRule {
    /// Build a rule that applies under every configuration.
    pub fn any_config(target_name: &str, test_name: &str) -> Self {
        Self {
            target_name: target_name.to_owned(),
            config: String::new(),
            test_name: test_name.to_owned(),
        }
    }

    /// Build a rule restricted to one configuration.
    pub fn for_config(target_name: &str, config: &str, test_name: &str) -> Self {
        Self {
            target_name: target_name.to_owned(),
            config: config.to_owned(),
            test_name: test_name.to_owned(),
        }
    }

    /// Whether this rule applies under the requested configuration.
    pub fn applies_to_config(&self, config: &str) -> bool {
        self.config.is_empty() || self.config == config
    }

    /// Whether this rule removes its whole target rather than one sub-test.
    pub fn filters_whole_target(&self) -> bool {
        self.test_name == FILTER_ALL
    }
}
