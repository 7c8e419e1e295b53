//! Engine configuration: markup vocabulary and timing constants.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profile::AnimationProfile;

/// Class names, marker attribute and fallback tuning for one engine.
/// Every field has a default so partial JSON objects deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub container_class: String,
    /// Items are direct children of the Container carrying this class.
    pub item_class: String,
    pub toggle_class: String,
    pub panel_class: String,
    pub open_class: String,
    /// Idempotency marker set on hydrated Containers.
    pub hydrated_attribute: String,
    /// Added to `duration * 1000` for the settle fallback timer.
    pub fallback_slack_ms: u32,
    /// Profile used when neither Container nor Item declare a field.
    pub fallback: AnimationProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_class: "accordion".into(),
            item_class: "accordion-item".into(),
            toggle_class: "accordion-toggle".into(),
            panel_class: "accordion-content".into(),
            open_class: "is-open".into(),
            hydrated_attribute: "data-accordion-hydrated".into(),
            fallback_slack_ms: 100,
            fallback: AnimationProfile::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("container_class", &self.container_class),
            ("item_class", &self.item_class),
            ("toggle_class", &self.toggle_class),
            ("panel_class", &self.panel_class),
            ("open_class", &self.open_class),
            ("hydrated_attribute", &self.hydrated_attribute),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyName(field));
            }
        }
        Ok(())
    }

    /// Milliseconds before the settle fallback fires for a given duration.
    pub fn fallback_delay_ms(&self, duration_ms: u32) -> u32 {
        duration_ms.saturating_add(self.fallback_slack_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_names_are_rejected() {
        let cfg = EngineConfig {
            toggle_class: "  ".into(),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyName("toggle_class")));
    }

    #[test]
    fn fallback_delay_adds_slack() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.fallback_delay_ms(400), 500);
    }
}
