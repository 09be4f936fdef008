//! Settings file for the CLI.
//!
//! ```toml
//! admins = ["payments@example.org"]
//!
//! [plugins.paypal]
//! currencies = ["EUR", "USD"]
//!
//! [plugins.postfinance]
//! events = [7]
//! currencies = ["CHF"]
//! ```

use crate::domain::plugins::{PaymentPlugin, PluginRegistry};
use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Who gets told about double payments and amount mismatches.
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    plugins: Option<BTreeMap<String, PaymentPlugin>>,
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Builds the plugin registry. Without a `[plugins]` section every provider is accepted.
    pub fn plugin_registry(&self) -> PluginRegistry {
        match &self.plugins {
            None => PluginRegistry::permissive(),
            Some(plugins) => PluginRegistry::new(plugins.iter().map(|(name, plugin)| {
                let mut plugin = plugin.clone();
                plugin.name = name.clone();
                plugin
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{Currency, Provider};
    use crate::error::PaymentError;

    #[test]
    fn test_parse_settings() {
        let settings = Settings::from_toml(
            r#"
            admins = ["payments@example.org"]

            [plugins.paypal]
            currencies = ["eur", "USD"]

            [plugins.legacy]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.admins, vec!["payments@example.org"]);
        let registry = settings.plugin_registry();
        let paypal = registry.get("paypal").unwrap();
        assert!(paypal.enabled);
        assert!(paypal.accepts(&Currency::new("EUR").unwrap()));
        assert!(!registry.get("legacy").unwrap().enabled);
        assert!(matches!(
            registry.check(&Provider::from("stripe"), 1, &Currency::new("EUR").unwrap()),
            Err(PaymentError::UnsupportedProvider { .. })
        ));
    }

    #[test]
    fn test_missing_plugins_section_is_permissive() {
        let settings = Settings::from_toml("admins = []").unwrap();
        let registry = settings.plugin_registry();
        assert!(
            registry
                .check(&Provider::from("stripe"), 1, &Currency::new("EUR").unwrap())
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_currency_is_rejected() {
        let result = Settings::from_toml(
            r#"
            [plugins.paypal]
            currencies = ["EURO"]
            "#,
        );
        assert!(matches!(result, Err(PaymentError::ConfigError(_))));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Settings::from_toml("admin = 1").is_err());
    }
}
