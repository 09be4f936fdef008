use super::transaction::{Currency, Provider};
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// An online payment backend and where it may be used.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentPlugin {
    #[serde(skip)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Events the plugin is enabled for. `None` means every event.
    #[serde(default)]
    pub events: Option<BTreeSet<u32>>,
    /// Currencies the backend can charge in. `None` means any currency.
    #[serde(default, rename = "currencies")]
    pub valid_currencies: Option<BTreeSet<Currency>>,
}

fn default_enabled() -> bool {
    true
}

impl PaymentPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            events: None,
            valid_currencies: None,
        }
    }

    pub fn is_enabled_for(&self, event_id: u32) -> bool {
        self.enabled
            && self
                .events
                .as_ref()
                .is_none_or(|events| events.contains(&event_id))
    }

    pub fn accepts(&self, currency: &Currency) -> bool {
        self.valid_currencies
            .as_ref()
            .is_none_or(|currencies| currencies.contains(currency))
    }
}

/// The set of payment plugins known to the system.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, PaymentPlugin>,
    permissive: bool,
}

impl PluginRegistry {
    pub fn new(plugins: impl IntoIterator<Item = PaymentPlugin>) -> Self {
        Self {
            plugins: plugins
                .into_iter()
                .map(|plugin| (plugin.name.clone(), plugin))
                .collect(),
            permissive: false,
        }
    }

    /// A registry that accepts any provider in any currency.
    pub fn permissive() -> Self {
        Self {
            plugins: BTreeMap::new(),
            permissive: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PaymentPlugin> {
        self.plugins.get(name)
    }

    /// The payment backends enabled for an event.
    pub fn enabled_for(&self, event_id: u32) -> Vec<&PaymentPlugin> {
        self.plugins
            .values()
            .filter(|plugin| plugin.is_enabled_for(event_id))
            .collect()
    }

    /// The backends a registrant of the event could actually pay with.
    pub fn active_for(&self, event_id: u32, currency: &Currency) -> Vec<&PaymentPlugin> {
        self.enabled_for(event_id)
            .into_iter()
            .filter(|plugin| plugin.accepts(currency))
            .collect()
    }

    /// Verifies that `provider` may record a payment for the event in `currency`.
    ///
    /// The manual provider is always allowed.
    pub fn check(&self, provider: &Provider, event_id: u32, currency: &Currency) -> Result<()> {
        let name = match provider {
            Provider::Manual => return Ok(()),
            Provider::Plugin(name) => name,
        };
        if self.permissive && !self.plugins.contains_key(name) {
            return Ok(());
        }

        let plugin = self
            .plugins
            .get(name)
            .filter(|plugin| plugin.is_enabled_for(event_id))
            .ok_or_else(|| PaymentError::UnsupportedProvider {
                provider: name.clone(),
                event: event_id,
            })?;

        if !plugin.accepts(currency) {
            return Err(PaymentError::UnsupportedCurrency {
                provider: name.clone(),
                currency: currency.to_string(),
            });
        }
        Ok(())
    }
}
