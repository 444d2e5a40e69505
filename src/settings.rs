//! Runtime configuration service.
//!
//! Holds the live [`Config`], answers `value` / `inspect` lookups by
//! [`SettingKey`], and notifies listeners with the set of keys affected by
//! each update.

use crate::config::{Config, ConfigWatcher, InspectedSetting, SettingKey, SettingValue};
use parking_lot::RwLock;
use term_decor_terminal::{Emitter, Subscription};

/// Notification that one or more settings changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChangeEvent {
    pub affected_keys: Vec<SettingKey>,
}

impl ConfigChangeEvent {
    pub fn affects_configuration(&self, key: SettingKey) -> bool {
        self.affected_keys.contains(&key)
    }
}

#[derive(Debug, Default)]
pub struct ConfigurationService {
    current: RwLock<Config>,
    on_did_change: Emitter<ConfigChangeEvent>,
}

impl ConfigurationService {
    pub fn new(config: Config) -> Self {
        Self {
            current: RwLock::new(config),
            on_did_change: Emitter::new(),
        }
    }

    /// Snapshot of the current configuration.
    pub fn get(&self) -> Config {
        self.current.read().clone()
    }

    pub fn value(&self, key: SettingKey) -> SettingValue {
        self.current.read().value(key)
    }

    pub fn inspect(&self, key: SettingKey) -> InspectedSetting {
        self.current.read().inspect(key)
    }

    pub fn on_did_change_configuration(&self) -> Subscription<ConfigChangeEvent> {
        self.on_did_change.subscribe()
    }

    /// Replace the configuration. Fires one change event if any key changed
    /// and returns it.
    pub fn update(&self, config: Config) -> Option<ConfigChangeEvent> {
        let affected_keys = {
            let mut current = self.current.write();
            let affected = current.changed_keys(&config);
            *current = config;
            affected
        };
        if affected_keys.is_empty() {
            return None;
        }
        log::debug!(
            "Configuration changed: {}",
            affected_keys
                .iter()
                .map(|key| key.id())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let event = ConfigChangeEvent { affected_keys };
        self.on_did_change.fire(event.clone());
        Some(event)
    }

    /// Apply an in-place edit to a copy of the configuration and publish it.
    pub fn update_with(&self, edit: impl FnOnce(&mut Config)) -> Option<ConfigChangeEvent> {
        let mut config = self.get();
        edit(&mut config);
        self.update(config)
    }

    /// Pick up a pending file reload from `watcher`, if any.
    ///
    /// Invalid files are logged and ignored; the previous configuration stays
    /// in effect.
    pub fn reload_from(&self, watcher: &ConfigWatcher) -> Option<ConfigChangeEvent> {
        match watcher.try_reload()? {
            Ok(config) => self.update(config),
            Err(e) => {
                log::warn!("Ignoring invalid config reload: {:#}", e);
                None
            }
        }
    }
}
