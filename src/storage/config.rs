//! Boot-time configuration loading
//!
//! The persisted [`Settings`] record is loaded once at boot. A missing,
//! outdated or corrupted record never blocks startup: the loader logs why and
//! falls back to the compiled-in defaults.
//!
//! # Build-time defaults
//!
//! Credentials can be baked into the firmware via environment variables read
//! by `build.rs`:
//! - `TRACKER_APN` - GPRS access point name
//! - `TRACKER_APN_USER` - GPRS user name
//! - `TRACKER_APN_PASSWORD` - GPRS password
//! - `TRACKER_SERVER_KEY` - key sent with every server upload
//! - `TRACKER_SMS_KEY` - key required in SMS commands

use crate::{log_info, log_warn};
use heapless::String;
use opentracker_core::medium::{BlockMedium, Partition};
use opentracker_core::settings::Settings;
use opentracker_core::storage::{SettingsStore, StoreError};

/// Where the active settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from the settings partition
    Stored,
    /// Compiled-in defaults; the stored record was rejected for this reason
    Defaults(StoreError),
}

/// Compiled-in settings used when no valid record is stored
pub fn default_settings() -> Settings {
    Settings {
        apn: build_default(env!("TRACKER_APN"), "TRACKER_APN"),
        user: build_default(env!("TRACKER_APN_USER"), "TRACKER_APN_USER"),
        pwd: build_default(env!("TRACKER_APN_PASSWORD"), "TRACKER_APN_PASSWORD"),
        key: build_default(env!("TRACKER_SERVER_KEY"), "TRACKER_SERVER_KEY"),
        sms_key: build_default(env!("TRACKER_SMS_KEY"), "TRACKER_SMS_KEY"),
        ..Settings::default()
    }
}

fn build_default<const N: usize>(value: &str, name: &str) -> String<N> {
    String::try_from(value).unwrap_or_else(|_| {
        log_warn!("{} longer than {} bytes, ignored", name, N);
        String::new()
    })
}

/// Loads and saves the settings record
pub struct ConfigLoader<M> {
    store: SettingsStore<Settings, M>,
}

impl<M: BlockMedium> ConfigLoader<M> {
    pub fn new(medium: M, partition: Partition) -> Result<Self, StoreError> {
        Ok(Self {
            store: SettingsStore::new(medium, partition)?,
        })
    }

    /// Load the stored settings, falling back to [`default_settings`]
    pub fn load(&self) -> (Settings, ConfigSource) {
        match self.store.init() {
            Ok(settings) => {
                log_info!("Settings loaded from flash");
                (settings, ConfigSource::Stored)
            }
            Err(StoreError::NoRecord) => {
                log_info!("No stored settings, using defaults");
                (default_settings(), ConfigSource::Defaults(StoreError::NoRecord))
            }
            Err(e) => {
                log_warn!("Stored settings rejected ({}), using defaults", e.as_str());
                (default_settings(), ConfigSource::Defaults(e))
            }
        }
    }

    /// Persist settings after a configuration change
    pub fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.store.save(settings)?;
        log_info!("Settings saved");
        Ok(())
    }

    /// Drop the stored record; the next boot uses the defaults
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        log_info!("Settings reset to defaults");
        Ok(())
    }

    pub fn store(&self) -> &SettingsStore<Settings, M> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore<Settings, M> {
        &mut self.store
    }
}
