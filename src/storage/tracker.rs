//! Tracker storage bring-up
//!
//! Opens both flash partitions over one flash device and runs the boot
//! sequence: log recovery scan first, then settings load.

use super::config::{ConfigLoader, ConfigSource};
use super::error::StorageError;
use super::flash_medium::FlashMedium;
use super::layout::{
    LOG_BASE, LOG_SIZE, LOG_SPARE_BASE, SETTINGS_BASE, SETTINGS_SIZE, SETTINGS_SPARE_BASE,
};
use crate::platform::FlashInterface;
use crate::{log_error, log_info, log_warn};
use core::cell::RefCell;
use opentracker_core::medium::Partition;
use opentracker_core::settings::Settings;
use opentracker_core::storage::{RecordStore, StoreError};
use opentracker_core::telemetry::ServerData;

/// Telemetry log over flash
pub type TelemetryLog<'a, F> = RecordStore<ServerData, FlashMedium<'a, F>>;

/// Opened tracker storage
///
/// The telemetry log may be invalid after [`open`](Self::open); it then
/// rejects every operation until [`wipe_log`](Self::wipe_log) is called. The
/// caller decides whether to wipe or keep the data for inspection.
pub struct TrackerStorage<'a, F: FlashInterface> {
    pub log: TelemetryLog<'a, F>,
    pub config: ConfigLoader<FlashMedium<'a, F>>,
    /// Active settings, stored or default
    pub settings: Settings,
    pub settings_source: ConfigSource,
}

impl<'a, F: FlashInterface> TrackerStorage<'a, F> {
    /// Open the partitions and run the boot sequence
    ///
    /// # Errors
    ///
    /// Only partition setup failures are returned. An invalid log or a
    /// missing settings record is logged and reflected in the returned state.
    pub fn open(flash: &'a RefCell<F>) -> Result<Self, StorageError> {
        let log_medium = FlashMedium::new(flash, LOG_BASE, LOG_SIZE, LOG_SPARE_BASE)?;
        let mut log = RecordStore::new(log_medium, Partition::new(0, LOG_SIZE as usize))?;

        match log.init() {
            Ok(index) => {
                log_info!(
                    "Telemetry log recovered: {} of {} records buffered",
                    index.count,
                    log.capacity()
                );
            }
            Err(e) => {
                let reason = log.recovery_fault().map_or(e.as_str(), |fault| fault.as_str());
                log_error!("Telemetry log invalid: {}", reason);
            }
        }

        let settings_medium =
            FlashMedium::new(flash, SETTINGS_BASE, SETTINGS_SIZE, SETTINGS_SPARE_BASE)?;
        let config = ConfigLoader::new(settings_medium, Partition::new(0, SETTINGS_SIZE as usize))?;
        let (settings, settings_source) = config.load();

        Ok(Self {
            log,
            config,
            settings,
            settings_source,
        })
    }

    /// Whether the log passed its recovery scan
    pub fn log_valid(&self) -> bool {
        self.log.is_valid()
    }

    /// Erase the telemetry log, discarding every buffered record
    pub fn wipe_log(&mut self) -> Result<(), StoreError> {
        let dropped = self.log.count();
        self.log.wipe()?;
        log_warn!("Telemetry log wiped, {} records dropped", dropped);
        Ok(())
    }

    /// Buffer a record, logging when the log is full
    pub fn record(&mut self, data: &ServerData) -> Result<(), StoreError> {
        self.log.append(data).inspect_err(|e| {
            log_warn!("Telemetry record dropped: {}", e.as_str());
        })
    }

    /// Replace the active settings and persist them
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), StoreError> {
        self.config.save(&settings)?;
        self.settings = settings;
        self.settings_source = ConfigSource::Stored;
        Ok(())
    }
}
