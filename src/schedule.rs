//! Periodic action gating
//!
//! The control loop evaluates the gate once per wall-clock minute with the
//! current GPS time. Schedules come from the active [`Settings`].

use opentracker_core::settings::Settings;
use opentracker_core::timespec::{DateTime, TimeSpec};

/// Schedules for the location SMS and the periodic reboot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleGate {
    pub sms_send_interval: TimeSpec,
    pub sms_quiet_period: TimeSpec,
    pub reboot_interval: TimeSpec,
}

impl ScheduleGate {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            sms_send_interval: settings.sms_send_interval,
            sms_quiet_period: settings.sms_quiet_period,
            reboot_interval: settings.reboot_interval,
        }
    }

    /// Location SMS is due and not suppressed by the quiet period
    pub fn sms_due(&self, now: &DateTime) -> bool {
        self.sms_send_interval.matches(now) && !self.sms_quiet_period.matches(now)
    }

    pub fn reboot_due(&self, now: &DateTime) -> bool {
        self.reboot_interval.matches(now)
    }
}

impl From<&Settings> for ScheduleGate {
    fn from(settings: &Settings) -> Self {
        Self::from_settings(settings)
    }
}
