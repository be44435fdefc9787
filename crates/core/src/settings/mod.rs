//! Device configuration
//!
//! [`Settings`] is the payload of the settings partition. Fields are laid out
//! in declaration order at fixed offsets; strings occupy fixed-width fields one
//! byte wider than their capacity so a NUL terminator always fits.

pub mod flags;

use crate::storage::RecordPayload;
use crate::timespec::TimeSpec;
use crate::wire::{WireReader, WireWriter};
use heapless::String;

pub use flags::{LocationFormat, ServerSendFlags, SmsSendFlags};

pub const MAX_APN_LEN: usize = 40;
pub const MAX_USERNAME_LEN: usize = 20;
pub const MAX_PASSWORD_LEN: usize = 20;
pub const MAX_SERVER_KEY_LEN: usize = 12;
pub const MAX_SIM_PIN_LEN: usize = 4;
pub const MAX_SMS_KEY_LEN: usize = 12;
/// 14 digits + check digit
pub const IMEI_LEN: usize = 15;
pub const MAX_PHONE_NUMBER_LEN: usize = 16;

/// Server update interval while stopped (seconds)
pub const DEFAULT_SLOW_SERVER_INTERVAL: u16 = 10 * 60;
/// Server update interval while moving (seconds)
pub const DEFAULT_FAST_SERVER_INTERVAL: u16 = 30;

/// Persisted device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// GPRS access point name
    pub apn: String<MAX_APN_LEN>,
    /// GPRS user name
    pub user: String<MAX_USERNAME_LEN>,
    /// GPRS password
    pub pwd: String<MAX_PASSWORD_LEN>,
    /// Seconds between server updates while stopped
    pub slow_server_interval: u16,
    /// Seconds between server updates while moving
    pub fast_server_interval: u16,
    /// Sent with every server upload
    pub key: String<MAX_SERVER_KEY_LEN>,
    pub sim_pin: String<MAX_SIM_PIN_LEN>,
    /// Required in every SMS command
    pub sms_key: String<MAX_SMS_KEY_LEN>,
    pub imei: String<IMEI_LEN>,
    pub server_send_flags: ServerSendFlags,
    /// When to send the location SMS
    pub sms_send_interval: TimeSpec,
    /// Recipient of the location SMS
    pub sms_send_number: String<MAX_PHONE_NUMBER_LEN>,
    pub sms_send_flags: SmsSendFlags,
    /// When to reboot the device
    pub reboot_interval: TimeSpec,
    /// No SMS is sent while this matches
    pub sms_quiet_period: TimeSpec,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            apn: String::new(),
            user: String::new(),
            pwd: String::new(),
            slow_server_interval: DEFAULT_SLOW_SERVER_INTERVAL,
            fast_server_interval: DEFAULT_FAST_SERVER_INTERVAL,
            key: String::new(),
            sim_pin: String::new(),
            sms_key: String::new(),
            imei: String::new(),
            server_send_flags: ServerSendFlags::default(),
            sms_send_interval: TimeSpec::daily(0, 0),
            sms_send_number: String::new(),
            sms_send_flags: SmsSendFlags::default(),
            reboot_interval: TimeSpec::weekly(0, 0, 0),
            sms_quiet_period: TimeSpec::None,
        }
    }
}

const fn field(capacity: usize) -> usize {
    capacity + 1
}

/// Schedules with out-of-range fields are persisted as `None`
fn put_timespec(writer: &mut WireWriter<'_>, spec: &TimeSpec) {
    writer.put_u32(spec.encode().unwrap_or(TimeSpec::NONE_RAW));
}

fn get_timespec(reader: &mut WireReader<'_>) -> Option<TimeSpec> {
    TimeSpec::decode(reader.get_u32()?).ok()
}

impl RecordPayload for Settings {
    const SIZE: usize = field(MAX_APN_LEN)
        + field(MAX_USERNAME_LEN)
        + field(MAX_PASSWORD_LEN)
        + 2
        + 2
        + field(MAX_SERVER_KEY_LEN)
        + field(MAX_SIM_PIN_LEN)
        + field(MAX_SMS_KEY_LEN)
        + field(IMEI_LEN)
        + 4
        + 4
        + field(MAX_PHONE_NUMBER_LEN)
        + 4
        + 4
        + 4;

    fn write_bytes(&self, buf: &mut [u8]) {
        let mut w = WireWriter::new(buf);
        w.put_str(&self.apn, field(MAX_APN_LEN));
        w.put_str(&self.user, field(MAX_USERNAME_LEN));
        w.put_str(&self.pwd, field(MAX_PASSWORD_LEN));
        w.put_u16(self.slow_server_interval);
        w.put_u16(self.fast_server_interval);
        w.put_str(&self.key, field(MAX_SERVER_KEY_LEN));
        w.put_str(&self.sim_pin, field(MAX_SIM_PIN_LEN));
        w.put_str(&self.sms_key, field(MAX_SMS_KEY_LEN));
        w.put_str(&self.imei, field(IMEI_LEN));
        w.put_u32(self.server_send_flags.bits());
        put_timespec(&mut w, &self.sms_send_interval);
        w.put_str(&self.sms_send_number, field(MAX_PHONE_NUMBER_LEN));
        w.put_u32(self.sms_send_flags.bits());
        put_timespec(&mut w, &self.reboot_interval);
        put_timespec(&mut w, &self.sms_quiet_period);
    }

    fn from_bytes(buf: &[u8]) -> Option<Self> {
        let mut r = WireReader::new(buf);
        Some(Self {
            apn: r.get_str(field(MAX_APN_LEN))?,
            user: r.get_str(field(MAX_USERNAME_LEN))?,
            pwd: r.get_str(field(MAX_PASSWORD_LEN))?,
            slow_server_interval: r.get_u16()?,
            fast_server_interval: r.get_u16()?,
            key: r.get_str(field(MAX_SERVER_KEY_LEN))?,
            sim_pin: r.get_str(field(MAX_SIM_PIN_LEN))?,
            sms_key: r.get_str(field(MAX_SMS_KEY_LEN))?,
            imei: r.get_str(field(IMEI_LEN))?,
            server_send_flags: ServerSendFlags::from_bits_retain(r.get_u32()?),
            sms_send_interval: get_timespec(&mut r)?,
            sms_send_number: r.get_str(field(MAX_PHONE_NUMBER_LEN))?,
            sms_send_flags: SmsSendFlags::from_bits_retain(r.get_u32()?),
            reboot_interval: get_timespec(&mut r)?,
            sms_quiet_period: get_timespec(&mut r)?,
        })
    }
}
