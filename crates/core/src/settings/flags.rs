//! Report content flag words
//!
//! Both words are persisted as raw `u32` values. Unknown bits are retained so
//! a settings record written by newer firmware survives a load/save cycle.

use bitflags::bitflags;

bitflags! {
    /// Fields included in the location SMS
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SmsSendFlags: u32 {
        /// Include the position
        const LOCATION = 1 << 0;
        /// Two-bit location format field, see [`LocationFormat`]
        const LOCATION_FORMAT = 0b11 << 1;
        /// Include satellite count
        const NSAT = 1 << 3;
        /// Include altitude
        const ALT = 1 << 4;
        /// Include speed
        const SPEED = 1 << 5;
        /// Include ignition state
        const IGN = 1 << 6;
    }
}

/// How the position is rendered in the location SMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationFormat {
    /// Link to the web tracking page
    #[default]
    Web,
    /// Link to a map service
    Map,
    /// Plain latitude/longitude values
    Val,
}

const LOCATION_FORMAT_SHIFT: u32 = 1;

impl SmsSendFlags {
    /// Format selected by the two-bit field; the unassigned value 3 reads as `Web`
    pub fn location_format(&self) -> LocationFormat {
        match (self.bits() & Self::LOCATION_FORMAT.bits()) >> LOCATION_FORMAT_SHIFT {
            1 => LocationFormat::Map,
            2 => LocationFormat::Val,
            _ => LocationFormat::Web,
        }
    }

    pub fn with_location_format(self, format: LocationFormat) -> Self {
        let code = match format {
            LocationFormat::Web => 0,
            LocationFormat::Map => 1,
            LocationFormat::Val => 2,
        };
        let cleared = self.bits() & !Self::LOCATION_FORMAT.bits();
        Self::from_bits_retain(cleared | (code << LOCATION_FORMAT_SHIFT))
    }
}

impl Default for SmsSendFlags {
    fn default() -> Self {
        (Self::LOCATION | Self::NSAT | Self::ALT | Self::SPEED | Self::IGN)
            .with_location_format(LocationFormat::Web)
    }
}

bitflags! {
    /// Fields included in each server upload
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ServerSendFlags: u32 {
        const GPSDATE = 1 << 0;
        const GPSTIME = 1 << 1;
        const LATITUDE = 1 << 2;
        const LONGITUDE = 1 << 3;
        const SPEED = 1 << 4;
        const ALTITUDE = 1 << 5;
        const HEADING = 1 << 6;
        const HDOP = 1 << 7;
        const NSAT = 1 << 8;
        /// Battery voltage
        const BATT = 1 << 9;
        /// Ignition state
        const IGN = 1 << 10;
        /// Engine runtime
        const RUNTIME = 1 << 11;
    }
}

impl Default for ServerSendFlags {
    fn default() -> Self {
        Self::all() - (Self::BATT | Self::IGN | Self::RUNTIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_defaults() {
        let flags = SmsSendFlags::default();
        assert_eq!(flags.bits(), 0x79);
        assert_eq!(flags.location_format(), LocationFormat::Web);
    }

    #[test]
    fn test_server_defaults() {
        let flags = ServerSendFlags::default();
        assert_eq!(flags.bits(), 0x1FF);
        assert!(!flags.contains(ServerSendFlags::BATT));
        assert!(flags.contains(ServerSendFlags::HDOP));
    }

    #[test]
    fn test_location_format_field() {
        let flags = SmsSendFlags::default().with_location_format(LocationFormat::Val);
        assert_eq!(flags.bits(), 0x79 | 0b100);
        assert_eq!(flags.location_format(), LocationFormat::Val);

        let flags = flags.with_location_format(LocationFormat::Map);
        assert_eq!(flags.location_format(), LocationFormat::Map);
        assert!(flags.contains(SmsSendFlags::LOCATION | SmsSendFlags::IGN));
    }

    #[test]
    fn test_unassigned_format_reads_as_web() {
        let flags = SmsSendFlags::from_bits_retain(0b110);
        assert_eq!(flags.location_format(), LocationFormat::Web);
    }

    #[test]
    fn test_unknown_bits_retained() {
        let flags = ServerSendFlags::from_bits_retain(0x8000_0001);
        assert_eq!(flags.bits(), 0x8000_0001);
    }
}
