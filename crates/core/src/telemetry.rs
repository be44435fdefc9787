//! Telemetry records buffered in the circular log

use crate::storage::RecordPayload;
use crate::wire::{WireReader, WireWriter};

/// `fix_age` value for a fix that was never acquired
pub const GPS_INVALID_AGE: u32 = 0xFFFF_FFFF;

/// One GPS fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsData {
    /// Age of this fix in milliseconds, or [`GPS_INVALID_AGE`]
    pub fix_age: u32,
    /// Degrees
    pub lat: f32,
    /// Degrees
    pub lon: f32,
    /// Meters above sea level
    pub alt: f32,
    /// Degrees from north
    pub course: f32,
    /// km/h
    pub speed: f32,
    /// Horizontal dilution of precision in hundredths
    pub hdop: u32,
    /// hhmmsscc as reported by the receiver
    pub time: u32,
    /// ddmmyy as reported by the receiver
    pub date: u32,
    pub nsats: u16,
}

impl Default for GpsData {
    fn default() -> Self {
        Self {
            fix_age: GPS_INVALID_AGE,
            lat: 0.0,
            lon: 0.0,
            alt: 0.0,
            course: 0.0,
            speed: 0.0,
            hdop: 0,
            time: 0,
            date: 0,
            nsats: 0,
        }
    }
}

impl GpsData {
    pub fn has_fix(&self) -> bool {
        self.fix_age != GPS_INVALID_AGE
    }

    fn put(&self, w: &mut WireWriter<'_>) {
        w.put_u32(self.fix_age);
        w.put_f32(self.lat);
        w.put_f32(self.lon);
        w.put_f32(self.alt);
        w.put_f32(self.course);
        w.put_f32(self.speed);
        w.put_u32(self.hdop);
        w.put_u32(self.time);
        w.put_u32(self.date);
        w.put_u16(self.nsats);
    }

    fn get(r: &mut WireReader<'_>) -> Option<Self> {
        Some(Self {
            fix_age: r.get_u32()?,
            lat: r.get_f32()?,
            lon: r.get_f32()?,
            alt: r.get_f32()?,
            course: r.get_f32()?,
            speed: r.get_f32()?,
            hdop: r.get_u32()?,
            time: r.get_u32()?,
            date: r.get_u32()?,
            nsats: r.get_u16()?,
        })
    }
}

impl RecordPayload for GpsData {
    const SIZE: usize = 38;

    fn write_bytes(&self, buf: &mut [u8]) {
        self.put(&mut WireWriter::new(buf));
    }

    fn from_bytes(buf: &[u8]) -> Option<Self> {
        Self::get(&mut WireReader::new(buf))
    }
}

/// Record uploaded to the tracking server
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ServerData {
    pub gps: GpsData,
    /// Ignition switch on
    pub ign_state: bool,
    /// Seconds the engine has been running
    pub engine_runtime: u32,
}

impl RecordPayload for ServerData {
    const SIZE: usize = GpsData::SIZE + 1 + 4;

    fn write_bytes(&self, buf: &mut [u8]) {
        let mut w = WireWriter::new(buf);
        self.gps.put(&mut w);
        w.put_bool(self.ign_state);
        w.put_u32(self.engine_runtime);
    }

    fn from_bytes(buf: &[u8]) -> Option<Self> {
        let mut r = WireReader::new(buf);
        Some(Self {
            gps: GpsData::get(&mut r)?,
            ign_state: r.get_bool()?,
            engine_runtime: r.get_u32()?,
        })
    }
}
