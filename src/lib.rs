#![cfg_attr(not(test), no_std)]

//! opentracker - Telemetry buffering and settings persistence for the OpenTracker
//!
//! This library binds the platform-independent storage engine in
//! [`opentracker_core`] to a flash driver and adds the boot-time glue the
//! tracker firmware needs.
//!
//! # Modules
//!
//! - [`platform`]: Flash trait, platform errors and the mock flash
//! - [`storage`]: Flash-backed medium, partition map, config loader, boot sequence
//! - [`uplink`]: Batch upload of buffered telemetry
//! - [`schedule`]: SMS and reboot gating from the stored time specs
//! - [`core`]: Logging macros

extern crate alloc;

// Platform abstraction layer
pub mod platform;

// Core infrastructure (logging)
pub mod core;

pub mod schedule;
pub mod storage;
pub mod uplink;

pub use opentracker_core::{medium, settings, telemetry, timespec};
