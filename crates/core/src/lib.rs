//! opentracker_core - Platform-agnostic persistence logic for the OpenTracker
//!
//! This crate contains the storage engine and data layouts of the tracker.
//! Everything here can be tested on host without feature flags or hardware.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **no_std + alloc**: Only the RAM medium and batch reads allocate
//! - **Trait abstractions**: Storage backends injected via [`medium::BlockMedium`]
//!
//! # Modules
//!
//! - [`medium`]: Byte-addressable storage trait, partitions and the RAM adapter
//! - [`storage`]: Circular telemetry log, settings slot, framing and CRC
//! - [`timespec`]: 32-bit schedule descriptor codec and matcher
//! - [`settings`]: Device configuration layout and flag words
//! - [`telemetry`]: GPS/server record payloads stored in the log
//! - [`wire`]: Little-endian cursor helpers shared by the payload codecs

#![no_std]

extern crate alloc;

pub mod medium;
pub mod settings;
pub mod storage;
pub mod telemetry;
pub mod timespec;
pub mod wire;
