//! Mock platform implementation for testing
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use opentracker::platform::mock::MockFlash;
//! use opentracker::platform::traits::FlashInterface;
//!
//! let mut flash = MockFlash::new();
//! flash.write(0x040000, b"SETT").unwrap();
//! assert_eq!(flash.get_contents(0x040000, 4), b"SETT");
//! ```

#![cfg(any(test, feature = "mock"))]

mod flash;

pub use flash::MockFlash;
