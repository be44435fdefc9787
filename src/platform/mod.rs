//! Platform abstraction layer
//!
//! Hardware access is limited to the flash driver. Board support crates
//! implement [`FlashInterface`]; everything above it is target independent.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result};
pub use traits::FlashInterface;
