//! Core infrastructure shared by the storage and scheduling layers

pub mod logging;
