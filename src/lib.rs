//! BME68x/BME69x + BSEC2 air-quality component.
//!
//! Exposes the pure-logic modules for integration testing and the two
//! firmware binaries. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pins;
pub mod selftest;

// Vendor bindings compile only on ESP-IDF; the callbacks and adapters
// build everywhere.
pub mod adapters;
pub mod drivers;
pub mod sensors;

pub use error::{Error, Result};
