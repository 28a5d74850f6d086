//! Vendor library bindings and the bus callbacks they call into.
//!
//! `callbacks` builds on every target; the FFI wrappers need the ESP-IDF
//! toolchain and the vendor component under `components/bme69x`.

pub mod callbacks;

#[cfg(target_os = "espidf")]
pub mod bme69x;
#[cfg(target_os = "espidf")]
pub mod bsec;
