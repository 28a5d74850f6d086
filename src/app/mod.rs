//! Application core, free of direct I/O.
//!
//! The update cycle, the setup sequence, and the sink bindings live here.
//! Everything that touches the bus, the vendor libraries, or the clock is
//! reached through the **port traits** in [`ports`], so the whole core runs
//! against scripted mocks on the host.

pub mod bindings;
pub mod events;
pub mod ports;
pub mod service;
