//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements      | Connects to                     |
//! |------------|-----------------|---------------------------------|
//! | `i2c`      | BusTransport    | `embedded-hal` I2C bus + delay  |
//! | `log_sink` | EventSink       | Serial log output               |
//! |            | TelemetrySink   | Serial log output, per quantity |
//! | `time`     | Clock           | ESP32 system timer              |

pub mod i2c;
pub mod log_sink;
pub mod time;
