//! GPIO / peripheral pin assignments for the sensor board.
//!
//! Single source of truth; the binaries reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// I2C bus (sensor)
// ---------------------------------------------------------------------------

/// I2C SDA.
pub const I2C_SDA_GPIO: i32 = 14;
/// I2C SCL.
pub const I2C_SCL_GPIO: i32 = 15;
/// Bus clock. The sensor supports fast mode; standard mode keeps long
/// unshielded leads reliable.
pub const I2C_FREQ_HZ: u32 = 100_000;
