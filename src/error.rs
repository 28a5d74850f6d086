//! Unified error types for the air-quality component.
//!
//! One crate-wide [`Error`] that every vendor boundary converts into, so the
//! orchestrator's abort path and the diagnostics counters see a single type.
//! All variants are `Copy` so they can be stored in [`UpdateStats`] and
//! carried in events without allocation.
//!
//! [`UpdateStats`]: crate::diagnostics::UpdateStats

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level component error
// ---------------------------------------------------------------------------

/// Every fallible operation in the component funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor driver rejected a call or the bus failed underneath it.
    Driver(DriverError),
    /// The fusion engine rejected its inputs.
    Fusion(FusionError),
    /// Bring-up failed; the component stays uninitialised.
    Setup(SetupError),
    /// `update()` was called before a successful `setup()`.
    NotReady,
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl Error {
    /// Coarse failure class used by the diagnostics counters.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Driver(e) if e.is_transport() => ErrorClass::Transport,
            Self::Driver(_) => ErrorClass::Driver,
            Self::Fusion(_) => ErrorClass::Fusion,
            Self::Setup(_) | Self::NotReady | Self::Config(_) => ErrorClass::Lifecycle,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(e) => write!(f, "driver: {e}"),
            Self::Fusion(e) => write!(f, "fusion: {e}"),
            Self::Setup(e) => write!(f, "setup: {e}"),
            Self::NotReady => write!(f, "component not set up"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

/// Failure taxonomy for the diagnostics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transport,
    Driver,
    Fusion,
    /// Component not set up or misconfigured; says nothing about the sensor.
    Lifecycle,
}

// ---------------------------------------------------------------------------
// Bus transport errors
// ---------------------------------------------------------------------------

/// A single register transfer on the bus failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Reading from the given register failed.
    Read(u8),
    /// Writing to the given register failed.
    Write(u8),
    /// The write does not fit in one bus frame.
    PayloadTooLong(usize),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(reg) => write!(f, "bus read failed at reg 0x{reg:02X}"),
            Self::Write(reg) => write!(f, "bus write failed at reg 0x{reg:02X}"),
            Self::PayloadTooLong(len) => write!(f, "write payload too long ({len} bytes)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor driver errors
// ---------------------------------------------------------------------------

/// Negative status codes returned by the vendor sensor driver.
///
/// Positive codes are warnings (e.g. "no new data") and are treated as
/// success by [`DriverError::from_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// A required pointer (device handle, callback) was null.
    NullPointer,
    /// A bus transfer failed.
    CommunicationFailed,
    /// The chip id did not match a supported device.
    DeviceNotFound,
    /// A register burst had an invalid length.
    InvalidLength,
    /// The built-in self-test reported out-of-range values.
    SelfTestFailed,
    /// Any other negative vendor code.
    Vendor(i8),
}

impl DriverError {
    pub const STATUS_OK: i8 = 0;

    /// Map a vendor status code: `>= 0` is success, negatives are errors.
    pub fn from_status(code: i8) -> core::result::Result<(), Self> {
        match code {
            c if c >= 0 => Ok(()),
            -1 => Err(Self::NullPointer),
            -2 => Err(Self::CommunicationFailed),
            -3 => Err(Self::DeviceNotFound),
            -4 => Err(Self::InvalidLength),
            -5 => Err(Self::SelfTestFailed),
            c => Err(Self::Vendor(c)),
        }
    }

    /// Vendor status code for this error.
    pub const fn code(self) -> i8 {
        match self {
            Self::NullPointer => -1,
            Self::CommunicationFailed => -2,
            Self::DeviceNotFound => -3,
            Self::InvalidLength => -4,
            Self::SelfTestFailed => -5,
            Self::Vendor(c) => c,
        }
    }

    /// Whether the error means nothing usable is answering on the bus.
    pub const fn is_hardware_absent(self) -> bool {
        matches!(
            self,
            Self::NullPointer | Self::CommunicationFailed | Self::DeviceNotFound
        )
    }

    pub const fn is_transport(self) -> bool {
        matches!(self, Self::CommunicationFailed)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullPointer => write!(f, "null pointer"),
            Self::CommunicationFailed => write!(f, "communication failed"),
            Self::DeviceNotFound => write!(f, "device not found"),
            Self::InvalidLength => write!(f, "invalid length"),
            Self::SelfTestFailed => write!(f, "self-test failed"),
            Self::Vendor(c) => write!(f, "vendor error {c}"),
        }
    }
}

impl From<TransportError> for DriverError {
    fn from(_: TransportError) -> Self {
        Self::CommunicationFailed
    }
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Self::Driver(e)
    }
}

// ---------------------------------------------------------------------------
// Fusion engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionError {
    /// An input id is not recognised by the library.
    InvalidInput,
    /// An input value is outside the library's accepted range.
    ValueLimits,
    /// The same input id was supplied twice in one step.
    DuplicateInput,
    /// Any other negative library code (subscription, config, state).
    Rejected(i32),
}

impl FusionError {
    /// Map a library return code: `>= 0` is success (positive = warning).
    pub fn from_status(code: i32) -> core::result::Result<(), Self> {
        match code {
            c if c >= 0 => Ok(()),
            -1 => Err(Self::InvalidInput),
            -2 => Err(Self::ValueLimits),
            -6 => Err(Self::DuplicateInput),
            c => Err(Self::Rejected(c)),
        }
    }
}

impl fmt::Display for FusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::ValueLimits => write!(f, "input value out of limits"),
            Self::DuplicateInput => write!(f, "duplicate input"),
            Self::Rejected(c) => write!(f, "rejected (code {c})"),
        }
    }
}

impl From<FusionError> for Error {
    fn from(e: FusionError) -> Self {
        Self::Fusion(e)
    }
}

// ---------------------------------------------------------------------------
// Setup errors
// ---------------------------------------------------------------------------

/// Why `setup()` could not bring the component up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// Driver init failed: nothing answered, or the chip id is wrong.
    HardwareNotFound(DriverError),
    /// The sensor answered but rejected the oversampling/heater settings.
    ConfigurationRejected(DriverError),
    /// The fusion library failed to initialise or subscribe.
    FusionRejected(FusionError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HardwareNotFound(e) => write!(f, "hardware not found ({e})"),
            Self::ConfigurationRejected(e) => write!(f, "configuration rejected ({e})"),
            Self::FusionRejected(e) => write!(f, "fusion engine rejected ({e})"),
        }
    }
}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Component-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
