//! BME68x/BME69x vendor driver binding.
//!
//! Owns the vendor `bme69x_dev` handle and the bus transport it calls back
//! into. Bindings are generated by esp-idf-sys from
//! `components/bme69x/bindings.h`.

use core::ptr::NonNull;

use esp_idf_svc::sys::bme69x as ffi;
use log::{debug, info};

use crate::app::ports::{BusTransport, SensorDriver};
use crate::error::DriverError;
use crate::sensors::{HeaterConfig, OperatingMode, Reading, ReadingStatus, SensorSettings};

use super::callbacks::{delay_us_callback, read_callback, write_callback};

/// Ambient temperature assumed for heater resistance calculation (°C).
const AMBIENT_TEMP_C: i8 = 25;
/// "No standby" output data rate; forced mode ignores it.
const ODR_NONE: u8 = 8;

pub struct Bme69xDriver<T: BusTransport> {
    dev: Box<ffi::bme69x_dev>,
    /// Heap-pinned transport the vendor driver reaches through `intf_ptr`.
    transport: NonNull<T>,
}

impl<T: BusTransport> Bme69xDriver<T> {
    /// Bind `transport` to a fresh driver handle. No bus traffic yet.
    pub fn new(transport: T) -> Self {
        let transport = NonNull::from(Box::leak(Box::new(transport)));

        // SAFETY: the handle is a plain C struct; all-zero is its reset state.
        let mut dev: Box<ffi::bme69x_dev> = Box::new(unsafe { core::mem::zeroed() });
        dev.intf = ffi::bme69x_intf_BME69X_I2C_INTF;
        dev.intf_ptr = transport.as_ptr().cast();
        dev.read = Some(read_callback::<T>);
        dev.write = Some(write_callback::<T>);
        dev.delay_us = Some(delay_us_callback::<T>);
        dev.amb_temp = AMBIENT_TEMP_C;

        Self { dev, transport }
    }

    /// Chip id read during `init()` (0 before).
    pub fn chip_id(&self) -> u8 {
        self.dev.chip_id
    }

    fn vendor_conf(settings: &SensorSettings) -> ffi::bme69x_conf {
        // SAFETY: plain C struct of integers.
        let mut conf: ffi::bme69x_conf = unsafe { core::mem::zeroed() };
        conf.os_temp = settings.os_temperature as u8;
        conf.os_pres = settings.os_pressure as u8;
        conf.os_hum = settings.os_humidity as u8;
        conf.filter = settings.filter as u8;
        conf.odr = ODR_NONE;
        conf
    }
}

impl<T: BusTransport> SensorDriver for Bme69xDriver<T> {
    fn init(&mut self) -> Result<(), DriverError> {
        DriverError::from_status(unsafe { ffi::bme69x_init(&mut *self.dev) })?;
        info!(
            "bme69x: chip 0x{:02X} variant {}",
            self.dev.chip_id, self.dev.variant_id
        );
        Ok(())
    }

    fn set_config(&mut self, settings: &SensorSettings) -> Result<(), DriverError> {
        let mut conf = Self::vendor_conf(settings);
        DriverError::from_status(unsafe { ffi::bme69x_set_conf(&mut conf, &mut *self.dev) })
    }

    fn set_heater_config(
        &mut self,
        mode: OperatingMode,
        heater: &HeaterConfig,
    ) -> Result<(), DriverError> {
        // SAFETY: all-zero leaves the profile pointers null, which the
        // driver ignores outside parallel/sequential mode.
        let mut conf: ffi::bme69x_heatr_conf = unsafe { core::mem::zeroed() };
        conf.enable = u8::from(heater.enabled);
        conf.heatr_temp = heater.temperature_c;
        conf.heatr_dur = heater.duration_ms;
        DriverError::from_status(unsafe {
            ffi::bme69x_set_heatr_conf(mode as u8, &mut conf, &mut *self.dev)
        })
    }

    fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<(), DriverError> {
        DriverError::from_status(unsafe { ffi::bme69x_set_op_mode(mode as u8, &mut *self.dev) })
    }

    fn measurement_duration_us(&mut self, mode: OperatingMode, settings: &SensorSettings) -> u32 {
        let mut conf = Self::vendor_conf(settings);
        unsafe { ffi::bme69x_get_meas_dur(mode as u8, &mut conf, &mut *self.dev) }
    }

    fn get_data(&mut self, mode: OperatingMode) -> Result<Reading, DriverError> {
        // SAFETY: plain C struct of numbers.
        let mut data: ffi::bme69x_data = unsafe { core::mem::zeroed() };
        let mut n_fields: u8 = 0;
        DriverError::from_status(unsafe {
            ffi::bme69x_get_data(mode as u8, &mut data, &mut n_fields, &mut *self.dev)
        })?;
        if n_fields == 0 {
            return Ok(Reading::empty());
        }
        debug!("bme69x: status=0x{:02X} n_fields={}", data.status, n_fields);
        Ok(Reading {
            temperature: data.temperature,
            pressure: data.pressure,
            humidity: data.humidity,
            gas_resistance: data.gas_resistance,
            status: ReadingStatus::from_bits_retain(data.status),
            n_fields,
        })
    }

    fn self_test(&mut self) -> Result<(), DriverError> {
        DriverError::from_status(unsafe { ffi::bme69x_selftest_check(&mut *self.dev) })
    }

    fn deinit(&mut self) -> Result<(), DriverError> {
        DriverError::from_status(unsafe { ffi::bme69x_soft_reset(&mut *self.dev) })
    }

    fn delay_us(&mut self, period_us: u32) {
        // SAFETY: the transport lives until drop and the vendor driver is
        // not running while we hold this borrow.
        unsafe { self.transport.as_mut() }.delay_us(period_us);
    }
}

impl<T: BusTransport> Drop for Bme69xDriver<T> {
    fn drop(&mut self) {
        self.dev.intf_ptr = core::ptr::null_mut();
        // SAFETY: allocated by `Box::leak` in `new` and released only here.
        drop(unsafe { Box::from_raw(self.transport.as_ptr()) });
    }
}
