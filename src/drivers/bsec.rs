//! BSEC2 fusion library binding.
//!
//! BSEC keeps its state in library-global storage, so there is exactly one
//! engine per firmware image. Timestamps cross the boundary in nanoseconds.

use esp_idf_svc::sys::bme69x as ffi;
use log::{debug, info};

use crate::app::ports::FusionEngine;
use crate::error::FusionError;
use crate::sensors::{
    FusionInput, FusionOutput, FusionOutputs, MAX_FUSION_OUTPUTS, OutputKind, SampleRate,
};

/// Upper bound on physical-sensor settings returned by a subscription.
const MAX_REQUIRED_SETTINGS: usize = 8;

pub struct Bsec {
    outputs: [ffi::bsec_output_t; MAX_FUSION_OUTPUTS],
}

impl Default for Bsec {
    fn default() -> Self {
        Self::new()
    }
}

impl Bsec {
    pub fn new() -> Self {
        Self {
            // SAFETY: plain C structs of numbers.
            outputs: unsafe { core::mem::zeroed() },
        }
    }
}

fn status(code: ffi::bsec_library_return_t) -> Result<(), FusionError> {
    FusionError::from_status(code as i32)
}

impl FusionEngine for Bsec {
    fn init(&mut self) -> Result<(), FusionError> {
        status(unsafe { ffi::bsec_init() })?;
        info!("bsec: initialised");
        Ok(())
    }

    fn subscribe(&mut self, outputs: &[OutputKind], rate: SampleRate) -> Result<(), FusionError> {
        let mut requested: heapless::Vec<ffi::bsec_sensor_configuration_t, MAX_FUSION_OUTPUTS> =
            heapless::Vec::new();
        for kind in outputs {
            requested
                .push(ffi::bsec_sensor_configuration_t {
                    sample_rate: rate.hz(),
                    sensor_id: kind.id(),
                })
                .map_err(|_| FusionError::InvalidInput)?;
        }

        // SAFETY: plain C structs of numbers.
        let mut required: [ffi::bsec_sensor_configuration_t; MAX_REQUIRED_SETTINGS] =
            unsafe { core::mem::zeroed() };
        let mut n_required = MAX_REQUIRED_SETTINGS as u8;
        status(unsafe {
            ffi::bsec_update_subscription(
                requested.as_ptr(),
                requested.len() as u8,
                required.as_mut_ptr(),
                &mut n_required,
            )
        })?;
        info!(
            "bsec: subscribed {} output(s) at {:.4} Hz, {} physical input(s) required",
            requested.len(),
            rate.hz(),
            n_required
        );
        Ok(())
    }

    fn step(
        &mut self,
        inputs: &[FusionInput],
        outputs: &mut FusionOutputs,
    ) -> Result<(), FusionError> {
        outputs.clear();

        let mut frame: heapless::Vec<ffi::bsec_input_t, MAX_FUSION_OUTPUTS> = heapless::Vec::new();
        for input in inputs {
            frame
                .push(ffi::bsec_input_t {
                    time_stamp: (input.timestamp_us as i64).saturating_mul(1_000),
                    signal: input.value,
                    signal_dimensions: 1,
                    sensor_id: input.kind.id(),
                })
                .map_err(|_| FusionError::InvalidInput)?;
        }

        // In/out: capacity on entry, produced count on return.
        let mut n_outputs = MAX_FUSION_OUTPUTS as u8;
        status(unsafe {
            ffi::bsec_do_steps(
                frame.as_ptr(),
                frame.len() as u8,
                self.outputs.as_mut_ptr(),
                &mut n_outputs,
            )
        })?;

        let produced = usize::from(n_outputs).min(MAX_FUSION_OUTPUTS);
        for raw in &self.outputs[..produced] {
            // Cannot overflow: `produced` is clamped to the capacity.
            let _ = outputs.push(FusionOutput {
                kind: OutputKind::from_id(raw.sensor_id),
                value: raw.signal,
                accuracy: raw.accuracy,
            });
        }
        debug!("bsec: {} output(s)", produced);
        Ok(())
    }
}
