//! Update-cycle counters and heap leak checks.
//!
//! [`UpdateStats`] makes every aborted tick observable: the orchestrator
//! records each outcome here and operators read the counters back to spot
//! a failing sensor. [`HeapSnapshot`] backs the self-test harness's leak
//! smoke check, sampled through a [`HeapProbe`].

use crate::app::ports::{HeapClass, HeapProbe};
use crate::error::{Error, ErrorClass};

/// Allowed shrink of free heap across one self-test scenario (bytes).
pub const MEMORY_LEAK_THRESHOLD: isize = -800;

// ───────────────────────────────────────────────────────────────
// Update statistics
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateStats {
    /// Every `update()` call, whatever the outcome.
    pub ticks: u64,
    /// Ticks that published a reading.
    pub published: u64,
    /// Ticks where the driver had nothing new.
    pub no_data: u64,
    /// Ticks abandoned on an error.
    pub aborted: u64,
    pub transport_failures: u64,
    pub driver_failures: u64,
    pub fusion_failures: u64,
    /// Aborts from calling `update()` outside the ready state.
    pub lifecycle_failures: u64,
    /// Aborts since the last successful tick.
    pub consecutive_failures: u32,
    pub last_error: Option<Error>,
}

impl UpdateStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful tick. Returns the failure streak it ended.
    pub fn record_published(&mut self) -> u32 {
        self.ticks += 1;
        self.published += 1;
        core::mem::take(&mut self.consecutive_failures)
    }

    /// Record a tick with no new data. Does not end a failure streak.
    pub fn record_no_data(&mut self) {
        self.ticks += 1;
        self.no_data += 1;
    }

    /// Record an aborted tick. Returns the current failure streak.
    pub fn record_abort(&mut self, error: Error) -> u32 {
        self.ticks += 1;
        self.aborted += 1;
        match error.class() {
            ErrorClass::Transport => self.transport_failures += 1,
            ErrorClass::Driver => self.driver_failures += 1,
            ErrorClass::Fusion => self.fusion_failures += 1,
            ErrorClass::Lifecycle => self.lifecycle_failures += 1,
        }
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error);
        self.consecutive_failures
    }
}

// ───────────────────────────────────────────────────────────────
// Heap snapshots
// ───────────────────────────────────────────────────────────────

/// Free heap per capability class at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSnapshot {
    pub free_8bit: usize,
    pub free_32bit: usize,
}

impl HeapSnapshot {
    pub fn take(probe: &impl HeapProbe) -> Self {
        Self {
            free_8bit: probe.free_bytes(HeapClass::Byte8),
            free_32bit: probe.free_bytes(HeapClass::Word32),
        }
    }

    /// Signed change from `self` (before) to `after`.
    pub fn delta(&self, after: &Self) -> HeapDelta {
        HeapDelta {
            delta_8bit: signed_delta(self.free_8bit, after.free_8bit),
            delta_32bit: signed_delta(self.free_32bit, after.free_32bit),
        }
    }
}

fn signed_delta(before: usize, after: usize) -> isize {
    if after >= before {
        (after - before) as isize
    } else {
        -((before - after) as isize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapDelta {
    pub delta_8bit: isize,
    pub delta_32bit: isize,
}

impl HeapDelta {
    /// First class whose free heap shrank by more than `threshold` allows.
    pub fn leaked(&self, threshold: isize) -> Option<(HeapClass, isize)> {
        if self.delta_8bit < threshold {
            Some((HeapClass::Byte8, self.delta_8bit))
        } else if self.delta_32bit < threshold {
            Some((HeapClass::Word32, self.delta_32bit))
        } else {
            None
        }
    }
}

// ───────────────────────────────────────────────────────────────
// System heap probe
// ───────────────────────────────────────────────────────────────

/// [`HeapProbe`] over the allocator the firmware actually runs on.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHeap;

impl HeapProbe for SystemHeap {
    #[cfg(target_os = "espidf")]
    fn free_bytes(&self, class: HeapClass) -> usize {
        use esp_idf_svc::sys::{MALLOC_CAP_8BIT, MALLOC_CAP_32BIT, heap_caps_get_free_size};
        let caps = match class {
            HeapClass::Byte8 => MALLOC_CAP_8BIT,
            HeapClass::Word32 => MALLOC_CAP_32BIT,
        };
        // SAFETY: read-only query of allocator statistics.
        unsafe { heap_caps_get_free_size(caps) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn free_bytes(&self, class: HeapClass) -> usize {
        // Synthetic, stable values so host runs take the same branches.
        match class {
            HeapClass::Byte8 => 307_200,
            HeapClass::Word32 => 327_680,
        }
    }
}
