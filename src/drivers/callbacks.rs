//! `extern "C"` bus callbacks handed to the vendor sensor driver.
//!
//! The driver stores three function pointers plus an opaque `intf_ptr` and
//! calls back into us for every register transfer and settling delay. Each
//! trampoline is generic over the transport type, so the pointer is cast
//! back to exactly the `T` it was created from.
//!
//! Return convention matches the vendor interface: `0` on success, any
//! non-zero value is reported by the driver as a communication failure.

use core::ffi::c_void;

use crate::app::ports::BusTransport;

pub const INTF_OK: i8 = 0;
pub const INTF_FAIL: i8 = -1;

/// Register read callback.
///
/// # Safety
///
/// `intf_ptr` must be null or point to a live, exclusively borrowed `T`.
/// `reg_data` must be null or valid for `length` bytes of writes.
pub unsafe extern "C" fn read_callback<T: BusTransport>(
    reg_addr: u8,
    reg_data: *mut u8,
    length: u32,
    intf_ptr: *mut c_void,
) -> i8 {
    if intf_ptr.is_null() || (reg_data.is_null() && length > 0) {
        return INTF_FAIL;
    }
    // SAFETY: upheld by the caller per the contract above.
    let transport = unsafe { &mut *intf_ptr.cast::<T>() };
    let buf: &mut [u8] = if length == 0 {
        &mut []
    } else {
        // SAFETY: non-null and valid for `length` bytes per the contract above.
        unsafe { core::slice::from_raw_parts_mut(reg_data, length as usize) }
    };
    match transport.read(reg_addr, buf) {
        Ok(()) => INTF_OK,
        Err(_) => INTF_FAIL,
    }
}

/// Register write callback.
///
/// # Safety
///
/// `intf_ptr` must be null or point to a live, exclusively borrowed `T`.
/// `reg_data` must be null or valid for `length` bytes of reads.
pub unsafe extern "C" fn write_callback<T: BusTransport>(
    reg_addr: u8,
    reg_data: *const u8,
    length: u32,
    intf_ptr: *mut c_void,
) -> i8 {
    if intf_ptr.is_null() || (reg_data.is_null() && length > 0) {
        return INTF_FAIL;
    }
    // SAFETY: upheld by the caller per the contract above.
    let transport = unsafe { &mut *intf_ptr.cast::<T>() };
    let data: &[u8] = if length == 0 {
        &[]
    } else {
        // SAFETY: non-null and valid for `length` bytes per the contract above.
        unsafe { core::slice::from_raw_parts(reg_data, length as usize) }
    };
    match transport.write(reg_addr, data) {
        Ok(()) => INTF_OK,
        Err(_) => INTF_FAIL,
    }
}

/// Settling-delay callback. A null context is ignored.
///
/// # Safety
///
/// `intf_ptr` must be null or point to a live, exclusively borrowed `T`.
pub unsafe extern "C" fn delay_us_callback<T: BusTransport>(period: u32, intf_ptr: *mut c_void) {
    if intf_ptr.is_null() {
        return;
    }
    // SAFETY: upheld by the caller per the contract above.
    let transport = unsafe { &mut *intf_ptr.cast::<T>() };
    transport.delay_us(period);
}

/// Opaque context pointer for `transport`, as stored in the driver handle.
pub fn context_ptr<T: BusTransport>(transport: &mut T) -> *mut c_void {
    core::ptr::from_mut(transport).cast()
}
