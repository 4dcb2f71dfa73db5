//! Host stand-ins for platforms without the macOS audio server.

// FFI requires unsafe
#![allow(unsafe_code)]

use std::ffi::{c_char, c_void, CStr, CString};
use std::time::Instant;

use once_cell::sync::Lazy;

use crate::engine::HostClock;
use crate::platform::HostString;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Monotonic nanoseconds since first use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Lazy::force(&EPOCH);
        Self
    }
}

impl HostClock for SystemClock {
    fn now(&self) -> u64 {
        // Offset by one so a running clock never reports host time 0.
        EPOCH.elapsed().as_nanos() as u64 + 1
    }

    fn ticks_per_second(&self) -> f64 {
        1_000_000_000.0
    }
}

/// Hands a string to the caller as an owned C string.
///
/// Free it with [`release_host_string`]. Interior NULs truncate the string.
pub fn string_to_host(value: &str) -> *const c_void {
    let bytes: Vec<u8> = value.bytes().take_while(|&b| b != 0).collect();
    match CString::new(bytes) {
        Ok(owned) => owned.into_raw().cast_const().cast(),
        Err(_) => std::ptr::null(),
    }
}

/// Frees a string returned by [`string_to_host`].
///
/// # Safety
///
/// `ptr` must come from [`string_to_host`] and not have been released yet.
pub unsafe fn release_host_string(ptr: *const c_void) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr.cast_mut().cast::<c_char>()));
    }
}

/// Copies a NUL-terminated UTF-8 string into a fixed buffer.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
pub unsafe fn string_from_host(ptr: *const c_void) -> Option<HostString> {
    if ptr.is_null() {
        return None;
    }
    HostString::from_utf8(CStr::from_ptr(ptr.cast::<c_char>()).to_bytes())
}

/// Reads 16 raw UUID bytes.
///
/// # Safety
///
/// `ptr` must be null or point to 16 readable bytes.
pub unsafe fn uuid_from_host(ptr: *const c_void) -> Option<[u8; 16]> {
    if ptr.is_null() {
        return None;
    }
    Some(std::ptr::read_unaligned(ptr.cast::<[u8; 16]>()))
}
