//! The handful of CoreFoundation calls the plug-in boundary needs.

use std::ffi::c_void;

use coreaudio_sys::{
    kCFStringEncodingUTF8, CFIndex, CFStringCreateWithBytes, CFStringGetCString,
    CFUUIDGetUUIDBytes,
};

use crate::abi::uuid_bytes;
use crate::platform::{HostString, HOST_STRING_CAPACITY};

// Some CoreFoundation symbols referenced through coreaudio-sys are not linked
// by it.
#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {}

/// Creates a `CFString` (+1 retained) the host takes ownership of.
pub fn string_to_host(value: &str) -> *const c_void {
    // SAFETY: bytes/len describe a valid UTF-8 slice; the default allocator is
    // requested with a null allocator ref.
    let string = unsafe {
        CFStringCreateWithBytes(
            std::ptr::null(),
            value.as_ptr(),
            value.len() as CFIndex,
            kCFStringEncodingUTF8,
            0,
        )
    };
    string.cast()
}

/// Copies a `CFString` into a fixed buffer.
///
/// # Safety
///
/// `string` must be null or a valid `CFStringRef`.
pub unsafe fn string_from_host(string: *const c_void) -> Option<HostString> {
    if string.is_null() {
        return None;
    }
    let mut buffer = [0u8; HOST_STRING_CAPACITY + 1];
    let ok = CFStringGetCString(
        string.cast(),
        buffer.as_mut_ptr().cast(),
        buffer.len() as CFIndex,
        kCFStringEncodingUTF8,
    );
    if ok == 0 {
        return None;
    }
    let len = buffer
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(HOST_STRING_CAPACITY);
    HostString::from_utf8(&buffer[..len])
}

/// Reads the bytes of a `CFUUID`.
///
/// # Safety
///
/// `uuid` must be null or a valid `CFUUIDRef`.
pub unsafe fn uuid_from_host(uuid: *const c_void) -> Option<[u8; 16]> {
    if uuid.is_null() {
        return None;
    }
    Some(uuid_bytes(&CFUUIDGetUUIDBytes(uuid.cast())))
}
