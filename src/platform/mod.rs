//! Platform-specific functionality.
//!
//! On macOS the host clock is `mach_absolute_time` and strings/UUIDs crossing
//! the plug-in boundary are CoreFoundation objects. Elsewhere a monotonic
//! nanosecond clock stands in, strings are NUL-terminated C strings owned by
//! the caller and UUIDs are 16 raw bytes; that build exists so the plug-in ABI
//! can be exercised by tests on any host.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(target_os = "macos"))]
mod portable;

#[cfg(target_os = "macos")]
pub use macos::{string_from_host, string_to_host, uuid_from_host, SystemClock};
#[cfg(not(target_os = "macos"))]
pub use portable::{
    release_host_string, string_from_host, string_to_host, uuid_from_host, SystemClock,
};

/// Longest host string kept, in bytes.
pub const HOST_STRING_CAPACITY: usize = 255;

/// A string read from the host, held inline.
///
/// Qualifiers arrive on the property path, which must not allocate. Longer
/// input is cut at the last character boundary that fits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HostString {
    bytes: [u8; HOST_STRING_CAPACITY],
    len: usize,
}

impl HostString {
    /// Copies `bytes` if they are valid UTF-8.
    #[must_use]
    pub fn from_utf8(bytes: &[u8]) -> Option<Self> {
        std::str::from_utf8(bytes).ok().map(Self::from)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only whole UTF-8 sequences are ever copied in.
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl From<&str> for HostString {
    fn from(value: &str) -> Self {
        let mut len = value.len().min(HOST_STRING_CAPACITY);
        while !value.is_char_boundary(len) {
            len -= 1;
        }
        let mut bytes = [0; HOST_STRING_CAPACITY];
        bytes[..len].copy_from_slice(&value.as_bytes()[..len]);
        Self { bytes, len }
    }
}

impl std::fmt::Debug for HostString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self.as_str(), f)
    }
}
