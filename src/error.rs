//! Error types for the loopback device.
//!
//! Errors are split into two categories:
//! - **Request errors** ([`HalError`]): a single host request was refused. Each
//!   variant maps onto one host status code via [`HalError::status()`].
//! - **Setup errors** ([`DriverError`]): the driver could not bring up one of
//!   its resources (currently only the shared-memory tap).

use crate::abi::{
    kAudioHardwareBadObjectError, kAudioHardwareBadPropertySizeError,
    kAudioHardwareIllegalOperationError, kAudioHardwareUnknownPropertyError,
    kAudioHardwareUnspecifiedError, kAudioHardwareUnsupportedOperationError, AudioObjectID,
    OSStatus,
};

/// A host request the driver refused.
///
/// Returned from every [`Driver`](crate::Driver) entry point. The plug-in
/// boundary turns it into an `OSStatus` with [`HalError::status()`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HalError {
    /// The object id does not name a published object.
    #[error("bad object id {id}")]
    BadObject {
        /// The id the host passed.
        id: AudioObjectID,
    },

    /// The object does not implement this selector (or not in this scope).
    #[error("object {id} has no property '{}'", fourcc_str(*selector))]
    UnknownProperty {
        /// Object that was queried.
        id: AudioObjectID,
        /// Four-char selector that was asked for.
        selector: u32,
    },

    /// A data buffer was too small for the value being transferred.
    #[error("property data size {actual} is smaller than the required {expected}")]
    BadPropertySize {
        /// Bytes the value needs.
        expected: u32,
        /// Bytes the host supplied.
        actual: u32,
    },

    /// The request is well-formed but not allowed in the current state.
    #[error("illegal operation: {reason}")]
    IllegalOperation {
        /// What was refused.
        reason: &'static str,
    },

    /// The driver hit an internal failure it cannot describe further.
    #[error("unspecified failure: {reason}")]
    Unspecified {
        /// What failed.
        reason: &'static str,
    },

    /// The operation is not something this device does at all.
    #[error("unsupported operation")]
    UnsupportedOperation,
}

impl HalError {
    /// Creates an [`IllegalOperation`](Self::IllegalOperation) error.
    pub fn illegal(reason: &'static str) -> Self {
        Self::IllegalOperation { reason }
    }

    /// Creates an [`UnknownProperty`](Self::UnknownProperty) error.
    pub fn unknown_property(id: AudioObjectID, selector: u32) -> Self {
        Self::UnknownProperty { id, selector }
    }

    /// The host status code for this error.
    #[must_use]
    #[allow(clippy::unnecessary_cast, clippy::cast_possible_wrap)]
    pub fn status(&self) -> OSStatus {
        let status = match self {
            Self::BadObject { .. } => kAudioHardwareBadObjectError,
            Self::UnknownProperty { .. } => kAudioHardwareUnknownPropertyError,
            Self::BadPropertySize { .. } => kAudioHardwareBadPropertySizeError,
            Self::IllegalOperation { .. } => kAudioHardwareIllegalOperationError,
            Self::Unspecified { .. } => kAudioHardwareUnspecifiedError,
            Self::UnsupportedOperation => kAudioHardwareUnsupportedOperationError,
        };
        status as OSStatus
    }
}

/// Failures while setting up or tearing down driver resources.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A POSIX shared-memory call failed.
    #[error("shared memory {op} failed for '{name}': {source}")]
    SharedMemory {
        /// Region name.
        name: String,
        /// The call that failed (`shm_open`, `ftruncate`, `mmap`).
        op: &'static str,
        /// OS error reported by the call.
        #[source]
        source: std::io::Error,
    },

    /// The configured region name cannot be used as a POSIX shm name.
    #[error("invalid shared memory name '{name}': {reason}")]
    InvalidRegionName {
        /// Name as configured.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl DriverError {
    /// Wraps the current `errno` for a failed shm call.
    pub fn last_os_error(name: &str, op: &'static str) -> Self {
        Self::SharedMemory {
            name: name.to_string(),
            op,
            source: std::io::Error::last_os_error(),
        }
    }
}

/// Renders a four-char code for messages, falling back to hex.
#[must_use]
pub fn fourcc_str(code: u32) -> String {
    let bytes = code.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        bytes.iter().map(|&b| char::from(b)).collect()
    } else {
        format!("{code:#010x}")
    }
}

/// Result alias for host requests.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{fourcc, kAudioDevicePropertyDeviceUID, kAudioStreamPropertyVirtualFormat};

    #[test]
    fn test_status_mapping() {
        assert_eq!(HalError::BadObject { id: 42 }.status(), fourcc(b"!obj") as OSStatus);
        assert_eq!(
            HalError::unknown_property(2, kAudioDevicePropertyDeviceUID).status(),
            fourcc(b"who?") as OSStatus
        );
        assert_eq!(
            HalError::BadPropertySize {
                expected: 4,
                actual: 2
            }
            .status(),
            fourcc(b"!siz") as OSStatus
        );
        assert_eq!(HalError::illegal("x").status(), fourcc(b"nope") as OSStatus);
        assert_eq!(
            HalError::Unspecified { reason: "x" }.status(),
            fourcc(b"what") as OSStatus
        );
        assert_eq!(
            HalError::UnsupportedOperation.status(),
            fourcc(b"unop") as OSStatus
        );
    }

    #[test]
    fn test_error_display_uses_fourcc() {
        let err = HalError::unknown_property(3, kAudioStreamPropertyVirtualFormat);
        assert_eq!(err.to_string(), "object 3 has no property 'sfmt'");
    }

    #[test]
    fn test_fourcc_str_non_printable() {
        assert_eq!(fourcc_str(1), "0x00000001");
        assert_eq!(fourcc_str(kAudioDevicePropertyDeviceUID), "uid ");
    }

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::SharedMemory {
            name: "/surge".into(),
            op: "mmap",
            source: std::io::Error::from_raw_os_error(libc::ENOMEM),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("shared memory mmap failed for '/surge'"));

        let err = DriverError::InvalidRegionName {
            name: "bad".into(),
            reason: "must start with '/'",
        };
        assert_eq!(
            err.to_string(),
            "invalid shared memory name 'bad': must start with '/'"
        );
    }
}
