//! macOS host clock and CoreFoundation marshalling.

// FFI requires unsafe
#![allow(unsafe_code)]

mod core_foundation;

pub use core_foundation::{string_from_host, string_to_host, uuid_from_host};

use crate::engine::HostClock;

/// `mach_absolute_time`, the clock the audio server stamps I/O cycles with.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    ticks_per_second: f64,
}

impl SystemClock {
    #[allow(deprecated)]
    pub fn new() -> Self {
        let mut info = libc::mach_timebase_info_data_t { numer: 0, denom: 0 };
        // SAFETY: mach_timebase_info only writes the struct we pass.
        unsafe {
            libc::mach_timebase_info(&mut info);
        }
        let ticks_per_second = if info.numer == 0 || info.denom == 0 {
            1_000_000_000.0
        } else {
            // ticks * numer / denom = nanoseconds
            1_000_000_000.0 * f64::from(info.denom) / f64::from(info.numer)
        };
        Self { ticks_per_second }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock for SystemClock {
    #[allow(deprecated)]
    fn now(&self) -> u64 {
        // SAFETY: no preconditions.
        unsafe { libc::mach_absolute_time() }
    }

    fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }
}
