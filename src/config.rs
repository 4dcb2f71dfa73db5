//! Device identity and tuning defaults.

/// Device name published through the property protocol.
pub const DEVICE_NAME: &str = "Surge Audio";

/// Manufacturer published by the plug-in and the device.
pub const MANUFACTURER: &str = "Surge";

/// Persistent device UID.
pub const DEVICE_UID: &str = "SurgeAudioDevice_UID";

/// Model UID shared by every instance of this device.
pub const DEVICE_MODEL_UID: &str = "SurgeAudioDevice_ModelUID";

/// Factory UUID registered in the bundle's `Info.plist`.
pub const FACTORY_UUID: &str = "5A824EC3-B3E8-4C7C-9F2A-D8F6A1E2B3C4";

/// Name of the exported factory function.
pub const FACTORY_SYMBOL: &str = "SurgeAudioDriverPlugInFactory";

/// Nominal sample rates the device advertises, in Hz.
pub const SAMPLE_RATES: [f64; 4] = [44_100.0, 48_000.0, 96_000.0, 192_000.0];

/// Nominal sample rate at load.
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;

/// Interleaved channels per frame on both streams.
pub const CHANNELS: u32 = 2;

/// Bytes per interleaved frame (`CHANNELS` × `f32`).
pub const BYTES_PER_FRAME: u32 = CHANNELS * 4;

/// Loopback ring capacity in frames (≥170 ms at 48 kHz).
pub const RING_BUFFER_FRAMES: u32 = 16_384;

/// Frames between zero-timestamps.
pub const ZERO_TIMESTAMP_PERIOD: u32 = 512;

/// POSIX name of the shared tap region. Darwin limits names to 31 bytes.
pub const SHARED_REGION_NAME: &str = "/surge.audio.tap";

/// Mono frames held by the shared region: two seconds at 48 kHz.
pub const SHARED_REGION_FRAMES: usize = 96_000;

/// Floor used for scalar 0 and the bottom of the decibel range.
pub const MIN_DECIBELS: f32 = -96.0;

/// Top of the decibel range.
pub const MAX_DECIBELS: f32 = 0.0;

/// Configuration for a [`Driver`](crate::Driver).
///
/// Use [`DriverConfig::default()`] for the published Surge Audio device, or
/// override fields for tests.
///
/// # Example
///
/// ```
/// use surge_audio::DriverConfig;
///
/// let config = DriverConfig {
///     shared_region: None,
///     latency_frames: 64,
///     ..Default::default()
/// };
/// assert_eq!(config.device_name, "Surge Audio");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Device name.
    ///
    /// Default: "Surge Audio"
    pub device_name: &'static str,

    /// Manufacturer reported by the plug-in and the device.
    ///
    /// Default: "Surge"
    pub manufacturer: &'static str,

    /// Device UID used by `TranslateUIDToDevice`.
    pub device_uid: &'static str,

    /// Model UID.
    pub model_uid: &'static str,

    /// Loopback ring capacity in frames.
    ///
    /// Default: 16384
    pub ring_buffer_frames: u32,

    /// Zero-timestamp period in frames.
    ///
    /// Default: 512
    pub zero_timestamp_period: u32,

    /// Device and stream latency in frames.
    ///
    /// Default: 0
    pub latency_frames: u32,

    /// Device safety offset in frames.
    ///
    /// Default: 0
    pub safety_offset_frames: u32,

    /// Shared tap region to publish the output mix into, if any.
    ///
    /// Default: `Some("/surge.audio.tap")`
    pub shared_region: Option<&'static str>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME,
            manufacturer: MANUFACTURER,
            device_uid: DEVICE_UID,
            model_uid: DEVICE_MODEL_UID,
            ring_buffer_frames: RING_BUFFER_FRAMES,
            zero_timestamp_period: ZERO_TIMESTAMP_PERIOD,
            latency_frames: 0,
            safety_offset_frames: 0,
            shared_region: Some(SHARED_REGION_NAME),
        }
    }
}

/// Returns true if `rate` is one of the advertised nominal rates.
#[must_use]
pub fn is_supported_rate(rate: f64) -> bool {
    SAMPLE_RATES.iter().any(|&r| (r - rate).abs() < f64::EPSILON)
}
