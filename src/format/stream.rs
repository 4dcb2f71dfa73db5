//! The device's stream format and the formats it advertises.
//!
//! The plug-in keeps its own copies of the host's format records so they can
//! be compared and built in `const` context. The boundary converts them into
//! the host layouts when a value is written out.

use crate::abi::{
    kAudioFormatFlagIsFloat, kAudioFormatFlagIsPacked, kAudioFormatFlagsNativeEndian,
    kAudioFormatLinearPCM, AudioStreamBasicDescription, AudioStreamRangedDescription,
    AudioValueRange,
};
use crate::config::{is_supported_rate, BYTES_PER_FRAME, CHANNELS, SAMPLE_RATES};
use crate::error::{HalError, HalResult};

/// Format flags for packed native-endian float.
#[allow(clippy::unnecessary_cast)]
pub const CANONICAL_FLAGS: u32 = (kAudioFormatFlagIsFloat
    | kAudioFormatFlagIsPacked
    | kAudioFormatFlagsNativeEndian) as u32;

/// A closed range of `f64`, as in `AudioValueRange`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValueRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl ValueRange {
    /// A range holding exactly one value.
    #[must_use]
    pub const fn point(value: f64) -> Self {
        Self {
            minimum: value,
            maximum: value,
        }
    }
}

/// An `AudioStreamBasicDescription`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub format_id: u32,
    pub format_flags: u32,
    pub bytes_per_packet: u32,
    pub frames_per_packet: u32,
    pub bytes_per_frame: u32,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
}

/// An `AudioStreamRangedDescription`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangedFormat {
    pub format: StreamFormat,
    pub sample_rate_range: ValueRange,
}

impl From<ValueRange> for AudioValueRange {
    fn from(range: ValueRange) -> Self {
        Self {
            mMinimum: range.minimum,
            mMaximum: range.maximum,
        }
    }
}

impl From<StreamFormat> for AudioStreamBasicDescription {
    fn from(format: StreamFormat) -> Self {
        Self {
            mSampleRate: format.sample_rate,
            mFormatID: format.format_id,
            mFormatFlags: format.format_flags,
            mBytesPerPacket: format.bytes_per_packet,
            mFramesPerPacket: format.frames_per_packet,
            mBytesPerFrame: format.bytes_per_frame,
            mChannelsPerFrame: format.channels_per_frame,
            mBitsPerChannel: format.bits_per_channel,
            mReserved: 0,
        }
    }
}

impl From<AudioStreamBasicDescription> for StreamFormat {
    fn from(asbd: AudioStreamBasicDescription) -> Self {
        Self {
            sample_rate: asbd.mSampleRate,
            format_id: asbd.mFormatID,
            format_flags: asbd.mFormatFlags,
            bytes_per_packet: asbd.mBytesPerPacket,
            frames_per_packet: asbd.mFramesPerPacket,
            bytes_per_frame: asbd.mBytesPerFrame,
            channels_per_frame: asbd.mChannelsPerFrame,
            bits_per_channel: asbd.mBitsPerChannel,
        }
    }
}

impl From<RangedFormat> for AudioStreamRangedDescription {
    fn from(ranged: RangedFormat) -> Self {
        Self {
            mFormat: ranged.format.into(),
            mSampleRateRange: ranged.sample_rate_range.into(),
        }
    }
}

/// Canonical 32-bit float stereo format at `sample_rate`.
#[must_use]
#[allow(clippy::unnecessary_cast)]
pub const fn canonical_format(sample_rate: f64) -> StreamFormat {
    StreamFormat {
        sample_rate,
        format_id: kAudioFormatLinearPCM as u32,
        format_flags: CANONICAL_FLAGS,
        bytes_per_packet: BYTES_PER_FRAME,
        frames_per_packet: 1,
        bytes_per_frame: BYTES_PER_FRAME,
        channels_per_frame: CHANNELS,
        bits_per_channel: 32,
    }
}

const RATE_COUNT: usize = SAMPLE_RATES.len();

static AVAILABLE_FORMATS: [RangedFormat; RATE_COUNT] = {
    let mut formats = [RangedFormat {
        format: canonical_format(0.0),
        sample_rate_range: ValueRange::point(0.0),
    }; RATE_COUNT];
    let mut i = 0;
    while i < RATE_COUNT {
        formats[i] = RangedFormat {
            format: canonical_format(SAMPLE_RATES[i]),
            sample_rate_range: ValueRange::point(SAMPLE_RATES[i]),
        };
        i += 1;
    }
    formats
};

static AVAILABLE_SAMPLE_RATES: [ValueRange; RATE_COUNT] = {
    let mut ranges = [ValueRange::point(0.0); RATE_COUNT];
    let mut i = 0;
    while i < RATE_COUNT {
        ranges[i] = ValueRange::point(SAMPLE_RATES[i]);
        i += 1;
    }
    ranges
};

/// The canonical format at each advertised rate.
#[must_use]
pub fn available_formats() -> &'static [RangedFormat] {
    &AVAILABLE_FORMATS
}

/// The advertised rates as degenerate ranges.
#[must_use]
pub fn available_sample_rates() -> &'static [ValueRange] {
    &AVAILABLE_SAMPLE_RATES
}

/// Checks that a nominal rate is advertised.
pub fn validate_sample_rate(rate: f64) -> HalResult<f64> {
    if is_supported_rate(rate) {
        Ok(rate)
    } else {
        Err(HalError::illegal("sample rate is not advertised"))
    }
}

/// Checks a format a client wants to set and returns its sample rate.
///
/// Only the canonical layout at an advertised rate is accepted.
pub fn validate_format(format: &StreamFormat) -> HalResult<f64> {
    let expected = canonical_format(format.sample_rate);
    if format.format_id != expected.format_id {
        return Err(HalError::illegal("format is not linear PCM"));
    }
    if format.format_flags != CANONICAL_FLAGS {
        return Err(HalError::illegal("format is not packed native-endian float"));
    }
    if format.channels_per_frame != expected.channels_per_frame
        || format.bits_per_channel != expected.bits_per_channel
        || format.bytes_per_frame != expected.bytes_per_frame
        || format.bytes_per_packet != expected.bytes_per_packet
        || format.frames_per_packet != expected.frames_per_packet
    {
        return Err(HalError::illegal("format layout is not 2 x f32"));
    }
    validate_sample_rate(format.sample_rate)
}
