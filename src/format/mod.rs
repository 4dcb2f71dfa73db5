//! Stream format and sample conversion utilities.
//!
//! This module provides:
//! - The canonical device format and the formats it advertises
//! - Volume scalar ↔ decibel conversion
//! - Gain and stereo → mono conversion for the I/O path

mod convert;
mod stream;

pub use convert::{
    apply_gain, clamp_scalar, db_to_scalar, downmix, scalar_to_db, stereo_to_mono,
};
pub use stream::{
    available_formats, available_sample_rates, canonical_format, validate_format,
    validate_sample_rate, RangedFormat, StreamFormat, ValueRange, CANONICAL_FLAGS,
};
