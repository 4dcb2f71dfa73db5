//! Gain and channel conversion.

use crate::config::{MAX_DECIBELS, MIN_DECIBELS};

/// Converts a volume scalar to decibels.
///
/// The scalar is clamped to [0.0, 1.0]. Zero (and anything quieter than the
/// floor) maps to the -96 dB floor.
#[inline]
pub fn scalar_to_db(scalar: f32) -> f32 {
    let scalar = sanitize(scalar).clamp(0.0, 1.0);
    if scalar <= 0.0 {
        return MIN_DECIBELS;
    }
    (20.0 * scalar.log10()).clamp(MIN_DECIBELS, MAX_DECIBELS)
}

/// Converts decibels to a volume scalar.
///
/// Input is clamped to [-96, 0] dB; the floor maps to exactly 0.0.
#[inline]
pub fn db_to_scalar(db: f32) -> f32 {
    let db = if db.is_nan() { MIN_DECIBELS } else { db };
    let db = db.clamp(MIN_DECIBELS, MAX_DECIBELS);
    if db <= MIN_DECIBELS {
        return 0.0;
    }
    10.0_f32.powf(db / 20.0)
}

/// Clamps a scalar coming from a client into [0.0, 1.0].
#[inline]
pub fn clamp_scalar(scalar: f32) -> f32 {
    sanitize(scalar).clamp(0.0, 1.0)
}

fn sanitize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

/// Downmixes one stereo frame to mono by averaging the two channels.
#[inline]
pub fn downmix(left: f32, right: f32) -> f32 {
    (left + right) * 0.5
}

/// Converts interleaved stereo samples to mono without allocating.
///
/// A trailing odd sample is ignored.
pub fn stereo_to_mono(stereo: &[f32]) -> impl Iterator<Item = f32> + '_ {
    stereo.chunks_exact(2).map(|pair| downmix(pair[0], pair[1]))
}

/// Multiplies `samples` in place by `gain`. Unity gain is a no-op.
#[inline]
pub fn apply_gain(samples: &mut [f32], gain: f32) {
    if (gain - 1.0).abs() < f32::EPSILON {
        return;
    }
    for sample in samples {
        *sample *= gain;
    }
}
