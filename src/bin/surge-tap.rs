//! Attaches to the driver's shared tap and logs the level of the loopback mix.
//!
//! Usage: `surge-tap [--region NAME] [--interval-ms MS]`
//!
//! Defaults to the driver's region name and a 500 ms interval. Nothing is
//! stored; each interval logs RMS and peak in dBFS and the frames drained.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::float_cmp))]

use std::time::{Duration, Instant};

use clap::Parser;
use surge_audio::config::SHARED_REGION_NAME;
use surge_audio::format::scalar_to_db;
use surge_audio::SharedRegionReader;

/// surge-tap - level meter for the Surge Audio loopback tap
#[derive(Parser, Debug)]
#[command(name = "surge-tap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Shared-memory region the driver publishes
    #[arg(long, default_value = SHARED_REGION_NAME)]
    region: String,

    /// Milliseconds between level reports
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
}

/// Running level over one interval.
#[derive(Default)]
struct Meter {
    frames: u64,
    sum_squares: f64,
    peak: f32,
}

impl Meter {
    fn feed(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.sum_squares += f64::from(sample) * f64::from(sample);
            self.peak = self.peak.max(sample.abs());
        }
        self.frames += samples.len() as u64;
    }

    fn rms(&self) -> f32 {
        if self.frames == 0 {
            return 0.0;
        }
        (self.sum_squares / self.frames as f64).sqrt() as f32
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args {
        region,
        interval_ms,
    } = Args::parse();
    tracing_subscriber::fmt::init();

    let interval = Duration::from_millis(interval_ms);
    let mut reader = SharedRegionReader::open(&region)?;
    tracing::info!(
        region,
        sample_rate = reader.sample_rate(),
        channels = reader.channels(),
        frame_size = reader.frame_size(),
        "attached to tap"
    );

    let mut buffer = vec![0.0f32; 4096];
    let mut meter = Meter::default();
    let mut last_report = Instant::now();
    let mut was_active = reader.is_active();

    loop {
        let frames = reader.read(&mut buffer);
        meter.feed(&buffer[..frames]);

        let active = reader.is_active();
        if active != was_active {
            tracing::info!(active, "device io state changed");
            was_active = active;
        }

        if last_report.elapsed() >= interval {
            tracing::info!(
                frames = meter.frames,
                rms_db = scalar_to_db(meter.rms()),
                peak_db = scalar_to_db(meter.peak),
                write_pos = reader.write_position(),
                "level"
            );
            meter = Meter::default();
            last_report = Instant::now();
        }

        if frames == 0 {
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["surge-tap"]).unwrap();
        assert_eq!(args.region, SHARED_REGION_NAME);
        assert_eq!(args.interval_ms, 500);
    }

    #[test]
    fn test_args_flags() {
        let args =
            Args::try_parse_from(["surge-tap", "--region", "/other", "--interval-ms", "50"])
                .unwrap();
        assert_eq!(args.region, "/other");
        assert_eq!(args.interval_ms, 50);

        assert!(Args::try_parse_from(["surge-tap", "--interval-ms", "soon"]).is_err());
        assert!(Args::try_parse_from(["surge-tap", "/positional"]).is_err());
    }

    #[test]
    fn test_meter_levels() {
        let mut meter = Meter::default();
        assert_eq!(meter.rms(), 0.0);
        meter.feed(&[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(meter.frames, 4);
        assert!((meter.rms() - 0.5).abs() < 1e-6);
        assert_eq!(meter.peak, 0.5);
    }
}
