use std::path::{Path, PathBuf};

use log::info;

use crate::error::Error;

const PEAKS_PER_SEC: u32 = 100;

/// An audio track reduced to what the editor draws: its length and a
/// coarse peak envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub duration: f64,
    peaks: Vec<f32>,
    peak_secs: f64,
}

impl Track {
    pub fn load(path: &Path) -> Result<Track, Error> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / max_val))
                    .collect::<Result<_, _>>()?
            }
        };

        let mut track = Track::from_samples(&samples, spec.channels, spec.sample_rate);
        track.path = path.to_path_buf();

        info!(
            "Loaded {}: {:.2} s, {} channels, {} Hz",
            path.display(),
            track.duration,
            spec.channels,
            spec.sample_rate
        );

        Ok(track)
    }

    pub fn from_samples(samples: &[f32], channels: u16, sample_rate: u32) -> Track {
        let channels = channels.max(1) as usize;
        let sample_rate = sample_rate.max(1);
        let frames = samples.len() / channels;
        let frames_per_peak = (sample_rate / PEAKS_PER_SEC).max(1) as usize;

        let peaks = samples
            .chunks(frames_per_peak * channels)
            .map(|chunk| chunk.iter().fold(0.0_f32, |peak, s| peak.max(s.abs())))
            .collect();

        Track {
            path: PathBuf::new(),
            duration: frames as f64 / sample_rate as f64,
            peaks,
            peak_secs: frames_per_peak as f64 / sample_rate as f64,
        }
    }

    /// Peak magnitude around `time`, 0 outside the track.
    pub fn peak_at(&self, time: f64) -> f32 {
        if time < 0.0 {
            return 0.0;
        }
        let index = (time / self.peak_secs) as usize;
        self.peaks.get(index).copied().unwrap_or(0.0)
    }
}
