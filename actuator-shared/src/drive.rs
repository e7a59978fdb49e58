use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    pub max_frequency: f64,
    pub max_amplitude: f64,
    pub input_full_scale: f64,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            max_frequency: 5.0,
            max_amplitude: 1000.0,
            input_full_scale: 1023.0,
        }
    }
}

impl DriveSettings {
    pub fn frequency(&self, speed: i32) -> f64 {
        (speed as f64 / self.input_full_scale) * self.max_frequency
    }

    pub fn amplitude(&self, amplitude: i32) -> f64 {
        (amplitude as f64 / self.input_full_scale) * self.max_amplitude
    }

    pub fn amplitude_percent(&self, amplitude: i32) -> f64 {
        (amplitude as f64 / self.input_full_scale) * 100.0
    }

    /// `round(amplitude * sin(2π * frequency * time))`
    pub fn oscillate(&self, speed: i32, amplitude: i32, time: f64) -> i32 {
        let frequency = self.frequency(speed);
        let amplitude = self.amplitude(amplitude);
        (amplitude * (TAU * frequency * time).sin()).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_inputs_reach_maximums() {
        let drive = DriveSettings::default();
        assert_eq!(drive.frequency(1023), 5.0);
        assert_eq!(drive.amplitude(1023), 1000.0);
        assert_eq!(drive.amplitude_percent(1023), 100.0);
    }

    #[test]
    fn zero_amplitude_holds_center() {
        let drive = DriveSettings::default();
        for time in [0.0, 0.1, 0.37, 12.5] {
            assert_eq!(drive.oscillate(1023, 0, time), 0);
        }
    }

    #[test]
    fn oscillation_stays_within_amplitude() {
        let drive = DriveSettings::default();
        for step in 0..500 {
            let position = drive.oscillate(700, 512, step as f64 * 0.013);
            assert!(position.abs() <= drive.amplitude(512).round() as i32);
        }
    }
}
