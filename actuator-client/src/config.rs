use std::{fs, path::Path, time::Duration};

use actuator_shared::{DriveSettings, ProtocolVersion, DEFAULT_ACTUATOR_URL};
use serde::{Deserialize, Serialize};

use crate::error::{io_error, Error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub actuator_url: String,
    pub payload_frequency: f64,
    pub protocol: ProtocolVersion,
    /// Curve length in seconds when no track is loaded.
    pub default_duration: f64,
    pub drive: DriveSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actuator_url: DEFAULT_ACTUATOR_URL.to_string(),
            payload_frequency: 30.0,
            protocol: ProtocolVersion::default(),
            default_duration: 60.0,
            drive: DriveSettings::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, Error> {
        let text = fs::read_to_string(path).map_err(io_error(path))?;
        Config::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Config, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn override_with(
        &mut self,
        actuator_url: Option<String>,
        payload_frequency: Option<f64>,
        protocol: Option<ProtocolVersion>,
    ) {
        if let Some(actuator_url) = actuator_url {
            self.actuator_url = actuator_url;
        }
        if let Some(payload_frequency) = payload_frequency {
            self.payload_frequency = payload_frequency;
        }
        if let Some(protocol) = protocol {
            self.protocol = protocol;
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        positive("payload_frequency", self.payload_frequency)?;
        positive("default_duration", self.default_duration)?;
        positive("drive.input_full_scale", self.drive.input_full_scale)?;

        if self.actuator_url.trim().is_empty() {
            return Err(Error::InvalidConfig("actuator_url is empty".to_string()));
        }

        Ok(())
    }

    pub fn payload_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.payload_frequency)
    }
}

fn positive(name: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}
