use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{quantum::RENDER_QUANTUM_FRAMES, Result, SoundMeterError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub meter: MeterConfig,
}

impl AppConfig {
    /// Parses a JSON document. Missing sections fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;
        self.meter.validate()
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// Frames per render quantum.
    pub quantum_size: usize,
    /// Channels allocated for each input and output bus.
    pub channel_count: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            quantum_size: RENDER_QUANTUM_FRAMES,
            channel_count: 1,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SoundMeterError::InvalidConfig("sample rate must be positive"));
        }
        if self.quantum_size == 0 {
            return Err(SoundMeterError::InvalidConfig("quantum size must be positive"));
        }
        if self.channel_count == 0 {
            return Err(SoundMeterError::InvalidConfig("channel count must be positive"));
        }
        Ok(())
    }
}

/// Ballistics for the control-side level meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Lowest level reported, in dBFS.
    pub floor_db: f64,
    /// Multiplier applied to the held level on every reading, in `[0, 1]`.
    pub release: f64,
    /// Number of readings kept by the waveform trace.
    pub trace_capacity: usize,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            floor_db: -96.0,
            release: 0.9,
            trace_capacity: 1024,
        }
    }
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.release) {
            return Err(SoundMeterError::InvalidConfig("meter release must lie in [0, 1]"));
        }
        if !self.floor_db.is_finite() || self.floor_db > 0.0 {
            return Err(SoundMeterError::InvalidConfig("meter floor must be a finite dBFS value"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fill_defaults() {
        let config = AppConfig::from_json_str(r#"{ "audio": { "sample_rate": 44100 } }"#).unwrap();

        assert_eq!(config.audio.sample_rate, 44_100);
        assert_eq!(config.audio.quantum_size, RENDER_QUANTUM_FRAMES);
        assert_eq!(config.meter, MeterConfig::default());
    }

    #[test]
    fn rejects_zero_quantum() {
        let err = AppConfig::from_json_str(r#"{ "audio": { "quantum_size": 0 } }"#).unwrap_err();
        assert!(format!("{err}").contains("quantum size"));
    }

    #[test]
    fn rejects_out_of_range_release() {
        let mut config = AppConfig::default();
        config.meter.release = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reports_malformed_json() {
        let err = AppConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SoundMeterError::Json(_)));
    }
}
