//! Compilation settings, readable from a TOML file.
//!
//! ```toml
//! sample_rate = "1.2 GHz"
//! shape_directory = "shapes"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::units::{Dimension, Hertz, Measure, Quantity};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Samples per second of every rendered waveform.
    pub sample_rate: Quantity,

    /// Base directory for relative pulse shape file paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: Quantity::new(1e9, Dimension::Frequency),
            shape_directory: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("sample rate must be a frequency, found {0}")]
    SampleRateNotAFrequency(Quantity),

    #[error("sample rate must be positive and finite, found {0}")]
    SampleRateNotPositive(Quantity),
}

impl Settings {
    pub fn with_sample_rate(mut self, sample_rate: Quantity) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_shape_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.shape_directory = Some(directory.into());
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let rate = self.sample_rate;
        if !rate.has_dimension(Dimension::Frequency) {
            return Err(SettingsError::SampleRateNotAFrequency(rate));
        }
        if !(rate.value().is_finite() && rate.value() > 0.0) {
            return Err(SettingsError::SampleRateNotPositive(rate));
        }
        Ok(())
    }

    /// The sample rate as a typed measure.
    pub fn sample_rate(&self) -> Result<Measure<Hertz>, SettingsError> {
        self.validate()?;
        Ok(Measure::new(self.sample_rate.value()))
    }

    /// Resolve a shape file path against [`Settings::shape_directory`].
    pub fn resolve_shape_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.shape_directory {
            Some(directory) if path.is_relative() => directory.join(path),
            _ => path.to_path_buf(),
        }
    }
}
