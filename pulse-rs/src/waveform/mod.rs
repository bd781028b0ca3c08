//! Rendered output waveforms and the assembler which produces them.

use std::path::PathBuf;

use serde::Serialize;

use crate::ast::ValuePath;
use crate::settings::SettingsError;
use crate::units::Quantity;

pub(crate) mod assembler;
pub(crate) mod shape;

/// The samples and markers of one output, ready for an arbitrary waveform generator.
///
/// `wave` holds amplitudes in `[-1.0, 1.0]` (full scale is 1 V). All three sequences have the
/// same length.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Waveform {
    wave: Vec<f64>,
    marker1: Vec<bool>,
    marker2: Vec<bool>,
}

impl Waveform {
    pub(crate) fn new(wave: Vec<f64>, marker1: Vec<bool>) -> Self {
        let marker2 = vec![false; wave.len()];
        Self {
            wave,
            marker1,
            marker2,
        }
    }

    pub fn wave(&self) -> &[f64] {
        &self.wave
    }

    /// Returns marker channel 1 or 2, or `None` for any other channel.
    pub fn get_marker(&self, channel: usize) -> Option<&[bool]> {
        match channel {
            1 => Some(&self.marker1),
            2 => Some(&self.marker2),
            _ => None,
        }
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.wave.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wave.is_empty()
    }
}

/// Rendering could not proceed.
#[derive(Debug, thiserror::Error)]
pub enum WaveformError {
    #[error("no value bound to {path}")]
    MissingValue { path: ValuePath },

    #[error("{path} must be {expected}, found {found}")]
    InvalidValue {
        path: ValuePath,
        expected: &'static str,
        found: String,
    },

    #[error("not a declared delay or pulse: {name}")]
    UnknownName { name: String },

    #[error("not a declared output: {name}")]
    UnknownOutput { name: String },

    #[error("pulse {name} has no output to play on")]
    NoOutput { name: String },

    #[error("delay must be a time quantity: {quantity}")]
    NotATime { quantity: Quantity },

    #[error("duration {duration} is negative, not finite or too long to sample")]
    InvalidDuration { duration: Quantity },

    #[error("waveform would need more samples than can be allocated")]
    TooManySamples,

    #[error("repeated variable must be an int: {name}")]
    RepeatNotInt { name: String },

    #[error("repetition count must be non-negative: {count}")]
    NegativeRepeat { count: i64 },

    #[error("failed to read shape file {}", .path.display())]
    ShapeFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed shape file {}: {reason}", .path.display())]
    MalformedShape { path: PathBuf, reason: String },

    #[error("sample {value} of pulse {name} is outside [-1, 1]")]
    OutOfRange { name: String, value: f64 },

    #[error("output {name} would need more than one simultaneous duration")]
    ConflictingTargets { name: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[cfg(test)]
mod tests {
    use super::Waveform;

    #[test]
    fn markers() {
        let waveform = Waveform::new(vec![0.0, 0.5, 0.0], vec![false, true, false]);
        assert_eq!(waveform.len(), 3);
        assert_eq!(waveform.get_marker(1), Some(&[false, true, false][..]));
        assert_eq!(waveform.get_marker(2), Some(&[false; 3][..]));
        assert_eq!(waveform.get_marker(3), None);
    }

    #[test]
    fn serializes_all_channels() {
        let waveform = Waveform::new(vec![1.0], vec![true]);
        assert_eq!(
            serde_json::to_string(&waveform).unwrap(),
            r#"{"wave":[1.0],"marker1":[true],"marker2":[false]}"#
        );
    }
}
