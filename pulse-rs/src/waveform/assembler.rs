//! Rasterizes a timeline into per-output samples.
//!
//! Every output advances in lock-step: each command produces a [`Segment`] holding one track
//! per declared output, all of the same length, and segments are appended in timeline order.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use itertools::Itertools;

use super::shape::{resample, ShapeLoader};
use super::{Waveform, WaveformError};
use crate::ast::{
    Command, Component, Group, Item, Node, RepeatCount, Value, ValuePath, VariableKind,
};
use crate::environment::ACQ_MARKER;
use crate::settings::Settings;
use crate::units::{Hertz, Measure, Quantity, Second, Unit, Volt};

/// The shape name which needs no file: a constant amplitude.
pub(crate) const SQUARE: &str = "square";

/// The voltage which maps to a sample of 1.0.
const FULL_SCALE_VOLTS: f64 = 1.0;

/// The most samples a single track can hold.
const MAX_SAMPLES: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// `len` copies of `value`, or [`WaveformError::TooManySamples`] if they cannot be allocated.
fn filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, WaveformError> {
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|_| WaveformError::TooManySamples)?;
    items.resize(len, value);
    Ok(items)
}

/// `items` back to back, `count` times.
fn repeated<T: Copy>(items: &[T], count: usize) -> Result<Vec<T>, WaveformError> {
    let len = checked_len(items.len().checked_mul(count))?;
    let mut repeated = Vec::new();
    repeated
        .try_reserve_exact(len)
        .map_err(|_| WaveformError::TooManySamples)?;
    if !items.is_empty() {
        for _ in 0..count {
            repeated.extend_from_slice(items);
        }
    }
    Ok(repeated)
}

fn checked_len(len: Option<usize>) -> Result<usize, WaveformError> {
    len.filter(|len| *len <= MAX_SAMPLES)
        .ok_or(WaveformError::TooManySamples)
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Track {
    wave: Vec<f64>,
    marker1: Vec<bool>,
}

impl Track {
    fn silence(len: usize) -> Result<Self, WaveformError> {
        Ok(Self {
            wave: filled(len, 0.0)?,
            marker1: filled(len, false)?,
        })
    }

    fn from_wave(wave: Vec<f64>) -> Result<Self, WaveformError> {
        let marker1 = filled(wave.len(), false)?;
        Ok(Self { wave, marker1 })
    }

    fn len(&self) -> usize {
        self.wave.len()
    }

    fn append(&mut self, other: Track) -> Result<(), WaveformError> {
        checked_len(self.len().checked_add(other.len()))?;
        self.wave
            .try_reserve(other.len())
            .and_then(|()| self.marker1.try_reserve(other.len()))
            .map_err(|_| WaveformError::TooManySamples)?;
        self.wave.extend(other.wave);
        self.marker1.extend(other.marker1);
        Ok(())
    }

    fn pad_to(&mut self, len: usize) -> Result<(), WaveformError> {
        let extra = len.saturating_sub(self.len());
        self.wave
            .try_reserve(extra)
            .and_then(|()| self.marker1.try_reserve(extra))
            .map_err(|_| WaveformError::TooManySamples)?;
        self.wave.resize(len, 0.0);
        self.marker1.resize(len, false);
        Ok(())
    }
}

/// A stretch of time across all outputs.
#[derive(Clone, Debug, PartialEq)]
struct Segment {
    tracks: Vec<Track>,
    len: usize,
}

impl Segment {
    fn silence(outputs: usize, len: usize) -> Result<Self, WaveformError> {
        Ok(Self {
            tracks: (0..outputs)
                .map(|_| Track::silence(len))
                .collect::<Result<_, _>>()?,
            len,
        })
    }

    fn append(&mut self, other: Segment) -> Result<(), WaveformError> {
        let len = checked_len(self.len.checked_add(other.len))?;
        for (track, more) in self.tracks.iter_mut().zip_eq(other.tracks) {
            track.append(more)?;
        }
        self.len = len;
        Ok(())
    }

    fn repeat(&self, count: usize) -> Result<Self, WaveformError> {
        let len = checked_len(self.len.checked_mul(count))?;
        let tracks = self
            .tracks
            .iter()
            .map(|track| {
                Ok(Track {
                    wave: repeated(&track.wave, count)?,
                    marker1: repeated(&track.marker1, count)?,
                })
            })
            .collect::<Result<_, WaveformError>>()?;
        Ok(Self { tracks, len })
    }
}

pub(crate) struct Assembler<'env> {
    variables: &'env IndexMap<String, VariableKind>,
    values: &'env BTreeMap<ValuePath, Value>,
    outputs: Vec<&'env str>,
    sample_rate: Measure<Hertz>,
    shapes: ShapeLoader,
}

impl<'env> Assembler<'env> {
    pub(crate) fn new(
        settings: &Settings,
        variables: &'env IndexMap<String, VariableKind>,
        values: &'env BTreeMap<ValuePath, Value>,
    ) -> Result<Self, WaveformError> {
        let outputs = variables
            .iter()
            .filter(|(_, kind)| **kind == VariableKind::Output)
            .map(|(name, _)| name.as_str())
            .collect();
        Ok(Self {
            variables,
            values,
            outputs,
            sample_rate: settings.sample_rate()?,
            shapes: ShapeLoader::new(settings),
        })
    }

    /// Render the whole timeline, returning one waveform per output in declaration order.
    pub(crate) fn assemble(
        mut self,
        nodes: &[Node],
    ) -> Result<IndexMap<String, Waveform>, WaveformError> {
        let segment = self.render_nodes(nodes)?;
        Ok(self
            .outputs
            .iter()
            .zip_eq(segment.tracks)
            .map(|(name, track)| ((*name).to_owned(), Waveform::new(track.wave, track.marker1)))
            .collect())
    }

    fn render_nodes(&mut self, nodes: &[Node]) -> Result<Segment, WaveformError> {
        let mut segment = Segment::silence(self.outputs.len(), 0)?;
        for node in nodes {
            if let Node::Command(command) = node {
                segment.append(self.render_command(command)?)?;
            }
        }
        Ok(segment)
    }

    fn render_command(&mut self, command: &Command) -> Result<Segment, WaveformError> {
        match command {
            Command::Acquire => self.render_acquire(),
            Command::BareDelay(quantity) => {
                let len = self.samples(duration(*quantity)?)?;
                Segment::silence(self.outputs.len(), len)
            }
            Command::Statement(statement) => {
                let mut segment = Segment::silence(self.outputs.len(), 0)?;
                for component in &statement.components {
                    let next = match component {
                        Component::Name(name) => self.render_on_default_output(name)?,
                        Component::Delay(quantity) => {
                            let len = self.samples(duration(*quantity)?)?;
                            Segment::silence(self.outputs.len(), len)?
                        }
                        Component::Parallel(groups) => self.render_parallel(groups)?,
                    };
                    segment.append(next)?;
                }
                Ok(segment)
            }
            Command::Repeat(repeat) => {
                let count = self.repeat_count(&repeat.count)?;
                let body = self.render_nodes(&repeat.body)?;
                body.repeat(count)
            }
        }
    }

    /// Delays are silent everywhere; pulses play on the first declared output.
    fn render_on_default_output(&mut self, name: &str) -> Result<Segment, WaveformError> {
        let is_pulse = self.variables.get(name) == Some(&VariableKind::Pulse);
        if is_pulse && self.outputs.is_empty() {
            return Err(WaveformError::NoOutput {
                name: name.to_owned(),
            });
        }
        let track = self.render_name(name)?;
        let mut segment = Segment::silence(self.outputs.len(), track.len())?;
        if let (true, Some(first)) = (is_pulse, segment.tracks.first_mut()) {
            *first = track;
        }
        Ok(segment)
    }

    fn render_parallel(&mut self, groups: &[Group]) -> Result<Segment, WaveformError> {
        let mut claimed = BTreeSet::new();
        let mut rendered = Vec::with_capacity(groups.len());
        for group in groups {
            let mut track = Track::default();
            for item in &group.items {
                let next = match item {
                    Item::Name(name) => self.render_name(name)?,
                    Item::Delay(quantity) => {
                        Track::silence(self.samples(duration(*quantity)?)?)?
                    }
                };
                track.append(next)?;
            }
            let mut targets = Vec::with_capacity(group.outputs.len());
            for output in &group.outputs {
                let index = self.output_index(output)?;
                if !claimed.insert(index) {
                    return Err(WaveformError::ConflictingTargets {
                        name: output.clone(),
                    });
                }
                targets.push(index);
            }
            rendered.push((targets, track));
        }

        let len = rendered
            .iter()
            .map(|(_, track)| track.len())
            .max()
            .unwrap_or(0);
        let mut segment = Segment::silence(self.outputs.len(), len)?;
        for (targets, mut track) in rendered {
            track.pad_to(len)?;
            for index in targets {
                segment.tracks[index] = track.clone();
            }
        }
        Ok(segment)
    }

    fn render_acquire(&mut self) -> Result<Segment, WaveformError> {
        let num_path = ValuePath::attribute(ACQ_MARKER, "num");
        let num = self.integer(&num_path)?;
        let len = usize::try_from(num).map_err(|_| WaveformError::InvalidValue {
            path: num_path,
            expected: "a non-negative integer",
            found: num.to_string(),
        })?;

        let output_path = ValuePath::attribute(ACQ_MARKER, "output");
        let output = self.string(&output_path)?;
        let index = self.output_index(output)?;

        let mut segment = Segment::silence(self.outputs.len(), len)?;
        segment.tracks[index].marker1.fill(true);
        Ok(segment)
    }

    /// The samples of a declared delay or pulse, on its own.
    fn render_name(&mut self, name: &str) -> Result<Track, WaveformError> {
        match self.variables.get(name) {
            Some(VariableKind::Delay) => {
                let duration = self.measure::<Second>(&ValuePath::new(name), "a time quantity")?;
                Track::silence(self.samples(duration)?)
            }
            Some(VariableKind::Pulse) => self.render_pulse(name),
            _ => Err(WaveformError::UnknownName {
                name: name.to_owned(),
            }),
        }
    }

    fn render_pulse(&mut self, name: &str) -> Result<Track, WaveformError> {
        let length =
            self.measure::<Second>(&ValuePath::attribute(name, "length"), "a time quantity")?;
        let amplitude =
            self.measure::<Volt>(&ValuePath::attribute(name, "amplitude"), "a voltage")?;
        let shape = self.string(&ValuePath::attribute(name, "shape"))?;

        let len = self.samples(length)?;
        let scale = amplitude.value() / FULL_SCALE_VOLTS;
        let wave = if shape == SQUARE {
            filled(len, scale)?
        } else {
            (resample(self.shapes.load(shape)?, len) * scale).to_vec()
        };

        if let Some(value) = wave.iter().find(|sample| sample.is_nan() || sample.abs() > 1.0) {
            return Err(WaveformError::OutOfRange {
                name: name.to_owned(),
                value: *value,
            });
        }
        Track::from_wave(wave)
    }

    fn repeat_count(&self, count: &RepeatCount) -> Result<usize, WaveformError> {
        let count = match count {
            RepeatCount::Literal(count) => *count,
            RepeatCount::Variable(name) => {
                if self.variables.get(name) != Some(&VariableKind::Int) {
                    return Err(WaveformError::RepeatNotInt { name: name.clone() });
                }
                self.integer(&ValuePath::new(name.as_str()))?
            }
        };
        usize::try_from(count).map_err(|_| WaveformError::NegativeRepeat { count })
    }

    fn output_index(&self, name: &str) -> Result<usize, WaveformError> {
        self.outputs
            .iter()
            .position(|output| *output == name)
            .ok_or_else(|| WaveformError::UnknownOutput {
                name: name.to_owned(),
            })
    }

    /// `round(duration · sample rate)`
    fn samples(&self, duration: Measure<Second>) -> Result<usize, WaveformError> {
        let count = (duration * self.sample_rate).round();
        if duration.value() >= 0.0 && count.is_finite() && count <= MAX_SAMPLES as f64 {
            Ok(count as usize)
        } else {
            Err(WaveformError::InvalidDuration {
                duration: duration.into(),
            })
        }
    }

    fn value(&self, path: &ValuePath) -> Result<&'env Value, WaveformError> {
        self.values
            .get(path)
            .ok_or_else(|| WaveformError::MissingValue { path: path.clone() })
    }

    fn invalid(path: &ValuePath, expected: &'static str, found: &Value) -> WaveformError {
        WaveformError::InvalidValue {
            path: path.clone(),
            expected,
            found: found.describe(),
        }
    }

    fn measure<U: Unit>(
        &self,
        path: &ValuePath,
        expected: &'static str,
    ) -> Result<Measure<U>, WaveformError> {
        let value = self.value(path)?;
        value
            .as_quantity()
            .and_then(|quantity| Measure::try_from(quantity).ok())
            .ok_or_else(|| Self::invalid(path, expected, value))
    }

    fn integer(&self, path: &ValuePath) -> Result<i64, WaveformError> {
        let value = self.value(path)?;
        value
            .as_integer()
            .ok_or_else(|| Self::invalid(path, "an integer", value))
    }

    fn string(&self, path: &ValuePath) -> Result<&'env str, WaveformError> {
        let value = self.value(path)?;
        value
            .as_str()
            .ok_or_else(|| Self::invalid(path, "a string", value))
    }
}

fn duration(quantity: Quantity) -> Result<Measure<Second>, WaveformError> {
    Measure::try_from(quantity).map_err(|_| WaveformError::NotATime { quantity })
}
