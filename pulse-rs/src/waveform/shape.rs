use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use ndarray::Array1;

use super::WaveformError;
use crate::settings::Settings;

/// Reads pulse shape files, each at most once.
#[derive(Debug, Default)]
pub(crate) struct ShapeLoader {
    settings: Settings,
    curves: HashMap<PathBuf, Array1<f64>>,
}

impl ShapeLoader {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            curves: HashMap::new(),
        }
    }

    /// The curve stored in the file at `path`.
    pub(crate) fn load(&mut self, path: &str) -> Result<&Array1<f64>, WaveformError> {
        match self.curves.entry(self.settings.resolve_shape_path(path)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let curve = read_curve(entry.key())?;
                debug!(
                    "loaded {} points from shape file {}",
                    curve.len(),
                    entry.key().display()
                );
                Ok(entry.insert(curve))
            }
        }
    }
}

fn read_curve(path: &Path) -> Result<Array1<f64>, WaveformError> {
    let text = std::fs::read_to_string(path).map_err(|source| WaveformError::ShapeFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_curve(&text).map_err(|reason| WaveformError::MalformedShape {
        path: path.to_path_buf(),
        reason,
    })
}

/// Numbers separated by whitespace or commas; `#` starts a comment.
fn parse_curve(text: &str) -> Result<Array1<f64>, String> {
    let mut points = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        for word in content
            .split(|chr: char| chr == ',' || chr.is_whitespace())
            .filter(|word| !word.is_empty())
        {
            let point: f64 = word
                .parse()
                .map_err(|_| format!("line {}: {word:?} is not a number", index + 1))?;
            if !point.is_finite() {
                return Err(format!("line {}: {word:?} is not finite", index + 1));
            }
            points.push(point);
        }
    }
    if points.is_empty() {
        return Err("no points".to_owned());
    }
    Ok(Array1::from(points))
}

/// Stretch or squeeze `curve` to `count` points, interpolating linearly between neighbours.
///
/// The first and last points of the curve are kept at the ends.
pub(crate) fn resample(curve: &Array1<f64>, count: usize) -> Array1<f64> {
    let last = curve.len().saturating_sub(1);
    Array1::linspace(0.0, last as f64, count).mapv(|position| {
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let fraction = position - lower as f64;
        curve[lower] + (curve[upper] - curve[lower]) * fraction
    })
}
