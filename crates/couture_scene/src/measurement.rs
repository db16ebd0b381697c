//! Body measurement paths shown as animated guide lines.

use std::collections::BTreeMap;

use couture_core::{Error, Result};
use couture_resources::CatmullRomCurve3;
use glam::Vec3;
use serde::Deserialize;

/// Measurements offered by the viewer, in button order.
pub const MEASUREMENT_NAMES: [&str; 6] = [
    "Chest Circumference",
    "Right Upper Arm Circumference",
    "Narrow Waist Circumference",
    "High Hip Circumference",
    "Left Thigh Circumference",
    "Left Ankle Circumference",
];

#[derive(Debug, Deserialize)]
struct RawTable {
    measurement: BTreeMap<String, RawMeasurement>,
}

#[derive(Debug, Deserialize)]
struct RawMeasurement {
    line_points: Vec<[f32; 3]>,
    #[serde(default)]
    closed: bool,
}

/// One labelled curve on the body. Immutable after construction.
#[derive(Debug, Clone)]
pub struct MeasurementPath {
    label: String,
    points: Vec<Vec3>,
    closed: bool,
}

impl MeasurementPath {
    #[must_use]
    pub fn new(label: &str, points: Vec<Vec3>, closed: bool) -> Self {
        Self {
            label: label.to_string(),
            points,
            closed,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Tube segment count: one per control point.
    #[must_use]
    pub fn segments(&self) -> u32 {
        u32::try_from(self.points.len()).unwrap_or(u32::MAX).max(1)
    }

    #[must_use]
    pub fn curve(&self) -> CatmullRomCurve3 {
        CatmullRomCurve3::new(self.points.clone(), self.closed)
    }
}

/// The static measurement table, indexed like [`MEASUREMENT_NAMES`].
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    paths: Vec<MeasurementPath>,
}

impl MeasurementTable {
    #[must_use]
    pub fn new(paths: Vec<MeasurementPath>) -> Self {
        Self { paths }
    }

    /// Parses `{"measurement": {"<name>": {"line_points": [[x,y,z], ...], "closed": bool}}}`.
    ///
    /// Every entry of [`MEASUREMENT_NAMES`] must be present and have at
    /// least two points; other entries are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut raw: RawTable =
            serde_json::from_str(json).map_err(|e| Error::Format(e.to_string()))?;

        let mut paths = Vec::with_capacity(MEASUREMENT_NAMES.len());
        for name in MEASUREMENT_NAMES {
            let entry = raw
                .measurement
                .remove(name)
                .ok_or_else(|| Error::InvalidData(format!("missing measurement '{name}'")))?;
            if entry.line_points.len() < 2 {
                return Err(Error::InvalidData(format!(
                    "measurement '{name}' needs at least two points"
                )));
            }
            let points = entry.line_points.into_iter().map(Vec3::from).collect();
            paths.push(MeasurementPath::new(name, points, entry.closed));
        }

        log::debug!("Loaded {} measurement paths", paths.len());
        Ok(Self { paths })
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MeasurementPath> {
        self.paths.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeasurementPath> {
        self.paths.iter()
    }
}
