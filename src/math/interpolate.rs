use ndarray::{Array1, Array2, ArrayView1};
use num_traits::Float;
use rayon::prelude::*;
use thiserror::Error;

/// Index of the axis value closest to `value`.
///
/// The axis must be ascending. Ties resolve to the lower index; points outside
/// the axis snap to the nearest end.
pub fn nearest_index<T: Float>(axis: ArrayView1<T>, value: T) -> Option<usize> {
    if axis.is_empty() || !value.is_finite() {
        return None;
    }

    // First index whose coordinate is >= value
    let upper = axis
        .as_slice()
        .map(|s| s.partition_point(|&v| v < value))
        .unwrap_or_else(|| axis.iter().take_while(|&&v| v < value).count());

    if upper == 0 {
        return Some(0);
    }
    if upper == axis.len() {
        return Some(axis.len() - 1);
    }

    let below = value - axis[upper - 1];
    let above = axis[upper] - value;
    if above < below {
        Some(upper)
    } else {
        Some(upper - 1)
    }
}

/// Error building a nearest-neighbour interpolator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("grid shape {grid:?} does not match axis lengths {axes:?}")]
pub struct GridShapeError {
    pub grid: (usize, usize),
    pub axes: (usize, usize),
}

/// Nearest-neighbour sampling of a latitude/longitude grid.
///
/// Points outside the span of either axis are not sampled.
#[derive(Debug, Clone)]
pub struct NearestGridInterpolator {
    latitude: Array1<f64>,
    longitude: Array1<f64>,
    values: Array2<f64>,
}

impl NearestGridInterpolator {
    /// `values` must have one row per latitude and one column per longitude
    pub fn new(
        latitude: Array1<f64>,
        longitude: Array1<f64>,
        values: Array2<f64>,
    ) -> Result<Self, GridShapeError> {
        if values.dim() != (latitude.len(), longitude.len()) {
            return Err(GridShapeError {
                grid: values.dim(),
                axes: (latitude.len(), longitude.len()),
            });
        }
        Ok(Self {
            latitude,
            longitude,
            values,
        })
    }

    /// Whether a point lies within the latitude and longitude bounds of the grid
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        within(&self.latitude, lat) && within(&self.longitude, lon)
    }

    /// Grid indices of the cell nearest to a point inside the grid bounds
    pub fn nearest_cell(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        if !self.contains(lat, lon) {
            return None;
        }
        let j = nearest_index(self.latitude.view(), lat)?;
        let i = nearest_index(self.longitude.view(), lon)?;
        Some((j, i))
    }

    /// Value of the cell nearest to a point
    pub fn sample(&self, lat: f64, lon: f64) -> Option<f64> {
        self.nearest_cell(lat, lon).map(|(j, i)| self.values[[j, i]])
    }

    /// Sample a list of (lat, lon) points in parallel; points off the grid yield `None`
    pub fn sample_many(&self, points: &[(f64, f64)]) -> Vec<Option<f64>> {
        points
            .par_iter()
            .map(|&(lat, lon)| self.sample(lat, lon))
            .collect()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

fn within(axis: &Array1<f64>, value: f64) -> bool {
    match (axis.first(), axis.last()) {
        (Some(&lo), Some(&hi)) => value >= lo && value <= hi,
        _ => false,
    }
}
