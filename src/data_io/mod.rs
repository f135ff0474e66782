pub mod city_reader;
pub mod common;
pub mod metadata;
pub mod reader;

pub use city_reader::*;
pub use metadata::*;
pub use reader::*;

use crate::config::DatasetConfig;
use ndarray::{Array1, Array2, Array3, Axis};
use tracing::debug;

/// Raw grids of the emissions dataset, before any derived quantity is computed
#[derive(Debug, Clone)]
pub struct RawEmissionsData {
    /// Latitude coordinates (degrees)
    pub latitude: Array1<f64>,
    /// Longitude coordinates (degrees)
    pub longitude: Array1<f64>,
    /// Fossil-fuel flux with layout [time, lat, lon]
    pub flux: Array3<f64>,
    /// Cell surface area with layout [lat, lon]
    pub area: Array2<f64>,
}

/// Direction of a coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisOrder {
    Ascending,
    Descending,
}

fn axis_order(name: &str, values: &Array1<f64>) -> Result<AxisOrder, DataFormatError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DataFormatError::UnsortedAxis(format!(
            "{} contains non-finite values",
            name
        )));
    }

    let ascending = values.windows(2).into_iter().all(|w| w[0] < w[1]);
    if ascending {
        return Ok(AxisOrder::Ascending);
    }

    let descending = values.windows(2).into_iter().all(|w| w[0] > w[1]);
    if descending {
        return Ok(AxisOrder::Descending);
    }

    Err(DataFormatError::UnsortedAxis(format!(
        "{} is not strictly monotonic",
        name
    )))
}

impl RawEmissionsData {
    /// Check that all grids agree with each other and with the configured time span,
    /// then flip descending axes so both coordinate axes are ascending.
    pub fn validated(mut self, config: &DatasetConfig) -> Result<Self, DataFormatError> {
        let (nt, nj, ni) = self.flux.dim();
        let (area_j, area_i) = self.area.dim();
        let (nlat, nlon) = (self.latitude.len(), self.longitude.len());

        if (nj, ni) != (area_j, area_i) {
            return Err(DataFormatError::DimensionMismatch(format!(
                "{} spatial shape ({}, {}) does not match {} shape ({}, {})",
                config.flux_variable, nj, ni, config.area_variable, area_j, area_i
            )));
        }

        if (area_j, area_i) != (nlat, nlon) {
            return Err(DataFormatError::DimensionMismatch(format!(
                "{} shape ({}, {}) does not match {}/{} lengths ({}, {})",
                config.area_variable,
                area_j,
                area_i,
                config.latitude_variable,
                config.longitude_variable,
                nlat,
                nlon
            )));
        }

        if nt != config.expected_months() {
            return Err(DataFormatError::DimensionMismatch(format!(
                "{} has {} time steps, expected {} for {}",
                config.flux_variable,
                nt,
                config.expected_months(),
                config.span
            )));
        }

        if nlat == 0 || nlon == 0 {
            return Err(DataFormatError::DimensionMismatch(
                "latitude and longitude axes must not be empty".to_string(),
            ));
        }

        if axis_order(&config.latitude_variable, &self.latitude)? == AxisOrder::Descending {
            debug!("Reversing descending {} axis", config.latitude_variable);
            self.latitude.invert_axis(Axis(0));
            self.flux.invert_axis(Axis(1));
            self.area.invert_axis(Axis(0));
        }

        if axis_order(&config.longitude_variable, &self.longitude)? == AxisOrder::Descending {
            debug!("Reversing descending {} axis", config.longitude_variable);
            self.longitude.invert_axis(Axis(0));
            self.flux.invert_axis(Axis(2));
            self.area.invert_axis(Axis(1));
        }

        Ok(Self {
            latitude: self.latitude.as_standard_layout().into_owned(),
            longitude: self.longitude.as_standard_layout().into_owned(),
            flux: self.flux.as_standard_layout().into_owned(),
            area: self.area.as_standard_layout().into_owned(),
        })
    }

    /// Grid dimensions as (time, lat, lon)
    pub fn dims(&self) -> (usize, usize, usize) {
        self.flux.dim()
    }
}
