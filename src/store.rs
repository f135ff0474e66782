//! In-memory store of derived monthly emission totals.
//!
//! The store reads the flux and area grids once, multiplies them by the
//! length of each calendar month in seconds and keeps the result as a dense
//! `[month, lat, lon]` array. Queries translate calendar months and
//! coordinates into array offsets and return owned copies, so a store can be
//! shared between threads without locking.

use crate::config::DatasetConfig;
use crate::data_io::{read_emissions_file, DataFormatError, RawEmissionsData};
use crate::math::interpolate::nearest_index;
use crate::time_utils::{parse_year, CalendarMonth, MonthSpan, RangeError};
use ndarray::{s, Array1, Array2, Array3, Axis, Zip};
use std::path::Path;
use tracing::{debug, info};

/// Relative tolerance when matching a coordinate against an axis value
const COORDINATE_TOLERANCE: f64 = 1.0e-6;

/// One entry of the emissions table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionsRecord {
    pub month: CalendarMonth,
    pub latitude: f64,
    pub longitude: f64,
    /// Emitted mass during the month: flux × area × seconds in month.
    /// NaN when the flux or area of the cell is a fill value.
    pub total_per_month: f64,
    /// Raw flux value for the cell and month, NaN where masked
    pub fossil_fuel: f64,
}

/// Records for a closed range of months over every grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub months: MonthSpan,
    pub latitude: Array1<f64>,
    pub longitude: Array1<f64>,
    /// Layout [month, lat, lon]
    pub total_per_month: Array3<f64>,
    /// Layout [month, lat, lon]
    pub fossil_fuel: Array3<f64>,
}

impl MonthlyTotals {
    /// Number of records: months × latitudes × longitudes
    pub fn len(&self) -> usize {
        self.total_per_month.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_per_month.is_empty()
    }

    /// Records ordered by month, then latitude, then longitude
    pub fn records(&self) -> impl Iterator<Item = EmissionsRecord> + '_ {
        self.total_per_month
            .indexed_iter()
            .map(move |(index, _)| self.record_at(index))
    }

    /// Record for an exact (month, latitude, longitude) key
    pub fn get(&self, month: CalendarMonth, latitude: f64, longitude: f64) -> Option<EmissionsRecord> {
        let t = self.months.index_of(&month)?;
        let j = axis_position(&self.latitude, latitude)?;
        let i = axis_position(&self.longitude, longitude)?;
        Some(self.record_at((t, j, i)))
    }

    /// Per-cell sum of `total_per_month` over all months in the slice.
    ///
    /// Masked (NaN) months are skipped; a cell masked in every month sums to 0.
    pub fn sum_over_months(&self) -> Array2<f64> {
        self.total_per_month
            .fold_axis(Axis(0), 0.0, |&acc, &v| if v.is_nan() { acc } else { acc + v })
    }

    fn record_at(&self, index: (usize, usize, usize)) -> EmissionsRecord {
        build_record(
            self.months,
            &self.latitude,
            &self.longitude,
            &self.total_per_month,
            &self.fossil_fuel,
            index,
        )
    }
}

/// Record at array offsets `(t, j, i)` of a table starting at `months.first()`
fn build_record(
    months: MonthSpan,
    latitude: &Array1<f64>,
    longitude: &Array1<f64>,
    total_per_month: &Array3<f64>,
    fossil_fuel: &Array3<f64>,
    (t, j, i): (usize, usize, usize),
) -> EmissionsRecord {
    EmissionsRecord {
        month: months.first().plus_months(t),
        latitude: latitude[j],
        longitude: longitude[i],
        total_per_month: total_per_month[[t, j, i]],
        fossil_fuel: fossil_fuel[[t, j, i]],
    }
}

/// Position of `value` on an ascending axis, if it matches an axis coordinate
fn axis_position(axis: &Array1<f64>, value: f64) -> Option<usize> {
    let index = nearest_index(axis.view(), value)?;
    let tolerance = COORDINATE_TOLERANCE * value.abs().max(1.0);
    ((axis[index] - value).abs() <= tolerance).then_some(index)
}

/// Gridded monthly fossil-fuel emissions indexed by (month, latitude, longitude)
#[derive(Debug, Clone)]
pub struct GriddedEmissionsStore {
    span: MonthSpan,
    latitude: Array1<f64>,
    longitude: Array1<f64>,
    area: Array2<f64>,
    fossil_fuel: Array3<f64>,
    total_per_month: Array3<f64>,
}

impl GriddedEmissionsStore {
    /// Open a CMIP5 Andres emissions file (`FF`, `AREA`, `Latitude`, `Longitude`,
    /// 1751-01 through 2007-12) and build the monthly totals table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataFormatError> {
        Self::open_with_config(path, &DatasetConfig::default())
    }

    /// Open an emissions file with custom variable names or time span
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: &DatasetConfig,
    ) -> Result<Self, DataFormatError> {
        let raw = read_emissions_file(path, config)?;
        Ok(Self::from_validated(raw, config.span))
    }

    /// Build a store from in-memory grids, validated exactly as a file would be.
    ///
    /// `flux` has layout [time, lat, lon] and `area` [lat, lon].
    pub fn from_arrays(
        latitude: Array1<f64>,
        longitude: Array1<f64>,
        flux: Array3<f64>,
        area: Array2<f64>,
        config: &DatasetConfig,
    ) -> Result<Self, DataFormatError> {
        let raw = RawEmissionsData {
            latitude,
            longitude,
            flux,
            area,
        }
        .validated(config)?;
        Ok(Self::from_validated(raw, config.span))
    }

    fn from_validated(raw: RawEmissionsData, span: MonthSpan) -> Self {
        let seconds: Array1<f64> = span.iter().map(|m| m.seconds() as f64).collect();
        let mut total_per_month = Array3::<f64>::zeros(raw.flux.raw_dim());

        Zip::indexed(&mut total_per_month)
            .and(&raw.flux)
            .par_for_each(|(t, j, i), total, &flux| {
                *total = flux * raw.area[[j, i]] * seconds[t];
            });

        let (nt, nj, ni) = total_per_month.dim();
        info!(
            "Built emissions table: {} months x {} latitudes x {} longitudes over {}",
            nt, nj, ni, span
        );

        Self {
            span,
            latitude: raw.latitude,
            longitude: raw.longitude,
            area: raw.area,
            fossil_fuel: raw.flux,
            total_per_month,
        }
    }

    /// Ascending latitude axis (degrees), one entry per grid row
    pub fn latitude(&self) -> &Array1<f64> {
        &self.latitude
    }

    /// Ascending longitude axis (degrees), one entry per grid column
    pub fn longitude(&self) -> &Array1<f64> {
        &self.longitude
    }

    /// Months covered by the store
    pub fn months(&self) -> MonthSpan {
        self.span
    }

    /// Cell surface areas with layout [lat, lon]
    pub fn area(&self) -> &Array2<f64> {
        &self.area
    }

    /// (months, latitudes, longitudes)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.total_per_month.dim()
    }

    /// Number of table entries
    pub fn len(&self) -> usize {
        self.total_per_month.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_per_month.is_empty()
    }

    /// Length of a month of the dataset in seconds
    pub fn seconds_in_month(&self, month: CalendarMonth) -> Result<u32, RangeError> {
        self.span.check_range(month, month)?;
        Ok(month.seconds())
    }

    /// Single table entry, if the month is in the span and both coordinates are on the grid
    pub fn record(&self, month: CalendarMonth, latitude: f64, longitude: f64) -> Option<EmissionsRecord> {
        let t = self.span.index_of(&month)?;
        let j = axis_position(&self.latitude, latitude)?;
        let i = axis_position(&self.longitude, longitude)?;
        Some(build_record(
            self.span,
            &self.latitude,
            &self.longitude,
            &self.total_per_month,
            &self.fossil_fuel,
            (t, j, i),
        ))
    }

    /// Monthly totals for every grid cell.
    ///
    /// With `to_month` omitted this is the single month `from_month`; otherwise
    /// every month of the closed range `[from_month, to_month]`. Months are
    /// `YYYY-MM` tokens.
    pub fn monthly_totals(
        &self,
        from_month: &str,
        to_month: Option<&str>,
    ) -> Result<MonthlyTotals, RangeError> {
        let from: CalendarMonth = from_month.parse()?;
        let to = match to_month {
            Some(to) => to.parse()?,
            None => from,
        };
        self.monthly_totals_between(from, to)
    }

    /// Monthly totals for the closed range `[from, to]`
    pub fn monthly_totals_between(
        &self,
        from: CalendarMonth,
        to: CalendarMonth,
    ) -> Result<MonthlyTotals, RangeError> {
        let range = self.span.check_range(from, to)?;
        // check_range keeps both ends inside the span, so the offset is non-negative
        let start = range.first().offset_from(&self.span.first()) as usize;
        let end = start + range.len();
        debug!("Slicing monthly totals {} (offsets {}..{})", range, start, end);

        Ok(MonthlyTotals {
            months: range,
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            total_per_month: self.total_per_month.slice(s![start..end, .., ..]).to_owned(),
            fossil_fuel: self.fossil_fuel.slice(s![start..end, .., ..]).to_owned(),
        })
    }

    /// Total emissions of `year` per grid cell, rows = latitude, columns = longitude.
    ///
    /// Sums `total_per_month` over the months of the year that lie in the
    /// dataset span.
    pub fn total_emissions_grid(&self, year: i32) -> Result<Array2<f64>, RangeError> {
        let months = self.span.year_overlap(year)?;
        Ok(self
            .monthly_totals_between(months.first(), months.last())?
            .sum_over_months())
    }

    /// [`total_emissions_grid`](Self::total_emissions_grid) for a `YYYY` token
    pub fn total_emissions_grid_str(&self, year: &str) -> Result<Array2<f64>, RangeError> {
        self.total_emissions_grid(parse_year(year)?)
    }
}
