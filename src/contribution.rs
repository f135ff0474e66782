//! Share of global emissions attributable to a city inventory.
//!
//! The yearly gridded total is converted to megatonnes, sampled at each
//! city's nearest grid cell and compared against the inventory totals.

use crate::config::Constants;
use crate::data_io::city_reader::{read_city_inventory, total_city_emissions, CityRecord};
use crate::math::interpolate::{GridShapeError, NearestGridInterpolator};
use crate::math::units::grams_to_megatonnes;
use crate::store::GriddedEmissionsStore;
use crate::time_utils::RangeError;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ContributionError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Range(#[from] RangeError),

    #[error("Grid shape error: {0}")]
    GridShape(#[from] GridShapeError),

    #[error("Global emissions for {0} sum to zero")]
    EmptyGrid(i32),

    #[error("City {name} at ({latitude}, {longitude}) lies outside the emissions grid")]
    CityOutsideGrid {
        name: String,
        latitude: f64,
        longitude: f64,
    },
}

/// Outcome of comparing a city inventory with the gridded dataset for one year
#[derive(Debug, Clone, PartialEq)]
pub struct ContributionReport {
    pub year: i32,
    pub city_count: usize,
    /// Sum of the inventory totals (MtCO2e)
    pub total_city_emissions: f64,
    /// Sum of the gridded totals at each city's nearest cell (Mt)
    pub gridded_city_emissions: f64,
    /// Sum of the whole gridded field (Mt)
    pub global_emissions: f64,
    /// Inventory total minus gridded total at the cities (Mt)
    pub city_contribution: f64,
    pub percent_contribution: f64,
}

/// Compare `cities` against the gridded emissions of `year`.
///
/// Every city must lie within the bounds of the grid; the first one that does
/// not (including non-finite coordinates) fails the whole comparison.
pub fn city_contribution(
    store: &GriddedEmissionsStore,
    cities: &[CityRecord],
    year: i32,
    constants: &Constants,
) -> Result<ContributionReport, ContributionError> {
    let global = grams_to_megatonnes(&store.total_emissions_grid(year)?, constants);
    let global_emissions = global.sum();
    if global_emissions == 0.0 {
        return Err(ContributionError::EmptyGrid(year));
    }

    let interpolator =
        NearestGridInterpolator::new(store.latitude().clone(), store.longitude().clone(), global)?;

    let mut gridded_city_emissions = 0.0;
    for city in cities {
        let name = city.name.as_deref().unwrap_or("<unnamed>");
        let value = interpolator
            .sample(city.latitude, city.longitude)
            .ok_or_else(|| ContributionError::CityOutsideGrid {
                name: name.to_string(),
                latitude: city.latitude,
                longitude: city.longitude,
            })?;
        if value == 0.0 {
            warn!(
                "City {} at ({}, {}) falls on a cell with no gridded emissions",
                name, city.latitude, city.longitude
            );
        }
        gridded_city_emissions += value;
    }

    let total_city_emissions = total_city_emissions(cities);
    let city_contribution = total_city_emissions - gridded_city_emissions;
    let percent_contribution = city_contribution / global_emissions * 100.0;

    info!(
        "{} cities account for {:.3}% of global emissions in {}",
        cities.len(),
        percent_contribution,
        year
    );

    Ok(ContributionReport {
        year,
        city_count: cities.len(),
        total_city_emissions,
        gridded_city_emissions,
        global_emissions,
        city_contribution,
        percent_contribution,
    })
}

/// Read a city inventory CSV and compare it against the gridded emissions of `year`
pub fn city_contribution_from_inventory(
    store: &GriddedEmissionsStore,
    inventory: impl AsRef<Path>,
    year: i32,
    constants: &Constants,
) -> Result<ContributionReport, ContributionError> {
    let cities = read_city_inventory(inventory)?;
    city_contribution(store, &cities, year, constants)
}
