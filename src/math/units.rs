//! Unit conversions for gridded emission totals.
//!
//! Two conversions exist and they are not interchangeable:
//! [`grams_to_megatonnes`] rescales a mass, while
//! [`flux_total_to_megatonnes_carbon_equivalent`] turns a flux-integrated
//! carbon mass into its atmospheric-concentration equivalent. Report emission
//! totals with the first; use the second only for concentration budgets.

use crate::config::Constants;
use ndarray::{Array, Dimension};

/// Rescale a mass in grams to megatonnes
pub fn grams_to_megatonnes<D: Dimension>(grid: &Array<f64, D>, constants: &Constants) -> Array<f64, D> {
    grid / constants.grams_per_megatonne
}

/// Convert a flux-integrated carbon mass (g) into megatonnes of carbon-equivalent
/// concentration: `(grid / M_C) / (M_atm / M_air) * 1e-6`
pub fn flux_total_to_megatonnes_carbon_equivalent<D: Dimension>(
    grid: &Array<f64, D>,
    constants: &Constants,
) -> Array<f64, D> {
    let moles_of_air = constants.mean_mass_air / constants.molar_mass_air;
    grid.mapv(|g| (g / constants.molar_mass_c) / moles_of_air * 1.0e-6)
}

/// Scalar form of [`grams_to_megatonnes`]
pub fn grams_to_megatonnes_scalar(grams: f64, constants: &Constants) -> f64 {
    grams / constants.grams_per_megatonne
}
