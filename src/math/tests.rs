use super::interpolate::*;
use super::units::*;
use crate::config::Constants;
use ndarray::{array, Array2};

#[test]
fn test_grams_to_megatonnes() {
    let constants = Constants::default();
    let grid = array![[1.0e12, 2.5e12], [0.0, 4.0e15]];
    let result = grams_to_megatonnes(&grid, &constants);
    assert_eq!(result, array![[1.0, 2.5], [0.0, 4000.0]]);
    assert_eq!(grams_to_megatonnes_scalar(3.0e12, &constants), 3.0);
}

#[test]
fn test_molar_mass_conversion() {
    let constants = Constants::default();
    let grams = 12.01 * 5.1480e21 / 28.966;
    let result = flux_total_to_megatonnes_carbon_equivalent(&array![grams], &constants);
    // One mole of carbon per mole of atmosphere, times 1e-6
    assert!((result[0] - 1.0e-6).abs() < 1e-18);
}

#[test]
fn test_conversions_differ() {
    let constants = Constants::default();
    let grid = array![1.0e15];
    let mass = grams_to_megatonnes(&grid, &constants);
    let equivalent = flux_total_to_megatonnes_carbon_equivalent(&grid, &constants);
    assert!((mass[0] - equivalent[0]).abs() > 1.0);
}

#[test]
fn test_nearest_index() {
    let axis = array![-10.0, 0.0, 10.0, 20.0];
    assert_eq!(nearest_index(axis.view(), 1.0), Some(1));
    assert_eq!(nearest_index(axis.view(), 6.0), Some(2));
    // Tie goes to the lower index
    assert_eq!(nearest_index(axis.view(), 5.0), Some(1));
    assert_eq!(nearest_index(axis.view(), -50.0), Some(0));
    assert_eq!(nearest_index(axis.view(), 99.0), Some(3));
    assert_eq!(nearest_index(axis.view(), f64::NAN), None);

    let empty: ndarray::Array1<f64> = ndarray::Array1::from(Vec::new());
    assert_eq!(nearest_index(empty.view(), 0.0), None);
}

#[test]
fn test_nearest_grid_interpolator() {
    let latitude = array![-45.0, 45.0];
    let longitude = array![0.0, 90.0, 180.0];
    let values = Array2::from_shape_fn((2, 3), |(j, i)| (j * 3 + i) as f64);
    let interpolator = NearestGridInterpolator::new(latitude, longitude, values).unwrap();

    assert_eq!(interpolator.nearest_cell(40.0, 100.0), Some((1, 1)));
    assert_eq!(interpolator.sample(-30.0, 170.0), Some(2.0));
    assert_eq!(
        interpolator.sample_many(&[(40.0, 0.0), (f64::NAN, 0.0)]),
        vec![Some(3.0), None]
    );
}

#[test]
fn test_interpolator_rejects_points_off_the_grid() {
    let latitude = array![-45.0, 45.0];
    let longitude = array![0.0, 90.0, 180.0];
    let interpolator =
        NearestGridInterpolator::new(latitude, longitude, Array2::ones((2, 3))).unwrap();

    assert!(interpolator.contains(45.0, 180.0));
    assert!(!interpolator.contains(50.0, 0.0));
    // -170 on a 0..180 axis is not wrapped onto the grid
    assert_eq!(interpolator.sample(0.0, -170.0), None);
    assert_eq!(interpolator.nearest_cell(-46.0, 10.0), None);
    assert_eq!(interpolator.sample(-45.0, 0.0), Some(1.0));
}

#[test]
fn test_interpolator_rejects_wrong_shape() {
    let result = NearestGridInterpolator::new(array![0.0], array![0.0, 1.0], Array2::zeros((2, 2)));
    assert_eq!(
        result.unwrap_err(),
        GridShapeError {
            grid: (2, 2),
            axes: (1, 2)
        }
    );
}
