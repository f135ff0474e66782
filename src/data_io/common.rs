/// Common functionality shared by the dataset readers
use super::DataFormatError;
use ndarray::{Array, Dimension, IxDyn};
use std::path::Path;
use tracing::debug;

/// netCDF default fill for doubles, used when a variable declares no fill value
pub const DEFAULT_FILL_F64: f64 = 9.969_209_968_386_869e36;
/// netCDF default fill for floats
pub const DEFAULT_FILL_F32: f32 = 9.969_21e36;

/// Attributes whose values mark missing cells
const FILL_ATTRIBUTES: [&str; 2] = ["_FillValue", "missing_value"];

/// Open NetCDF file and validate it exists
pub fn open_netcdf_file(path: &Path) -> Result<netcdf::File, DataFormatError> {
    if !path.is_file() {
        return Err(DataFormatError::FileNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    Ok(netcdf::open(path)?)
}

/// Look up a variable, reporting its name when absent
pub fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> Result<netcdf::Variable<'f>, DataFormatError> {
    file.variable(name)
        .ok_or_else(|| DataFormatError::MissingVariable(name.to_string()))
}

/// Shape of a variable, one entry per dimension
pub fn variable_shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Read all values of a variable as f64.
///
/// Float variables are widened when the library refuses a direct f64 read.
pub fn read_values_f64(var: &netcdf::Variable) -> Result<Vec<f64>, DataFormatError> {
    match var.get_values::<f64, _>(..) {
        Ok(values) => Ok(values),
        Err(f64_err) => {
            debug!(
                "Reading {} as f64 failed ({}), retrying as f32",
                var.name(),
                f64_err
            );
            let values: Vec<f32> = var.get_values(..).map_err(|_| f64_err)?;
            Ok(values.into_iter().map(f64::from).collect())
        }
    }
}

fn numeric_attribute(var: &netcdf::Variable, name: &str) -> Option<f64> {
    use netcdf::AttributeValue as V;
    match var.attribute(name)?.value().ok()? {
        V::Double(v) => Some(v),
        V::Float(v) => Some(v as f64),
        V::Int(v) => Some(v as f64),
        V::Short(v) => Some(v as f64),
        V::Longlong(v) => Some(v as f64),
        V::Doubles(v) => v.first().copied(),
        V::Floats(v) => v.first().map(|&x| x as f64),
        _ => None,
    }
}

/// Values that stand for missing data in `var`: its declared
/// `_FillValue`/`missing_value` plus the netCDF default fills
pub fn fill_values(var: &netcdf::Variable) -> Vec<f64> {
    let mut fills: Vec<f64> = FILL_ATTRIBUTES
        .iter()
        .filter_map(|name| numeric_attribute(var, name))
        .collect();
    fills.push(DEFAULT_FILL_F64);
    fills.push(DEFAULT_FILL_F32 as f64);
    fills
}

/// Replace every fill value with NaN, returning how many cells were masked
pub fn mask_fill_values(values: &mut [f64], fills: &[f64]) -> usize {
    let mut masked = 0;
    for v in values.iter_mut() {
        if fills.contains(v) {
            *v = f64::NAN;
            masked += 1;
        }
    }
    masked
}

/// Read a variable of known rank into an ndarray of that rank.
///
/// Cells equal to a fill value come back as NaN.
pub fn read_array<D: Dimension>(
    file: &netcdf::File,
    name: &str,
) -> Result<Array<f64, D>, DataFormatError> {
    let var = require_variable(file, name)?;
    let shape = variable_shape(&var);

    if let Some(expected) = D::NDIM {
        if shape.len() != expected {
            return Err(DataFormatError::RankMismatch {
                variable: name.to_string(),
                expected,
                actual: shape.len(),
            });
        }
    }

    debug!("Reading variable {} with shape {:?}", name, shape);
    let mut values = read_values_f64(&var)?;
    let masked = mask_fill_values(&mut values, &fill_values(&var));
    if masked > 0 {
        debug!("Masked {} fill-value cells in {}", masked, name);
    }

    Array::from_shape_vec(IxDyn(&shape), values)
        .map_err(|e| DataFormatError::ConversionError(format!("{}: {}", name, e)))?
        .into_dimensionality::<D>()
        .map_err(|e| DataFormatError::ConversionError(format!("{}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_fill_values() {
        let mut values = vec![1.0, -9999.0, 2.5, DEFAULT_FILL_F64, DEFAULT_FILL_F32 as f64];
        let masked = mask_fill_values(&mut values, &[-9999.0, DEFAULT_FILL_F64, DEFAULT_FILL_F32 as f64]);
        assert_eq!(masked, 3);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[2], 2.5);
        assert!(values[1].is_nan() && values[3].is_nan() && values[4].is_nan());
    }

    #[test]
    fn test_open_nonexistent_file() {
        let result = open_netcdf_file(Path::new("/nonexistent/emissions.nc"));
        assert!(matches!(result, Err(DataFormatError::FileNotFound(_))));
    }

    #[test]
    fn test_open_directory_is_not_a_file() {
        let dir = std::env::temp_dir();
        let result = open_netcdf_file(&dir);
        assert!(matches!(result, Err(DataFormatError::FileNotFound(_))));
    }
}
