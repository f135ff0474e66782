use super::common::{open_netcdf_file, variable_shape};
use super::DataFormatError;
use std::fmt;
use std::path::Path;

/// Metadata about a dimension in the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionInfo {
    pub name: String,
    pub size: usize,
    pub is_unlimited: bool,
}

/// Metadata about a variable in the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    /// Names of the variable's dimensions, outermost first
    pub dimensions: Vec<String>,
    pub shape: Vec<usize>,
    /// Total number of elements
    pub size: usize,
    /// Stored data type
    pub dtype: String,
    /// Units attribute if available
    pub units: Option<String>,
}

impl VariableInfo {
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

/// Dimensions and variables of a NetCDF file
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub dimensions: Vec<DimensionInfo>,
    pub variables: Vec<VariableInfo>,
}

impl FileMetadata {
    pub fn variable(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionInfo> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for dim in &self.dimensions {
            let unlimited = if dim.is_unlimited { " (unlimited)" } else { "" };
            writeln!(f, "{} = {}{}", dim.name, dim.size, unlimited)?;
        }
        for var in &self.variables {
            writeln!(f, "name = {}", var.name)?;
            writeln!(f, " dims = {:?}", var.dimensions)?;
            writeln!(f, " shape = {:?}", var.shape)?;
            writeln!(f, " size = {}", var.size)?;
            writeln!(f, " ndim = {}", var.ndim())?;
            writeln!(f, " datatype = {}", var.dtype)?;
            if let Some(units) = &var.units {
                writeln!(f, " units = {}", units)?;
            }
        }
        Ok(())
    }
}

fn string_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// List the dimensions and variables of a NetCDF file
pub fn read_metadata(path: impl AsRef<Path>) -> Result<FileMetadata, DataFormatError> {
    let file = open_netcdf_file(path.as_ref())?;

    let dimensions = file
        .dimensions()
        .map(|d| DimensionInfo {
            name: d.name().to_string(),
            size: d.len(),
            is_unlimited: d.is_unlimited(),
        })
        .collect();

    let variables = file
        .variables()
        .map(|v| {
            let shape = variable_shape(&v);
            VariableInfo {
                name: v.name().to_string(),
                dimensions: v.dimensions().iter().map(|d| d.name().to_string()).collect(),
                size: shape.iter().product(),
                shape,
                dtype: format!("{:?}", v.vartype()),
                units: string_attribute(&v, "units"),
            }
        })
        .collect();

    Ok(FileMetadata {
        dimensions,
        variables,
    })
}
