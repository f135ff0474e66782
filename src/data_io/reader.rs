use super::common::{open_netcdf_file, read_array};
use super::RawEmissionsData;
use crate::config::DatasetConfig;
use ndarray::{Ix1, Ix2, Ix3};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading the gridded emissions file
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Variable not found: {0}")]
    MissingVariable(String),

    #[error("Variable {variable} has {actual} dimensions, expected {expected}")]
    RankMismatch {
        variable: String,
        expected: usize,
        actual: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid coordinate axis: {0}")]
    UnsortedAxis(String),

    #[error("Data conversion error: {0}")]
    ConversionError(String),
}

/// NetCDF reader for the gridded fossil-fuel emissions dataset
pub struct EmissionsReader {
    pub file_path: PathBuf,
    pub config: DatasetConfig,
}

impl EmissionsReader {
    /// Create a reader using the CMIP5 Andres variable names and span
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self::with_config(file_path, DatasetConfig::default())
    }

    pub fn with_config(file_path: impl AsRef<Path>, config: DatasetConfig) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            config,
        }
    }

    /// Check if file exists and is readable
    pub fn validate_file(&self) -> Result<(), DataFormatError> {
        if !self.file_path.exists() {
            return Err(DataFormatError::FileNotFound(
                self.file_path.to_string_lossy().to_string(),
            ));
        }
        if !self.file_path.is_file() {
            return Err(DataFormatError::FileNotFound(format!(
                "Path is not a file: {}",
                self.file_path.display()
            )));
        }
        Ok(())
    }

    /// Read and validate flux, area and both coordinate axes.
    ///
    /// The file handle is closed before this returns.
    pub fn read(&self) -> Result<RawEmissionsData, DataFormatError> {
        self.validate_file()?;
        let file = open_netcdf_file(&self.file_path)?;
        info!("Reading emissions dataset from: {}", self.file_path.display());

        // Report the first missing variable before reading anything large
        if let Some(missing) = self
            .config
            .required_variables()
            .into_iter()
            .find(|name| file.variable(name).is_none())
        {
            return Err(DataFormatError::MissingVariable(missing.to_string()));
        }

        let latitude = read_array::<Ix1>(&file, &self.config.latitude_variable)?;
        let longitude = read_array::<Ix1>(&file, &self.config.longitude_variable)?;
        let area = read_array::<Ix2>(&file, &self.config.area_variable)?;
        let flux = read_array::<Ix3>(&file, &self.config.flux_variable)?;
        drop(file);

        RawEmissionsData {
            latitude,
            longitude,
            flux,
            area,
        }
        .validated(&self.config)
    }
}

/// Read the emissions dataset at `path` with the given layout
pub fn read_emissions_file(
    path: impl AsRef<Path>,
    config: &DatasetConfig,
) -> Result<RawEmissionsData, DataFormatError> {
    EmissionsReader::with_config(path, config.clone()).read()
}
