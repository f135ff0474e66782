use crate::time_utils::{MonthSpan, CMIP5_ANDRES_SPAN};

/// Physical constants used by the unit conversions
#[derive(Clone, Debug)]
pub struct Constants {
    /// Molar mass of dry air (g/mol)
    pub molar_mass_air: f64,
    /// Mean mass of the atmosphere (g)
    pub mean_mass_air: f64,
    /// Molar mass of carbon (g/mol)
    pub molar_mass_c: f64,
    /// Atmospheric CO2 concentration in 1752 (ppm)
    pub ppm_c_1752: f64,
    /// Grams per megatonne
    pub grams_per_megatonne: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            molar_mass_air: 28.966,
            mean_mass_air: 5.1480e21,
            molar_mass_c: 12.01,
            ppm_c_1752: 276.39,
            grams_per_megatonne: 1.0e12,
        }
    }
}

/// Layout of the gridded emissions file and the time span it covers
#[derive(Clone, Debug)]
pub struct DatasetConfig {
    /// 3D fossil-fuel flux variable (time, lat, lon)
    pub flux_variable: String,
    /// 2D cell area variable (lat, lon)
    pub area_variable: String,
    pub latitude_variable: String,
    pub longitude_variable: String,
    /// Months covered by the time dimension of the flux variable
    pub span: MonthSpan,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            flux_variable: String::from("FF"),
            area_variable: String::from("AREA"),
            latitude_variable: String::from("Latitude"),
            longitude_variable: String::from("Longitude"),
            span: CMIP5_ANDRES_SPAN,
        }
    }
}

impl DatasetConfig {
    /// Default variable names with a different time span
    pub fn with_span(span: MonthSpan) -> Self {
        Self {
            span,
            ..Default::default()
        }
    }

    /// Number of time steps the flux variable must have
    pub fn expected_months(&self) -> usize {
        self.span.len()
    }

    pub(crate) fn required_variables(&self) -> [&str; 4] {
        [
            self.flux_variable.as_str(),
            self.area_variable.as_str(),
            self.latitude_variable.as_str(),
            self.longitude_variable.as_str(),
        ]
    }
}
