#![allow(dead_code)]

use std::path::Path;

/// In-memory description of a small emissions file
pub struct SyntheticDataset {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    /// Row-major [time, lat, lon]
    pub flux: Vec<f64>,
    /// Row-major [lat, lon]
    pub area: Vec<f64>,
    /// Store FF and AREA as f32 instead of f64
    pub single_precision: bool,
    /// Variables to leave out of the file
    pub omit: Vec<&'static str>,
    /// `_FillValue` attribute of FF
    pub flux_fill_value: Option<f64>,
    /// `missing_value` attribute of AREA
    pub area_missing_value: Option<f64>,
}

impl SyntheticDataset {
    /// Grid with `months` time steps where flux = f(t, j, i) and area = g(j, i)
    pub fn from_fn(
        months: usize,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        flux: impl Fn(usize, usize, usize) -> f64,
        area: impl Fn(usize, usize) -> f64,
    ) -> Self {
        let (nj, ni) = (latitude.len(), longitude.len());
        let mut flux_values = Vec::with_capacity(months * nj * ni);
        for t in 0..months {
            for j in 0..nj {
                for i in 0..ni {
                    flux_values.push(flux(t, j, i));
                }
            }
        }
        let mut area_values = Vec::with_capacity(nj * ni);
        for j in 0..nj {
            for i in 0..ni {
                area_values.push(area(j, i));
            }
        }
        Self {
            latitude,
            longitude,
            flux: flux_values,
            area: area_values,
            single_precision: false,
            omit: Vec::new(),
            flux_fill_value: None,
            area_missing_value: None,
        }
    }

    pub fn months(&self) -> usize {
        self.flux.len() / (self.latitude.len() * self.longitude.len())
    }

    fn includes(&self, name: &str) -> bool {
        !self.omit.contains(&name)
    }

    /// Write the dataset with the CMIP5 Andres variable layout
    pub fn write(&self, path: &Path) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;

        file.add_dimension("time_counter", self.months())?;
        file.add_dimension("y", self.latitude.len())?;
        file.add_dimension("x", self.longitude.len())?;

        {
            let mut var = file.add_variable::<f64>("time_counter", &["time_counter"])?;
            var.put_attribute("units", "months since 1751-01-01")?;
            let steps: Vec<f64> = (0..self.months()).map(|t| t as f64).collect();
            var.put_values(&steps[..], ..)?;
        }

        if self.includes("Latitude") {
            let mut var = file.add_variable::<f64>("Latitude", &["y"])?;
            var.put_attribute("units", "degrees_north")?;
            var.put_values(&self.latitude[..], ..)?;
        }

        if self.includes("Longitude") {
            let mut var = file.add_variable::<f64>("Longitude", &["x"])?;
            var.put_attribute("units", "degrees_east")?;
            var.put_values(&self.longitude[..], ..)?;
        }

        if self.includes("AREA") {
            if self.single_precision {
                let values: Vec<f32> = self.area.iter().map(|&v| v as f32).collect();
                let mut var = file.add_variable::<f32>("AREA", &["y", "x"])?;
                var.put_attribute("units", "m2")?;
                if let Some(missing) = self.area_missing_value {
                    var.put_attribute("missing_value", missing as f32)?;
                }
                var.put_values(&values[..], ..)?;
            } else {
                let mut var = file.add_variable::<f64>("AREA", &["y", "x"])?;
                var.put_attribute("units", "m2")?;
                if let Some(missing) = self.area_missing_value {
                    var.put_attribute("missing_value", missing)?;
                }
                var.put_values(&self.area[..], ..)?;
            }
        }

        if self.includes("FF") {
            if self.single_precision {
                let values: Vec<f32> = self.flux.iter().map(|&v| v as f32).collect();
                let mut var = file.add_variable::<f32>("FF", &["time_counter", "y", "x"])?;
                if let Some(fill) = self.flux_fill_value {
                    var.put_attribute("_FillValue", fill as f32)?;
                }
                var.put_attribute("units", "gC/m2/s")?;
                var.put_values(&values[..], ..)?;
            } else {
                let mut var = file.add_variable::<f64>("FF", &["time_counter", "y", "x"])?;
                if let Some(fill) = self.flux_fill_value {
                    var.put_attribute("_FillValue", fill)?;
                }
                var.put_attribute("units", "gC/m2/s")?;
                var.put_values(&self.flux[..], ..)?;
            }
        }

        Ok(())
    }
}
