use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of the city emissions inventory
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityRecord {
    #[serde(rename = "City", default)]
    pub name: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    /// Total greenhouse gas emissions (MtCO2e)
    #[serde(rename = "Total GHG (MtCO2e)")]
    pub total_ghg: f64,
}

/// Read a city inventory CSV file with a header row
pub fn read_city_inventory(path: impl AsRef<Path>) -> Result<Vec<CityRecord>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect_records(reader)
}

/// Read a city inventory from any CSV source with a header row
pub fn read_city_inventory_from<R: Read>(source: R) -> Result<Vec<CityRecord>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    collect_records(reader)
}

fn collect_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<CityRecord>, csv::Error> {
    reader.deserialize().collect()
}

/// Sum of the inventory's total emissions (MtCO2e)
pub fn total_city_emissions(cities: &[CityRecord]) -> f64 {
    cities.iter().map(|c| c.total_ghg).sum()
}
