pub mod config;
pub mod contribution;
pub mod data_io;
pub mod math;
pub mod store;
pub mod time_utils;

pub use store::{EmissionsRecord, GriddedEmissionsStore, MonthlyTotals};
pub use time_utils::*;
