pub mod interpolate;
pub mod units;

#[cfg(test)]
mod tests;

pub use interpolate::*;
pub use units::*;
