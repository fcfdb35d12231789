//! Parameter tables for the reference three-machine, three-product shop.

use crate::core::config::ShopConfig;
use crate::core::errors::SimError;

pub const MACHINES: [&str; 3] = ["M1", "M2", "M3"];

/// Product type -> mean interarrival time
pub const ARRIVAL_RATES: [(&str, f64); 3] = [("A", 4.0), ("B", 8.0), ("C", 10.0)];

/// Product type -> (mean, std dev) of the processing time
pub const PROCESSING_PARAMS: [(&str, (f64, f64)); 3] =
    [("A", (5.0, 2.0)), ("B", (7.0, 2.0)), ("C", (8.0, 1.2))];

pub const SIM_DURATION: f64 = 1000.0;

pub fn default_config() -> Result<ShopConfig, SimError> {
    ShopConfig::from_tables(MACHINES, &ARRIVAL_RATES, &PROCESSING_PARAMS, SIM_DURATION)
}
