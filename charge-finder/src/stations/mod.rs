//! Charging-station directory client.
//!
//! Queries the NREL Alternative Fuel Stations API for electric charging
//! stations near a location and normalizes each station to a fixed set of
//! fields.

mod client;
mod error;
mod filter;
mod record;

pub use client::{DEFAULT_FUEL_TYPE, StationClient, StationClientConfig};
pub use error::StationError;
pub use filter::{StationFilter, filter_stations, matches};
pub use record::{STATION_KEYS, StationRecord, StationsResponse, normalize_stations};
