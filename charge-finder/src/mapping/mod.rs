//! HERE mapping client: route information and address geocoding.
//!
//! Routing responses are passed through untouched; callers that only want
//! the headline numbers can use [`RouteInfo::distance_meters`] and
//! [`RouteInfo::travel_time_secs`].

mod client;
mod error;
mod types;

pub use client::{MappingClient, MappingConfig, ROUTE_MODE, waypoint};
pub use error::MappingError;
pub use types::{GeocodeResponse, RouteInfo};
