//! Domain types shared by the resolvers and the API clients.
//!
//! Locations travel between components as plain coordinate pairs or as
//! free text; nothing here is persisted.

mod coordinate;
mod location_input;

pub use coordinate::Coordinate;
pub use location_input::LocationInput;
