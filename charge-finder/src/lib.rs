//! Charging-station lookup helpers for a voice-assistant skill.
//!
//! Resolves where the user is (device geolocation or registered address),
//! finds nearby electric-vehicle charging stations, and fetches route
//! information to them.

pub mod config;
pub mod domain;
pub mod location;
pub mod mapping;
pub mod stations;

#[cfg(test)]
mod test_support;
