//! User location resolvers.
//!
//! Two independent sources, each best-effort:
//! - the device's live geolocation fix, accepted only if accurate and fresh
//! - the postal address registered for the device, geocoded to coordinates
//!
//! Both return `None` when no usable location exists. Callers decide what
//! to tell the user.

mod address;
pub mod envelope;
mod error;
mod geolocation;

pub use address::{
    AddressService, DeviceAddress, DeviceAddressClient, Geocoder, resolve_device_address,
};
pub use envelope::RequestEnvelope;
pub use error::{LocationError, PlatformError};
pub use geolocation::{
    ACCURACY_THRESHOLD_METERS, FRESHNESS_THRESHOLD_SECS, FixPolicy, fix_age,
    resolve_device_geolocation, resolve_device_geolocation_with,
};
